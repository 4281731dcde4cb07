use bytemuck::{Pod, Zeroable};

use crate::driver::VertexLayout;

/// Position-only vertex, tightly packed.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }
}

/// The triangle, counter-clockwise, in the z = 0 plane.
pub const TRIANGLE: [Vertex; 3] = [
    Vertex::new(0.0, 0.0, 0.0),
    Vertex::new(1.0, -1.0, 0.0),
    Vertex::new(1.0, 1.0, 0.0),
];

/// Immutable CPU-side vertex data uploaded once per surface.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBuffer {
    vertices: [Vertex; 3],
}

impl VertexBuffer {
    pub const VERTEX_COUNT: i32 = 3;

    pub const LAYOUT: VertexLayout = VertexLayout {
        components: 3,
        normalized: false,
        stride: std::mem::size_of::<Vertex>() as i32,
        offset: 0,
    };

    pub fn triangle() -> Self {
        Self { vertices: TRIANGLE }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Native-endian bytes, as handed to the driver.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl Default for VertexBuffer {
    fn default() -> Self {
        Self::triangle()
    }
}
