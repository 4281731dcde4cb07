//! Triangle rendering.
//!
//! `FrameRenderer` implements the surface lifecycle: it builds its program
//! when a surface is created, tracks the viewport on resize, and issues one
//! triangle draw per frame.
//!
//! Convention:
//! - geometry is given directly in clip space (no transforms)
//! - shaders are GLSL ES 1.00 so they run on GLES 2.0 and desktop GL 2.1

mod config;
mod frame;
mod geometry;

pub use config::{
    AttribPolicy, RendererConfig, ShaderOrigin, ViewportPolicy, INLINE_FRAGMENT_SHADER,
    INLINE_VERTEX_SHADER,
};
pub use frame::{DrawOutcome, FrameRenderer, LinkedProgram, SkipReason, SurfaceState};
pub use geometry::{Vertex, VertexBuffer, TRIANGLE};
