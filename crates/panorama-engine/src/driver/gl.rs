use glow::HasContext;

use super::api::GraphicsDriver;
use super::types::{
    AttribLocation, BufferId, ClearMask, ErrorCode, ProgramId, ShaderId, ShaderStage, VertexLayout,
};

/// [`GraphicsDriver`] over a loaded `glow` context (OpenGL 2.1+ or OpenGL ES 2.0+).
pub struct GlowDriver {
    gl: glow::Context,
    /// Core-profile contexts refuse attribute pointers without a bound VAO.
    vao: Option<glow::NativeVertexArray>,
}

impl GlowDriver {
    /// Wraps `gl` and prepares the minimal global state the renderer expects.
    ///
    /// # Safety
    ///
    /// `gl` must have been loaded from the context that is current on the
    /// calling thread, and every later call on the returned driver must happen
    /// on that thread while the same context is current.
    pub unsafe fn new(gl: glow::Context) -> Self {
        let version = gl.version();
        log::info!(
            "GL{} {}.{} ({})",
            if version.is_embedded { " ES" } else { "" },
            version.major,
            version.minor,
            version.vendor_info
        );

        let vao = if version.major >= 3 {
            // SAFETY: caller guarantees the context is current.
            match unsafe { gl.create_vertex_array() } {
                Ok(vao) => {
                    unsafe { gl.bind_vertex_array(Some(vao)) };
                    Some(vao)
                }
                Err(e) => {
                    log::warn!("failed to create vertex array object: {e}");
                    None
                }
            }
        } else {
            None
        };

        Self { gl, vao }
    }

}

impl Drop for GlowDriver {
    fn drop(&mut self) {
        if let Some(vao) = self.vao.take() {
            // SAFETY: `new` requires the context to stay current for the
            // driver's whole lifetime, drop included.
            unsafe {
                self.gl.bind_vertex_array(None);
                self.gl.delete_vertex_array(vao);
            }
        }
    }
}

#[inline]
fn shader(id: ShaderId) -> glow::NativeShader {
    glow::NativeShader(id.0)
}

#[inline]
fn program(id: ProgramId) -> glow::NativeProgram {
    glow::NativeProgram(id.0)
}

#[inline]
fn buffer(id: BufferId) -> glow::NativeBuffer {
    glow::NativeBuffer(id.0)
}

// SAFETY (all methods below): `GlowDriver::new` requires its caller to keep
// the context current on this thread for the driver's whole lifetime, and
// every id passed in was produced by this driver.
impl GraphicsDriver for GlowDriver {
    fn create_shader(&self, stage: ShaderStage) -> Option<ShaderId> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        match unsafe { self.gl.create_shader(kind) } {
            Ok(s) => Some(ShaderId(s.0)),
            Err(e) => {
                log::error!("glCreateShader({stage}) failed: {e}");
                None
            }
        }
    }

    fn shader_source(&self, id: ShaderId, source: &str) {
        unsafe { self.gl.shader_source(shader(id), source) }
    }

    fn compile_shader(&self, id: ShaderId) {
        unsafe { self.gl.compile_shader(shader(id)) }
    }

    fn shader_compile_status(&self, id: ShaderId) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader(id)) }
    }

    fn shader_info_log(&self, id: ShaderId) -> String {
        unsafe { self.gl.get_shader_info_log(shader(id)) }
    }

    fn delete_shader(&self, id: ShaderId) {
        unsafe { self.gl.delete_shader(shader(id)) }
    }

    fn create_program(&self) -> Option<ProgramId> {
        match unsafe { self.gl.create_program() } {
            Ok(p) => Some(ProgramId(p.0)),
            Err(e) => {
                log::error!("glCreateProgram failed: {e}");
                None
            }
        }
    }

    fn attach_shader(&self, p: ProgramId, s: ShaderId) {
        unsafe { self.gl.attach_shader(program(p), shader(s)) }
    }

    fn link_program(&self, p: ProgramId) {
        unsafe { self.gl.link_program(program(p)) }
    }

    fn program_link_status(&self, p: ProgramId) -> bool {
        unsafe { self.gl.get_program_link_status(program(p)) }
    }

    fn program_info_log(&self, p: ProgramId) -> String {
        unsafe { self.gl.get_program_info_log(program(p)) }
    }

    fn delete_program(&self, p: ProgramId) {
        unsafe { self.gl.delete_program(program(p)) }
    }

    fn attrib_location(&self, p: ProgramId, name: &str) -> Option<AttribLocation> {
        unsafe { self.gl.get_attrib_location(program(p), name) }.map(AttribLocation)
    }

    fn create_vertex_buffer(&self, data: &[u8]) -> Option<BufferId> {
        let buf = match unsafe { self.gl.create_buffer() } {
            Ok(b) => b,
            Err(e) => {
                log::error!("glGenBuffers failed: {e}");
                return None;
            }
        };
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buf));
            self.gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        Some(BufferId(buf.0))
    }

    fn delete_buffer(&self, id: BufferId) {
        unsafe { self.gl.delete_buffer(buffer(id)) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear_color(&self, [r, g, b, a]: [f32; 4]) {
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear(&self, mask: ClearMask) {
        let mut bits = 0;
        if mask.color {
            bits |= glow::COLOR_BUFFER_BIT;
        }
        if mask.depth {
            bits |= glow::DEPTH_BUFFER_BIT;
        }
        if bits != 0 {
            unsafe { self.gl.clear(bits) }
        }
    }

    fn use_program(&self, p: Option<ProgramId>) {
        unsafe { self.gl.use_program(p.map(program)) }
    }

    fn enable_vertex_attrib_array(&self, location: AttribLocation) {
        unsafe { self.gl.enable_vertex_attrib_array(location.0) }
    }

    fn disable_vertex_attrib_array(&self, location: AttribLocation) {
        unsafe { self.gl.disable_vertex_attrib_array(location.0) }
    }

    fn vertex_attrib_pointer_f32(
        &self,
        location: AttribLocation,
        id: BufferId,
        layout: VertexLayout,
    ) {
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer(id)));
            self.gl.vertex_attrib_pointer_f32(
                location.0,
                layout.components,
                glow::FLOAT,
                layout.normalized,
                layout.stride,
                layout.offset,
            );
        }
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(glow::TRIANGLES, first, count) }
    }

    fn get_error(&self) -> Option<ErrorCode> {
        match unsafe { self.gl.get_error() } {
            glow::NO_ERROR => None,
            code => Some(ErrorCode(code)),
        }
    }
}
