use super::types::{
    AttribLocation, BufferId, ClearMask, ErrorCode, ProgramId, ShaderId, ShaderStage, VertexLayout,
};

/// GL-shaped graphics driver binding.
///
/// Methods mirror the OpenGL ES 2.0 entry points the renderer needs, with
/// driver "0" handles expressed as `None`. Implementations are single-threaded:
/// every call happens on the thread that owns the current context.
pub trait GraphicsDriver {
    // ── shaders ───────────────────────────────────────────────────────────

    fn create_shader(&self, stage: ShaderStage) -> Option<ShaderId>;
    fn shader_source(&self, shader: ShaderId, source: &str);
    fn compile_shader(&self, shader: ShaderId);
    fn shader_compile_status(&self, shader: ShaderId) -> bool;
    fn shader_info_log(&self, shader: ShaderId) -> String;
    fn delete_shader(&self, shader: ShaderId);

    // ── programs ──────────────────────────────────────────────────────────

    fn create_program(&self) -> Option<ProgramId>;
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    fn link_program(&self, program: ProgramId);
    fn program_link_status(&self, program: ProgramId) -> bool;
    fn program_info_log(&self, program: ProgramId) -> String;
    fn delete_program(&self, program: ProgramId);

    /// Looks up a vertex input by name. `None` when the program has no active
    /// attribute of that name (GL returns -1).
    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<AttribLocation>;

    // ── buffers ───────────────────────────────────────────────────────────

    /// Creates a static array buffer holding `data`.
    fn create_vertex_buffer(&self, data: &[u8]) -> Option<BufferId>;
    fn delete_buffer(&self, buffer: BufferId);

    // ── per-frame state ───────────────────────────────────────────────────

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, rgba: [f32; 4]);
    fn clear(&self, mask: ClearMask);
    fn use_program(&self, program: Option<ProgramId>);
    fn enable_vertex_attrib_array(&self, location: AttribLocation);
    fn disable_vertex_attrib_array(&self, location: AttribLocation);

    /// Points a float attribute at `buffer` using `layout`.
    fn vertex_attrib_pointer_f32(
        &self,
        location: AttribLocation,
        buffer: BufferId,
        layout: VertexLayout,
    );

    /// `glDrawArrays(GL_TRIANGLES, first, count)`.
    fn draw_triangles(&self, first: i32, count: i32);

    // ── errors ────────────────────────────────────────────────────────────

    /// Pops one pending error flag; `None` means `GL_NO_ERROR`.
    fn get_error(&self) -> Option<ErrorCode>;
}
