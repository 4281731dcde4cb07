use std::borrow::Cow;
use std::fmt;

use crate::core::SurfaceRenderer;
use crate::driver::{check_error, AttribLocation, BufferId, DriverFault, GraphicsDriver, ProgramId};
use crate::shader::{ShaderError, ShaderProgramBuilder};

use super::config::{
    AttribPolicy, RendererConfig, ShaderOrigin, ViewportPolicy, INLINE_FRAGMENT_SHADER,
    INLINE_VERTEX_SHADER,
};
use super::geometry::VertexBuffer;

/// Lifecycle position of a [`FrameRenderer`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceState {
    /// No surface yet, or the last one was lost.
    Detached,
    Created,
    Sized,
    Drawing,
}

/// A linked program together with the position input resolved against it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LinkedProgram {
    pub id: ProgramId,
    /// `None` when the program has no active attribute of the configured name.
    pub position: Option<AttribLocation>,
}

/// Result of one `draw_frame` call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawOutcome {
    Drawn { vertices: i32 },
    Skipped(SkipReason),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SkipReason {
    NoSurface,
    NoProgram,
    NoPositionAttribute,
    NoVertexBuffer,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::NoSurface => "no surface",
            SkipReason::NoProgram => "no linked program",
            SkipReason::NoPositionAttribute => "position attribute not resolved",
            SkipReason::NoVertexBuffer => "vertex buffer not uploaded",
        })
    }
}

/// Draws the flat-colored triangle, one draw call per frame.
///
/// Driver resources (program, vertex buffer) belong to the current surface
/// and are rebuilt on every `on_surface_created`. The CPU-side vertex data is
/// created once and never changes.
#[derive(Debug)]
pub struct FrameRenderer {
    config: RendererConfig,
    vertices: VertexBuffer,

    state: SurfaceState,
    program: Option<LinkedProgram>,
    vertex_buffer: Option<BufferId>,
    size: Option<(u32, u32)>,

    frames_drawn: u64,
    warned_skip: bool,
}

impl FrameRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            vertices: VertexBuffer::triangle(),
            state: SurfaceState::Detached,
            program: None,
            vertex_buffer: None,
            size: None,
            frames_drawn: 0,
            warned_skip: false,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn program(&self) -> Option<LinkedProgram> {
        self.program
    }

    pub fn vertices(&self) -> &VertexBuffer {
        &self.vertices
    }

    /// Last size reported by the host, in physical pixels.
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.size
    }

    /// Frames that reached the draw call since construction.
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Clears and draws one frame.
    ///
    /// Missing prerequisites skip the draw call (logged once per surface);
    /// the clear still happens whenever a surface exists.
    pub fn draw_frame(&mut self, gl: &dyn GraphicsDriver) -> Result<DrawOutcome, DriverFault> {
        if self.state == SurfaceState::Detached {
            return Ok(self.skip(SkipReason::NoSurface));
        }
        self.state = SurfaceState::Drawing;

        if let Some(rgba) = self.config.clear_color {
            gl.clear_color(rgba);
        }
        gl.clear(self.config.clear);

        let Some(program) = self.program else {
            return Ok(self.skip(SkipReason::NoProgram));
        };
        let Some(position) = program.position else {
            return Ok(self.skip(SkipReason::NoPositionAttribute));
        };
        let Some(vertex_buffer) = self.vertex_buffer else {
            return Ok(self.skip(SkipReason::NoVertexBuffer));
        };

        gl.use_program(Some(program.id));
        gl.enable_vertex_attrib_array(position);
        gl.vertex_attrib_pointer_f32(position, vertex_buffer, VertexBuffer::LAYOUT);
        gl.draw_triangles(0, VertexBuffer::VERTEX_COUNT);

        if self.config.attrib_policy == AttribPolicy::DisableAfterDraw {
            gl.disable_vertex_attrib_array(position);
        }
        if self.config.check_draw_errors {
            check_error(gl, "glDrawArrays")?;
        }

        self.frames_drawn += 1;
        log::trace!("frame {} drawn", self.frames_drawn);

        Ok(DrawOutcome::Drawn { vertices: VertexBuffer::VERTEX_COUNT })
    }

    fn skip(&mut self, reason: SkipReason) -> DrawOutcome {
        if !self.warned_skip {
            log::warn!("skipping triangle draw: {reason}");
            self.warned_skip = true;
        }
        DrawOutcome::Skipped(reason)
    }

    fn shader_sources(&self) -> (Cow<'static, str>, Cow<'static, str>) {
        match &self.config.shader_origin {
            ShaderOrigin::Inline => (
                Cow::Borrowed(INLINE_VERTEX_SHADER),
                Cow::Borrowed(INLINE_FRAGMENT_SHADER),
            ),
            ShaderOrigin::Assets { loader, vertex, fragment } => (
                loader.load_text(vertex).map(Cow::Owned).unwrap_or_default(),
                loader.load_text(fragment).map(Cow::Owned).unwrap_or_default(),
            ),
        }
    }

    /// Builds the program and resolves the position input against it.
    ///
    /// Compile and link failures are logged and yield `Ok(None)`; only a
    /// driver fault is returned as an error.
    fn build_program(&self, gl: &dyn GraphicsDriver) -> Result<Option<LinkedProgram>, DriverFault> {
        let (vertex, fragment) = self.shader_sources();

        let id = match ShaderProgramBuilder::new(gl).create_program(&vertex, &fragment) {
            Ok(id) => id,
            Err(ShaderError::Driver(fault)) => return Err(fault),
            Err(e) => {
                log::error!("shader program unavailable: {e}");
                return Ok(None);
            }
        };

        let name = &self.config.position_attribute;
        let position = gl.attrib_location(id, name);
        if position.is_none() {
            log::warn!("program {} has no active attribute {name:?}", id.0);
        }

        Ok(Some(LinkedProgram { id, position }))
    }

    /// Drops every driver id and returns to `Detached` without driver calls.
    fn forget_surface(&mut self) {
        self.program = None;
        self.vertex_buffer = None;
        self.size = None;
        self.state = SurfaceState::Detached;
    }
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

impl SurfaceRenderer for FrameRenderer {
    fn on_surface_created(&mut self, gl: &dyn GraphicsDriver) -> Result<(), DriverFault> {
        if self.state != SurfaceState::Detached {
            log::debug!("surface recreated; previous driver resources are stale");
        }
        self.forget_surface();
        self.warned_skip = false;

        self.program = self.build_program(gl)?;

        self.vertex_buffer = gl.create_vertex_buffer(self.vertices.as_bytes());
        if self.vertex_buffer.is_none() {
            log::error!("could not upload triangle vertex buffer");
        }

        self.state = SurfaceState::Created;
        log::debug!(
            "surface created (program: {:?}, vertex buffer: {:?})",
            self.program.map(|p| p.id.0),
            self.vertex_buffer.map(|b| b.0)
        );
        Ok(())
    }

    fn on_surface_changed(
        &mut self,
        gl: &dyn GraphicsDriver,
        width: u32,
        height: u32,
    ) -> Result<(), DriverFault> {
        if self.state == SurfaceState::Detached {
            log::warn!("surface change {width}x{height} before surface creation ignored");
            return Ok(());
        }
        self.size = Some((width, height));

        match self.config.viewport_policy {
            ViewportPolicy::Track => {
                let w = i32::try_from(width).unwrap_or(i32::MAX);
                let h = i32::try_from(height).unwrap_or(i32::MAX);
                gl.viewport(0, 0, w, h);
            }
            ViewportPolicy::DriverDefault => {}
        }

        self.state = SurfaceState::Sized;
        log::debug!("surface changed: {width}x{height}");
        Ok(())
    }

    fn on_draw_frame(&mut self, gl: &dyn GraphicsDriver) -> Result<(), DriverFault> {
        self.draw_frame(gl).map(|_| ())
    }

    fn on_surface_destroying(&mut self, gl: &dyn GraphicsDriver) {
        if let Some(program) = self.program {
            gl.delete_program(program.id);
        }
        if let Some(buffer) = self.vertex_buffer {
            gl.delete_buffer(buffer);
        }
        self.forget_surface();
        log::debug!("surface resources released");
    }

    fn on_surface_lost(&mut self) {
        self.forget_surface();
        log::debug!("surface lost; driver resources forgotten");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use crate::driver::{ClearMask, DriverCall, ErrorCode, HeadlessDriver};

    const VS: &str = "attribute vec4 aPosition; void main(){gl_Position=aPosition;}";
    const FS: &str = "precision mediump float; void main(){gl_FragColor=vec4(0,0.5,0.5,1);}";
    const FS_BROKEN: &str = "precision mediump float; void main(){gl_FragColor=vec4(0,0.5,0.5,1)}";

    fn with_sources(vertex: &str, fragment: &str) -> RendererConfig {
        let assets = MemoryAssets::new()
            .with("vertex_shader.glsl", vertex)
            .with("fragment_shader.glsl", fragment);
        RendererConfig { shader_origin: ShaderOrigin::assets(assets), ..Default::default() }
    }

    fn started(config: RendererConfig, gl: &HeadlessDriver) -> FrameRenderer {
        let mut r = FrameRenderer::new(config);
        r.on_surface_created(gl).unwrap();
        r.on_surface_changed(gl, 800, 600).unwrap();
        r
    }

    // ── drawing ───────────────────────────────────────────────────────────

    #[test]
    fn asset_sources_draw_one_triangle() {
        let gl = HeadlessDriver::new();
        let mut r = started(with_sources(VS, FS), &gl);
        gl.clear_calls();

        assert_eq!(r.draw_frame(&gl), Ok(DrawOutcome::Drawn { vertices: 3 }));
        assert_eq!(gl.draw_calls(), vec![(0, 3)]);
        assert_eq!(gl.get_error(), None);
    }

    #[test]
    fn inline_shaders_draw_in_call_order() {
        let gl = HeadlessDriver::new();
        let mut r = started(RendererConfig::default(), &gl);
        gl.clear_calls();
        r.on_draw_frame(&gl).unwrap();

        let program = r.program().unwrap();
        let position = program.position.unwrap();
        let calls = gl.calls();
        let DriverCall::AttribPointer(_, vbo, _) = calls[3] else {
            panic!("unexpected call order: {calls:?}");
        };
        assert_eq!(
            calls,
            vec![
                DriverCall::Clear(ClearMask::COLOR_DEPTH),
                DriverCall::UseProgram(Some(program.id)),
                DriverCall::EnableAttrib(position),
                DriverCall::AttribPointer(position, vbo, VertexBuffer::LAYOUT),
                DriverCall::DrawTriangles { first: 0, count: 3 },
            ]
        );
        assert_eq!(r.state(), SurfaceState::Drawing);
    }

    #[test]
    fn resize_then_draw_leaves_vertices_untouched() {
        let gl = HeadlessDriver::new();
        let mut r = started(RendererConfig::default(), &gl);
        r.on_draw_frame(&gl).unwrap();

        assert_eq!(r.vertices(), &VertexBuffer::triangle());
        let uploaded = gl.count_calls(|c| matches!(c, DriverCall::CreateBuffer(..)));
        assert_eq!(uploaded, 1);
    }

    #[test]
    fn geometry_is_stable_across_many_frames() {
        let gl = HeadlessDriver::new();
        let mut r = started(RendererConfig::default(), &gl);
        for _ in 0..120 {
            r.on_draw_frame(&gl).unwrap();
        }

        assert_eq!(r.frames_drawn(), 120);
        assert_eq!(r.vertices(), &VertexBuffer::triangle());
        let vbo = match gl.calls().iter().find(|c| matches!(c, DriverCall::CreateBuffer(..))) {
            Some(DriverCall::CreateBuffer(id, _)) => *id,
            _ => panic!("no vertex buffer uploaded"),
        };
        assert_eq!(gl.buffer_data(vbo).unwrap(), VertexBuffer::triangle().as_bytes());
    }

    #[test]
    fn draw_before_surface_is_skipped_silently() {
        let gl = HeadlessDriver::new();
        let mut r = FrameRenderer::default();
        assert_eq!(r.draw_frame(&gl), Ok(DrawOutcome::Skipped(SkipReason::NoSurface)));
        assert!(gl.calls().is_empty());
    }

    // ── failure paths ─────────────────────────────────────────────────────

    #[test]
    fn failed_program_never_resolves_attribute() {
        let gl = HeadlessDriver::new();
        let mut r = started(with_sources(VS, FS_BROKEN), &gl);

        assert_eq!(r.program(), None);
        assert_eq!(gl.count_calls(|c| matches!(c, DriverCall::AttribLocation(..))), 0);

        gl.clear_calls();
        assert_eq!(r.draw_frame(&gl), Ok(DrawOutcome::Skipped(SkipReason::NoProgram)));
        assert_eq!(gl.calls(), vec![DriverCall::Clear(ClearMask::COLOR_DEPTH)]);
    }

    #[test]
    fn missing_asset_fails_without_driver_objects() {
        let gl = HeadlessDriver::new();
        let assets = MemoryAssets::new().with("fragment_shader.glsl", FS);
        let config = RendererConfig { shader_origin: ShaderOrigin::assets(assets), ..Default::default() };
        let r = started(config, &gl);

        assert_eq!(r.program(), None);
        assert_eq!(gl.count_calls(|c| matches!(c, DriverCall::CreateShader(..))), 0);
    }

    #[test]
    fn unknown_position_attribute_skips_draw() {
        let gl = HeadlessDriver::new();
        let config = RendererConfig { position_attribute: "vPosition".to_string(), ..Default::default() };
        let mut r = started(config, &gl);

        assert!(r.program().is_some_and(|p| p.position.is_none()));
        assert_eq!(
            r.draw_frame(&gl),
            Ok(DrawOutcome::Skipped(SkipReason::NoPositionAttribute))
        );
        assert!(gl.draw_calls().is_empty());
    }

    #[test]
    fn missing_vertex_buffer_skips_draw() {
        let gl = HeadlessDriver::new();
        let mut r = FrameRenderer::default();
        r.on_surface_created(&gl).unwrap();

        // Simulate an upload failure on the current surface.
        r.vertex_buffer = None;
        assert_eq!(r.draw_frame(&gl), Ok(DrawOutcome::Skipped(SkipReason::NoVertexBuffer)));
    }

    #[test]
    fn driver_fault_during_build_is_propagated() {
        let gl = HeadlessDriver::new();
        gl.inject_error(ErrorCode::INVALID_OPERATION);

        let mut r = FrameRenderer::default();
        let fault = r.on_surface_created(&gl).unwrap_err();
        assert_eq!(fault.label, "glAttachShader");
        assert_eq!(r.state(), SurfaceState::Detached);
    }

    #[test]
    fn draw_error_check_is_opt_in() {
        let gl = HeadlessDriver::new();
        let config = RendererConfig { check_draw_errors: true, ..Default::default() };
        let mut r = started(config, &gl);

        gl.inject_error(ErrorCode::OUT_OF_MEMORY);
        let fault = r.draw_frame(&gl).unwrap_err();
        assert_eq!(fault.label, "glDrawArrays");
        assert_eq!(fault.code, ErrorCode::OUT_OF_MEMORY);
        assert_eq!(r.frames_drawn(), 0);
    }

    // ── policies ──────────────────────────────────────────────────────────

    #[test]
    fn tracked_viewport_follows_surface_size() {
        let gl = HeadlessDriver::new();
        let r = started(RendererConfig::default(), &gl);

        assert_eq!(gl.count_calls(|c| *c == DriverCall::Viewport(0, 0, 800, 600)), 1);
        assert_eq!(r.surface_size(), Some((800, 600)));
        assert_eq!(r.state(), SurfaceState::Sized);
    }

    #[test]
    fn driver_default_viewport_is_left_alone() {
        let gl = HeadlessDriver::new();
        let config = RendererConfig { viewport_policy: ViewportPolicy::DriverDefault, ..Default::default() };
        let r = started(config, &gl);

        assert_eq!(gl.count_calls(|c| matches!(c, DriverCall::Viewport(..))), 0);
        assert_eq!(r.surface_size(), Some((800, 600)));
    }

    #[test]
    fn attribute_array_disable_policy() {
        let gl = HeadlessDriver::new();
        let mut r = started(RendererConfig::default(), &gl);
        r.on_draw_frame(&gl).unwrap();
        assert_eq!(gl.count_calls(|c| matches!(c, DriverCall::DisableAttrib(_))), 0);

        let gl = HeadlessDriver::new();
        let config = RendererConfig { attrib_policy: AttribPolicy::DisableAfterDraw, ..Default::default() };
        let mut r = started(config, &gl);
        gl.clear_calls();
        r.on_draw_frame(&gl).unwrap();

        let calls = gl.calls();
        assert!(matches!(calls.last(), Some(DriverCall::DisableAttrib(_))));
    }

    #[test]
    fn clear_color_and_mask_are_configurable() {
        let gl = HeadlessDriver::new();
        let config = RendererConfig {
            clear: ClearMask::COLOR,
            clear_color: Some([0.5, 0.5, 0.5, 1.0]),
            ..Default::default()
        };
        let mut r = started(config, &gl);
        gl.clear_calls();
        r.on_draw_frame(&gl).unwrap();

        let calls = gl.calls();
        assert_eq!(calls[0], DriverCall::ClearColor([0.5, 0.5, 0.5, 1.0]));
        assert_eq!(calls[1], DriverCall::Clear(ClearMask::COLOR));
    }

    // ── surface lifecycle ─────────────────────────────────────────────────

    #[test]
    fn lost_surface_is_rebuilt_on_new_context() {
        let first = HeadlessDriver::new();
        let mut r = started(RendererConfig::default(), &first);
        r.on_draw_frame(&first).unwrap();

        r.on_surface_lost();
        assert_eq!(r.state(), SurfaceState::Detached);
        assert_eq!(r.program(), None);
        assert_eq!(first.count_calls(|c| matches!(c, DriverCall::DeleteProgram(_))), 0);
        assert_eq!(r.draw_frame(&first), Ok(DrawOutcome::Skipped(SkipReason::NoSurface)));

        let second = HeadlessDriver::new();
        r.on_surface_created(&second).unwrap();
        r.on_surface_changed(&second, 1024, 768).unwrap();
        assert_eq!(r.draw_frame(&second), Ok(DrawOutcome::Drawn { vertices: 3 }));
        assert_eq!(r.frames_drawn(), 2);
    }

    #[test]
    fn recreate_on_new_context_without_loss_issues_no_stale_calls() {
        let first = HeadlessDriver::new();
        let mut r = started(RendererConfig::default(), &first);
        r.on_draw_frame(&first).unwrap();

        let second = HeadlessDriver::new();
        r.on_surface_created(&second).unwrap();

        let stale = second.count_calls(|c| {
            matches!(c, DriverCall::DeleteProgram(_) | DriverCall::DeleteBuffer(_))
        });
        assert_eq!(stale, 0);
        assert_eq!(second.get_error(), None);
        assert_eq!(r.state(), SurfaceState::Created);
        assert_eq!(r.surface_size(), None);

        r.on_surface_changed(&second, 640, 480).unwrap();
        assert_eq!(r.draw_frame(&second), Ok(DrawOutcome::Drawn { vertices: 3 }));
    }

    #[test]
    fn destroying_live_surface_releases_resources() {
        let gl = HeadlessDriver::new();
        let mut r = started(RendererConfig::default(), &gl);
        assert_eq!(gl.live_programs(), 1);
        assert_eq!(gl.live_buffers(), 1);

        r.on_surface_destroying(&gl);

        assert_eq!(gl.live_programs(), 0);
        assert_eq!(gl.live_buffers(), 0);
        assert_eq!(r.state(), SurfaceState::Detached);
        assert_eq!(r.program(), None);

        r.on_surface_created(&gl).unwrap();
        assert_eq!(gl.live_programs(), 1);
        assert_eq!(gl.live_buffers(), 1);
    }

    #[test]
    fn surface_change_before_creation_is_ignored() {
        let gl = HeadlessDriver::new();
        let mut r = FrameRenderer::default();

        r.on_surface_changed(&gl, 800, 600).unwrap();

        assert!(gl.calls().is_empty());
        assert_eq!(r.state(), SurfaceState::Detached);
        assert_eq!(r.surface_size(), None);
        assert_eq!(r.draw_frame(&gl), Ok(DrawOutcome::Skipped(SkipReason::NoSurface)));
        assert!(gl.calls().is_empty());
    }
}
