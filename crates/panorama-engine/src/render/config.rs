use crate::assets::AssetLoader;
use crate::driver::ClearMask;

/// Built-in placeholder shaders (GLSL ES 1.00).
pub const INLINE_VERTEX_SHADER: &str = include_str!("shaders/triangle.vert");
pub const INLINE_FRAGMENT_SHADER: &str = include_str!("shaders/triangle.frag");

/// Where the renderer gets its shader text on surface creation.
#[derive(Debug, Default)]
pub enum ShaderOrigin {
    /// Built-in placeholder shaders.
    #[default]
    Inline,
    /// Named resources read through `loader`, once per surface.
    Assets {
        loader: Box<dyn AssetLoader>,
        vertex: String,
        fragment: String,
    },
}

impl ShaderOrigin {
    /// Assets origin using the conventional file names.
    pub fn assets(loader: impl AssetLoader + 'static) -> Self {
        ShaderOrigin::Assets {
            loader: Box::new(loader),
            vertex: "vertex_shader.glsl".to_string(),
            fragment: "fragment_shader.glsl".to_string(),
        }
    }
}

/// Whether a resize updates the GL viewport.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ViewportPolicy {
    /// `viewport(0, 0, width, height)` on every surface change.
    #[default]
    Track,
    /// Record the size only; the driver keeps its initial viewport.
    DriverDefault,
}

/// What happens to the position attribute array after each draw.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum AttribPolicy {
    /// Enabled once per frame and left enabled.
    #[default]
    LeaveEnabled,
    DisableAfterDraw,
}

/// Frame renderer configuration.
#[derive(Debug)]
pub struct RendererConfig {
    pub shader_origin: ShaderOrigin,
    /// Vertex input the triangle positions are bound to.
    pub position_attribute: String,
    pub viewport_policy: ViewportPolicy,
    pub attrib_policy: AttribPolicy,
    pub clear: ClearMask,
    /// Set once per frame before clearing; `None` keeps the driver's clear color.
    pub clear_color: Option<[f32; 4]>,
    /// Check the driver error flag after every draw.
    pub check_draw_errors: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            shader_origin: ShaderOrigin::Inline,
            position_attribute: "aPosition".to_string(),
            viewport_policy: ViewportPolicy::Track,
            attrib_policy: AttribPolicy::LeaveEnabled,
            clear: ClearMask::COLOR_DEPTH,
            clear_color: None,
            check_draw_errors: false,
        }
    }
}
