use std::num::NonZeroU32;

use anyhow::{anyhow, Context, Result};
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext, Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::driver::GlowDriver;

use super::runtime::RuntimeConfig;

/// Window + current GL context + driver, created and destroyed together.
///
/// Field order is drop order: the driver goes first, the window last.
pub(crate) struct GlSurfaceEntry {
    driver: GlowDriver,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
}

impl GlSurfaceEntry {
    pub(crate) fn create(event_loop: &ActiveEventLoop, config: &RuntimeConfig) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attrs))
            .build(event_loop, template, pick_config)
            .map_err(|e| anyhow!("failed to create GL display: {e}"))?;
        let window = window.context("GL display did not create a window")?;

        let raw_handle = window.window_handle().ok().map(|h| h.as_raw());
        let display = gl_config.display();

        let (major, minor) = config.gles_version;
        let preferred = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(Some(Version::new(major, minor))))
            .build(raw_handle);
        let legacy = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(2, 1))))
            .build(raw_handle);

        // SAFETY: `raw_handle` comes from `window`, which this entry keeps
        // alive for at least as long as the context.
        let not_current = match unsafe { display.create_context(&gl_config, &preferred) } {
            Ok(ctx) => ctx,
            Err(e) => {
                log::warn!("GLES {major}.{minor} context unavailable ({e}); trying OpenGL 2.1");
                unsafe { display.create_context(&gl_config, &legacy) }
                    .context("failed to create GL context")?
            }
        };

        let surface_attrs = window
            .build_surface_attributes(Default::default())
            .context("failed to build window surface attributes")?;
        // SAFETY: same window ownership argument as above.
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attrs) }
            .context("failed to create window surface")?;
        let context = not_current
            .make_current(&surface)
            .context("failed to make GL context current")?;

        if config.vsync {
            let interval = SwapInterval::Wait(NonZeroU32::MIN);
            if let Err(e) = surface.set_swap_interval(&context, interval) {
                log::warn!("failed to enable vsync: {e}");
            }
        }

        // SAFETY: the context was just made current on this thread and stays
        // current until this entry (driver first) is dropped.
        let driver = unsafe {
            let gl = glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name));
            GlowDriver::new(gl)
        };

        Ok(Self { driver, surface, context, window })
    }

    pub(crate) fn driver(&self) -> &GlowDriver {
        &self.driver
    }

    pub(crate) fn window(&self) -> &Window {
        &self.window
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.window.inner_size()
    }

    /// Resizes the drawable; zero-sized (minimized) surfaces are left as they are.
    pub(crate) fn resize(&self, size: PhysicalSize<u32>) {
        if let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
            self.surface.resize(&self.context, w, h);
        }
    }

    pub(crate) fn present(&self) -> Result<()> {
        self.window.pre_present_notify();
        self.surface
            .swap_buffers(&self.context)
            .context("failed to swap buffers")
    }
}

/// Prefers configs without multisampling; the triangle needs none.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .min_by_key(|c| c.num_samples())
        .expect("glutin only calls the picker with at least one config")
}
