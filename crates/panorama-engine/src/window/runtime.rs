use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use crate::core::SurfaceRenderer;

use super::surface::GlSurfaceEntry;

/// When the runtime asks for new frames.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum RenderMode {
    /// Redraw as fast as presentation allows.
    #[default]
    Continuously,
    /// Redraw only after surface creation, resize or expose.
    WhenDirty,
}

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub render_mode: RenderMode,
    /// Requested OpenGL ES version; desktop OpenGL 2.1 is the fallback.
    pub gles_version: (u8, u8),
    pub vsync: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "panorama".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            render_mode: RenderMode::Continuously,
            gles_version: (2, 0),
            vsync: true,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `renderer` through its surface lifecycle
    /// until the window closes or the renderer reports a driver fault.
    pub fn run<R>(config: RuntimeConfig, renderer: R) -> Result<()>
    where
        R: SurfaceRenderer + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, renderer);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct AppState<R> {
    config: RuntimeConfig,
    renderer: R,
    surface: Option<GlSurfaceEntry>,
    failure: Option<anyhow::Error>,
}

impl<R> AppState<R>
where
    R: SurfaceRenderer,
{
    fn new(config: RuntimeConfig, renderer: R) -> Self {
        Self { config, renderer, surface: None, failure: None }
    }

    /// Records the first fatal error and stops the loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.surface = None;
        event_loop.exit();
    }

    fn attach_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let entry = GlSurfaceEntry::create(event_loop, &self.config)?;
        let size = entry.size();

        self.renderer
            .on_surface_created(entry.driver())
            .context("renderer failed on surface creation")?;
        self.renderer
            .on_surface_changed(entry.driver(), size.width, size.height)
            .context("renderer failed on surface change")?;

        entry.window().request_redraw();
        self.surface = Some(entry);
        Ok(())
    }

    /// Lets the renderer release its resources while the context is still
    /// current, then drops the surface. Returns whether a surface existed.
    fn detach_surface(&mut self) -> bool {
        let Some(entry) = self.surface.take() else {
            return false;
        };
        self.renderer.on_surface_destroying(entry.driver());
        drop(entry);
        self.renderer.on_surface_lost();
        true
    }

    fn draw(&mut self) -> Result<()> {
        let Some(entry) = self.surface.as_ref() else {
            return Ok(());
        };
        self.renderer
            .on_draw_frame(entry.driver())
            .context("renderer failed to draw frame")?;
        entry.present()
    }
}

impl<R> ApplicationHandler for AppState<R>
where
    R: SurfaceRenderer,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() {
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        if let Err(e) = self.attach_surface(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if self.detach_surface() {
            log::info!("surface released on suspend");
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.config.render_mode == RenderMode::Continuously {
            if let Some(entry) = &self.surface {
                entry.window().request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.surface.as_ref() else {
            return;
        };
        if entry.window().id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.detach_surface();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                entry.resize(size);
                let changed = self
                    .renderer
                    .on_surface_changed(entry.driver(), size.width, size.height)
                    .context("renderer failed on surface change");
                match changed {
                    Ok(()) => entry.window().request_redraw(),
                    Err(e) => self.fail(event_loop, e),
                }
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.draw() {
                    self.fail(event_loop, e);
                }
            }

            _ => {}
        }
    }
}
