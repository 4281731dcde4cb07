use crate::driver::{DriverFault, GraphicsDriver};

/// Renderer contract driven by a surface host.
///
/// The host calls every method on its rendering thread, never concurrently:
/// `on_surface_created` once per (re)created surface, `on_surface_changed`
/// after creation and on every resize, `on_draw_frame` per redraw.
/// Every `on_surface_created` starts from a fresh context: ids handed out
/// by an earlier surface are stale and must not reach the new driver.
///
/// A returned [`DriverFault`] is fatal; hosts stop rendering and shut down.
pub trait SurfaceRenderer {
    fn on_surface_created(&mut self, gl: &dyn GraphicsDriver) -> Result<(), DriverFault>;

    /// `width` and `height` are the drawable size in physical pixels.
    fn on_surface_changed(
        &mut self,
        gl: &dyn GraphicsDriver,
        width: u32,
        height: u32,
    ) -> Result<(), DriverFault>;

    fn on_draw_frame(&mut self, gl: &dyn GraphicsDriver) -> Result<(), DriverFault>;

    /// The surface is about to be destroyed while its context is still
    /// current; `gl` is the driver that created the renderer's resources.
    ///
    /// Hosts that cannot guarantee a live context skip this and go straight
    /// to [`on_surface_lost`](Self::on_surface_lost).
    fn on_surface_destroying(&mut self, _gl: &dyn GraphicsDriver) {}

    /// The surface and its context are gone; every driver id is stale.
    ///
    /// No driver is passed: nothing may be released through it.
    fn on_surface_lost(&mut self) {}
}
