//! Core renderer-facing contracts.
//!
//! Defines the lifecycle interface between a surface host (the windowing
//! runtime, or a test harness) and the renderer it drives.

mod surface;

pub use surface::SurfaceRenderer;
