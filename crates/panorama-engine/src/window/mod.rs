//! Window + runtime loop.
//!
//! Owns the `winit` event loop and a GL(ES) window surface, and maps their
//! events onto the `SurfaceRenderer` lifecycle.

mod runtime;
mod surface;

pub use runtime::{RenderMode, Runtime, RuntimeConfig};
