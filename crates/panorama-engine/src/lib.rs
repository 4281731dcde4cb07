//! Panorama engine crate.
//!
//! Shader program construction, the triangle frame renderer, and the
//! winit + GL host that drives it.

pub mod assets;
pub mod core;
pub mod driver;
pub mod render;
pub mod shader;
pub mod window;

pub mod logging;
