//! Graphics driver binding.
//!
//! The rest of the crate talks to the GPU only through [`GraphicsDriver`]:
//! - `GlowDriver` issues real OpenGL / OpenGL ES calls through `glow`
//! - `HeadlessDriver` records calls in-process (tests, headless runs)

mod api;
mod error;
mod gl;
mod headless;
mod types;

pub use api::GraphicsDriver;
pub use error::{check_error, DriverFault};
pub use gl::GlowDriver;
pub use headless::{DriverCall, HeadlessDriver};
pub use types::{
    AttribLocation, BufferId, ClearMask, ErrorCode, ProgramId, ShaderId, ShaderStage, VertexLayout,
};
