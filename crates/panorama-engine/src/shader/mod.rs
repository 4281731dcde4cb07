//! Shader compilation and program linking.

mod error;
mod program;

pub use error::ShaderError;
pub use program::ShaderProgramBuilder;
