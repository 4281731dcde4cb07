use std::fmt;

use crate::driver::{DriverFault, ShaderStage};

/// Failure while turning shader sources into a linked program.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    /// Source text was empty or missing; no driver object was created.
    EmptySource(ShaderStage),
    /// The driver returned no shader object.
    ShaderCreateFailed(ShaderStage),
    /// The driver returned no program object.
    ProgramCreateFailed,
    Compile { stage: ShaderStage, log: String },
    Link { log: String },
    /// Fatal driver error observed mid-build.
    Driver(DriverFault),
}

impl ShaderError {
    /// The fatal fault behind this error, if there is one.
    pub fn driver_fault(&self) -> Option<DriverFault> {
        match self {
            ShaderError::Driver(fault) => Some(*fault),
            _ => None,
        }
    }
}

impl From<DriverFault> for ShaderError {
    fn from(fault: DriverFault) -> Self {
        ShaderError::Driver(fault)
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::EmptySource(stage) => write!(f, "{stage} shader source is empty"),
            ShaderError::ShaderCreateFailed(stage) => {
                write!(f, "driver could not create a {stage} shader object")
            }
            ShaderError::ProgramCreateFailed => f.write_str("driver could not create a program object"),
            ShaderError::Compile { stage, log } => {
                write!(f, "could not compile {stage} shader: {}", log.trim_end())
            }
            ShaderError::Link { log } => write!(f, "could not link program: {}", log.trim_end()),
            ShaderError::Driver(fault) => write!(f, "driver fault: {fault}"),
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShaderError::Driver(fault) => Some(fault),
            _ => None,
        }
    }
}
