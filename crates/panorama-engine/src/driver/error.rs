use std::fmt;

use super::api::GraphicsDriver;
use super::types::ErrorCode;

/// Upper bound on flags drained after a fault; a lost context can report errors forever.
const MAX_QUEUED_ERRORS: usize = 16;

/// Unexpected driver error observed right after a state-mutating call.
///
/// Fatal: the operation that observed it must stop and hand the fault to its caller.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DriverFault {
    /// Name of the call the check followed (e.g. `"glAttachShader"`).
    pub label: &'static str,
    pub code: ErrorCode,
}

impl fmt::Display for DriverFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: glError {}", self.label, self.code)
    }
}

impl std::error::Error for DriverFault {}

/// Fails with a [`DriverFault`] if the driver has a pending error flag.
///
/// Any further queued flags are logged and cleared so the next check starts clean.
pub fn check_error<D>(gl: &D, label: &'static str) -> Result<(), DriverFault>
where
    D: GraphicsDriver + ?Sized,
{
    let Some(code) = gl.get_error() else {
        return Ok(());
    };

    log::error!("{label}: glError {code}");

    for _ in 0..MAX_QUEUED_ERRORS {
        match gl.get_error() {
            Some(extra) => log::error!("{label}: glError {extra} (queued)"),
            None => break,
        }
    }

    Err(DriverFault { label, code })
}
