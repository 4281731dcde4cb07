//! Logging utilities.
//!
//! Centralizes logger initialization on top of the `log` facade. Library code
//! only ever uses the `log` macros; binaries pick the backend through here.

mod init;

pub use init::{init_logging, LoggingConfig};
