//! Logging utilities.
//!
//! The crate logs through the `log` facade only. `init_logging` is a
//! convenience for binaries and tests that want an `env_logger` backend.

mod init;

pub use init::{LoggingConfig, init_logging};
