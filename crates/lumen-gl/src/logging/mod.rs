//! Logging utilities.
//!
//! Every diagnostic in this crate (compile logs, missing uniforms, reload
//! results) goes through the `log` facade. This module only wires up the
//! `env_logger` backend for applications that do not bring their own.

mod init;

pub use init::{init_logging, LoggingConfig};
