//! Logging and observability
//!
//! Structured logging with configurable levels, console output and optional
//! rotating JSON log files.

pub mod structured;

pub use structured::{init_logging, LoggingGuard};
