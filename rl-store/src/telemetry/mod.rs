//! Telemetry Module
//!
//! Structured logging setup shared by every binary built on the ledger.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
