//! Atlas Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by the other Atlas crates:
//! - Client configuration (API root, credentials, timeout) persisted as TOML
//! - A single error type covering transport, HTTP, and decoding failures
//! - Structured logging with tracing
//! - Platform constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;

// Re-export commonly used items at the crate root
pub use config::{ApiConfig, AppConfig};
pub use error::{AtlasError, AtlasResult};
pub use logging::init_logging;
