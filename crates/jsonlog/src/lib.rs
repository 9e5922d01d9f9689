//! # jsonlog - per-category JSON file logging
//!
//! Turns a small declarative configuration into file appenders that write one
//! JSON object per line. A base configuration is set up once; every category
//! either shares it or overrides parts of it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jsonlog::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let mut registry = LogRegistry::from_value(json!({
//!         "directory": "/var/log/my-service",
//!         "enableRotation": true,
//!         "extraLogFields": ["level", "file", "lineNumber"],
//!         "rotationOptions": { "type": "time", "frequency": "daily", "backupCount": 7 }
//!     }))?;
//!     registry.register_category("app", Options::default())?;
//!     registry.register_category_value("http", json!({ "fileName": "http" }))?;
//!
//!     let loggers = registry.get_loggers()?;
//!     loggers["http"].info(&json!({ "data": "GET /clients/123" }));
//!     log_info!(loggers["app"], json!({ "data": { "key": "value" }, "id": 42 }));
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod core;
pub mod layout;
mod logger;
mod macros;
mod registry;
mod utils;
pub mod writer;

// Public API
pub use crate::config::{
    DEFAULT_CATEGORY, Field, Layout, Level, LogConfig, Options, RotationOptions,
};
pub use crate::core::{LogError, LogResult};
pub use layout::{CallSite, LogEvent, render};
pub use logger::{CategoryLogger, Loggers};
pub use registry::LogRegistry;
pub use utils::server_ip;
pub use writer::Appender;

#[doc(hidden)]
pub use utils::function_name as __function_name;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        CategoryLogger, Field, Level, LogError, LogRegistry, Loggers, Options, log_debug,
        log_error, log_event, log_info, log_trace, log_warn,
    };

    /// Result type for setup operations
    pub type Result<T> = crate::LogResult<T>;
}
