//! Error handling for jsonlog
//!
//! Every operation that can fail returns `LogResult<T>`, an alias for
//! `Result<T, LogError>`.

use std::path::PathBuf;

/// Type alias for Result with [`LogError`] for logging setup operations
pub type LogResult<T> = Result<T, LogError>;

/// Errors raised while building configurations or opening appenders
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LogError {
    /// A category name was registered more than once
    #[error("Logger already initialized for the category: {0}")]
    DuplicateCategory(String),

    /// `maxFileSize` is neither a positive byte count nor a `<n>K|M|G` string
    #[error(
        "maxFileSize must be a valid log file size, got {0}. Expected: number (in case of size \
         in bytes) or number suffixed with K/M/G for kilo/mega/giga bytes"
    )]
    InvalidFileSize(String),

    /// `frequency` is not one of monthly/daily/hourly
    #[error("frequency must be valid, got '{0}'. Expected: monthly/daily/hourly")]
    InvalidFrequency(String),

    /// Options could not be interpreted
    #[error("Invalid logger configuration: {0}")]
    InvalidConfiguration(String),

    /// `get_loggers` was called before any category was registered
    #[error("Logger must be initialized for at least 1 category")]
    NoCategoriesRegistered,

    /// The effective output directory of a category does not exist
    #[error("Specified directory '{}' does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The file appender backing a category could not be created
    #[error("Appender '{appender}' error: {reason}")]
    Writer {
        /// Category whose appender failed
        appender: String,
        /// Backend error message
        reason: String,
    },
}

impl LogError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Create a writer initialization error
    pub fn writer(appender: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Writer {
            appender: appender.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the error was caused by the caller's configuration
    /// rather than by the environment the appenders run in
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateCategory(_)
                | Self::InvalidFileSize(_)
                | Self::InvalidFrequency(_)
                | Self::InvalidConfiguration(_)
                | Self::NoCategoriesRegistered
        )
    }
}
