//! Resolved per-category configuration

use std::path::PathBuf;

use serde::Serialize;

use super::fields::Layout;
use super::rotation::RotationSettings;

/// Category used when none is named
pub const DEFAULT_CATEGORY: &str = "app";

/// Extension appended to every log file name
pub const LOG_EXTENSION: &str = "log";

/// Settings one category logs with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    /// Directory the log file lives in
    pub directory: PathBuf,
    /// File name without extension
    pub file_name: String,
    /// Fields emitted per line
    pub layout: Layout,
    /// Whether the rotation settings are handed to the appender
    pub enable_rotation: bool,
    /// Use compact field keys
    pub short_field_names: bool,
    /// Rotation settings, inert unless `enable_rotation` is set
    #[serde(rename = "rotationOptions")]
    pub rotation: RotationSettings,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            file_name: DEFAULT_CATEGORY.to_string(),
            layout: Layout::default(),
            enable_rotation: false,
            short_field_names: false,
            rotation: RotationSettings::default(),
        }
    }
}

impl LogConfig {
    /// Full path of the active log file
    pub fn file_path(&self) -> PathBuf {
        self.directory
            .join(format!("{}.{LOG_EXTENSION}", self.file_name))
    }

    /// Rotation settings the appender should honour, if rotation is on
    pub fn active_rotation(&self) -> Option<&RotationSettings> {
        self.enable_rotation.then_some(&self.rotation)
    }
}

/// Severity of an emitted event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Trace level
    Trace,
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warn level
    Warn,
    /// Error level
    Error,
    /// Fatal level
    Fatal,
}

impl Level {
    /// Label written to the `level` field
    pub const fn label(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
