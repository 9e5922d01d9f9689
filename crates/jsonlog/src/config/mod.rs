//! Configuration types and merge rules
//!
//! This module is organized into:
//! - `base`: Resolved per-category configuration and severity levels
//! - `fields`: Field registry and layout
//! - `options`: User-facing options and input normalisation
//! - `rotation`: Rotation policies and their resolution
//! - `merge`: Overlaying options onto a configuration

mod base;
mod fields;
mod merge;
mod options;
mod rotation;

// Re-export all public types
pub use base::{DEFAULT_CATEGORY, LOG_EXTENSION, Level, LogConfig};
pub use fields::{Field, Layout};
pub use merge::merge;
pub use options::{Options, RotationOptions, normalize};
pub use rotation::{
    DEFAULT_BACKUPS, DEFAULT_MAX_FILE_SIZE, DatePattern, FileSize, Frequency, RotationPolicy,
    RotationSettings, RotationType, SizeUnit, is_valid_file_size,
};
