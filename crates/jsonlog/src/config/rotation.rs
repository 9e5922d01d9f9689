//! Rotation policy resolution
//!
//! Users speak in terms of `size` / `time` rotation; the backend knows a plain
//! `file` appender (size based) and a `dateFile` appender (time based). The two
//! policies carry disjoint settings, so [`RotationPolicy`] is an enum and
//! switching kinds drops every setting of the previous kind.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::options::RotationOptions;
use crate::core::{LogError, LogResult};

/// Default number of rotated files kept by either policy
pub const DEFAULT_BACKUPS: u32 = 90;

/// Default size threshold of the size policy
pub const DEFAULT_MAX_FILE_SIZE: FileSize = FileSize::Scaled {
    value: 10,
    unit: SizeUnit::Mega,
};

static FILE_SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-9]+[0-9]*[KMG]$").unwrap_or_else(|e| panic!("invalid file size pattern: {e}"))
});

/// User-facing rotation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationType {
    /// Rotate once the file grows past a size
    Size,
    /// Rotate when the date window changes
    Time,
}

impl RotationType {
    /// Parse the user vocabulary; unknown values yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "size" => Some(Self::Size),
            "time" => Some(Self::Time),
            _ => None,
        }
    }

    /// Backend appender type this rotation kind maps onto
    pub const fn appender_type(self) -> &'static str {
        match self {
            Self::Size => "file",
            Self::Time => "dateFile",
        }
    }
}

/// Time window of the time policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// One file per month
    Monthly,
    /// One file per day
    Daily,
    /// One file per hour
    Hourly,
}

impl Frequency {
    /// Parse a frequency name
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidFrequency`] for anything but monthly/daily/hourly
    pub fn parse(value: &str) -> LogResult<Self> {
        match value {
            "monthly" => Ok(Self::Monthly),
            "daily" => Ok(Self::Daily),
            "hourly" => Ok(Self::Hourly),
            other => Err(LogError::InvalidFrequency(other.to_string())),
        }
    }

    /// Date pattern appended to rotated file names
    pub const fn pattern(self) -> &'static str {
        match self {
            Self::Monthly => "MM-yyyy",
            Self::Daily => "dd-MM-yyyy",
            Self::Hourly => "dd-MM-yyyy-hh",
        }
    }
}

/// Date pattern of the time policy, derived from a [`Frequency`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePattern(pub Frequency);

impl DatePattern {
    /// Frequency this pattern rotates at
    pub const fn frequency(self) -> Frequency {
        self.0
    }
}

impl Serialize for DatePattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.pattern())
    }
}

/// Multiplier suffix of a size string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    /// `K`, 1024 bytes
    Kilo,
    /// `M`, 1024 K
    Mega,
    /// `G`, 1024 M
    Giga,
}

impl SizeUnit {
    const fn suffix(self) -> char {
        match self {
            Self::Kilo => 'K',
            Self::Mega => 'M',
            Self::Giga => 'G',
        }
    }

    const fn multiplier(self) -> u64 {
        match self {
            Self::Kilo => 1 << 10,
            Self::Mega => 1 << 20,
            Self::Giga => 1 << 30,
        }
    }
}

/// Size threshold of the size policy
///
/// A bare number counts bytes; a string must carry a `K`, `M` or `G` suffix.
/// A numeric string without suffix is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSize {
    /// Exact byte count, given as a JSON number
    Bytes(u64),
    /// `<value><unit>` string
    Scaled {
        /// Leading positive integer
        value: u64,
        /// Suffix
        unit: SizeUnit,
    },
}

impl FileSize {
    /// Parse a size from a raw option value
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_u64().filter(|n| *n > 0).map(Self::Bytes),
            Value::String(text) => Self::parse_scaled(text),
            _ => None,
        }
    }

    fn parse_scaled(text: &str) -> Option<Self> {
        if !FILE_SIZE_PATTERN.is_match(text) {
            return None;
        }
        let (digits, suffix) = text.split_at(text.len() - 1);
        let unit = match suffix {
            "K" => SizeUnit::Kilo,
            "M" => SizeUnit::Mega,
            _ => SizeUnit::Giga,
        };
        // Digits only, so parsing fails on overflow alone
        let value = digits.parse().unwrap_or(u64::MAX);
        Some(Self::Scaled { value, unit })
    }

    /// Threshold in bytes
    pub fn bytes(self) -> u64 {
        match self {
            Self::Bytes(bytes) => bytes,
            Self::Scaled { value, unit } => value.saturating_mul(unit.multiplier()),
        }
    }
}

impl std::fmt::Display for FileSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes(bytes) => write!(f, "{bytes}"),
            Self::Scaled { value, unit } => write!(f, "{value}{}", unit.suffix()),
        }
    }
}

impl Serialize for FileSize {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bytes(bytes) => serializer.serialize_u64(*bytes),
            Self::Scaled { .. } => serializer.collect_str(self),
        }
    }
}

/// Returns `true` if `value` is an acceptable `maxFileSize`
pub fn is_valid_file_size(value: &Value) -> bool {
    FileSize::from_value(value).is_some()
}

/// Active rotation policy; exactly one shape is ever present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum RotationPolicy {
    /// Size based rotation (`file` appender)
    #[serde(rename = "file", rename_all = "camelCase")]
    Size {
        /// Rotated files kept
        backups: u32,
        /// Threshold that triggers a rotation
        max_log_size: FileSize,
    },
    /// Time based rotation (`dateFile` appender)
    #[serde(rename = "dateFile", rename_all = "camelCase")]
    Time {
        /// Rotated files kept
        num_backups: u32,
        /// Date pattern of rotated files
        pattern: DatePattern,
        /// Keep the pattern in the name of the active file too
        always_include_pattern: bool,
    },
}

impl RotationPolicy {
    /// Size policy with default settings
    pub const fn size_defaults() -> Self {
        Self::Size {
            backups: DEFAULT_BACKUPS,
            max_log_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Time policy with default settings
    pub const fn time_defaults() -> Self {
        Self::Time {
            num_backups: DEFAULT_BACKUPS,
            pattern: DatePattern(Frequency::Daily),
            always_include_pattern: true,
        }
    }

    /// User-facing kind of this policy
    pub const fn kind(&self) -> RotationType {
        match self {
            Self::Size { .. } => RotationType::Size,
            Self::Time { .. } => RotationType::Time,
        }
    }

    /// Policy of `kind` with its default settings
    pub const fn defaults_for(kind: RotationType) -> Self {
        match kind {
            RotationType::Size => Self::size_defaults(),
            RotationType::Time => Self::time_defaults(),
        }
    }
}

/// Everything the backend needs to rotate a category's file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationSettings {
    /// Active policy
    #[serde(flatten)]
    pub policy: RotationPolicy,
    /// Keep the `.log` extension after the date/index suffix
    pub keep_file_ext: bool,
    /// Gzip rotated files
    pub compress: bool,
    /// Separator between file name and rotation suffix
    pub file_name_sep: String,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            policy: RotationPolicy::time_defaults(),
            keep_file_ext: true,
            compress: false,
            file_name_sep: "-".to_string(),
        }
    }
}

impl RotationSettings {
    /// Apply user rotation options on top of these settings
    ///
    /// A recognised `type` switches the policy kind. Whatever the kind, the
    /// policy is first reset to that kind's defaults, then `backupCount`,
    /// `maxFileSize` (size) or `frequency` (time) are applied.
    /// `archiveBackups` turns compression on for both kinds.
    ///
    /// # Errors
    ///
    /// - [`LogError::InvalidFileSize`] for a bad `maxFileSize` on the size policy
    /// - [`LogError::InvalidFrequency`] for a bad `frequency` on the time policy
    /// - [`LogError::InvalidConfiguration`] for a non-numeric `backupCount`
    pub fn apply(&mut self, options: &RotationOptions) -> LogResult<()> {
        let kind = options.kind().unwrap_or_else(|| self.policy.kind());
        let backups = options.backup_count()?;

        self.policy = match RotationPolicy::defaults_for(kind) {
            RotationPolicy::Size {
                backups: default_backups,
                max_log_size,
            } => {
                let max_log_size = match &options.max_file_size {
                    Some(value) if is_truthy(value) => FileSize::from_value(value)
                        .ok_or_else(|| LogError::InvalidFileSize(value.to_string()))?,
                    _ => max_log_size,
                };
                RotationPolicy::Size {
                    backups: backups.unwrap_or(default_backups),
                    max_log_size,
                }
            }
            RotationPolicy::Time {
                num_backups,
                pattern,
                always_include_pattern,
            } => {
                let pattern = options.frequency()?.map_or(pattern, DatePattern);
                RotationPolicy::Time {
                    num_backups: backups.unwrap_or(num_backups),
                    pattern,
                    always_include_pattern,
                }
            }
        };

        if options.archive_backups() {
            self.compress = true;
        }
        Ok(())
    }
}

/// Mirrors the "is this option set" check of the option vocabulary: zero,
/// empty strings, `false` and `null` count as unset
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
