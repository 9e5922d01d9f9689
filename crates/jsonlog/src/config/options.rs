//! User-facing options and input normalisation
//!
//! [`Options`] is the closed set of keys a configuration or a per-category
//! override may carry. Keys outside it are dropped while deserialising, so
//! overrides can carry unrelated data without being rejected. Extra field
//! names and rotation options are read leniently; rotation values are only
//! checked once rotation is resolved.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::rotation::{Frequency, RotationType, is_truthy};
use crate::core::{LogError, LogResult, LogResultExt};

/// Options accepted at construction time and per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Directory log files are written to; must exist when loggers are built
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Base file name, `.log` is appended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Hand rotation settings to the appender
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_rotation: Option<bool>,
    /// Use compact field keys in rendered lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_field_names: Option<bool>,
    /// Opt-in fields to emit in addition to `timestamp` and `data`
    ///
    /// Non-string entries are kept as their JSON text, which never names a
    /// field; a non-array value counts as unset.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_entries"
    )]
    pub extra_log_fields: Option<Vec<String>>,
    /// Rotation policy options, only read when rotation is enabled
    ///
    /// A non-object value counts as unset.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "object_or_unset"
    )]
    pub rotation_options: Option<RotationOptions>,
}

/// Rotation options in the user vocabulary
///
/// Every value is kept raw; [`RotationSettings::apply`] interprets them.
///
/// [`RotationSettings::apply`]: super::RotationSettings::apply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RotationOptions {
    /// `size` or `time`; anything else keeps the current kind
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub rotation_type: Option<Value>,
    /// Rotated files to keep, a number or a numeric string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_count: Option<Value>,
    /// Size threshold of the size policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<Value>,
    /// `monthly`, `daily` or `hourly` for the time policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Value>,
    /// Compress rotated files when truthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_backups: Option<Value>,
}

fn string_entries<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => Some(
            entries
                .into_iter()
                .map(|entry| match entry {
                    Value::String(name) => name,
                    other => other.to_string(),
                })
                .collect(),
        ),
        _ => None,
    })
}

fn object_or_unset<'de, D>(deserializer: D) -> Result<Option<RotationOptions>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Returns `value` as an object if it is a non-empty object, an empty one otherwise
pub fn normalize(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) if !map.is_empty() => map,
        _ => Map::new(),
    }
}

impl Options {
    /// Build options from an untyped value
    ///
    /// Non-object and empty values yield empty options.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidConfiguration`] if a recognised key holds a
    /// value of the wrong type
    pub fn from_value(value: Value) -> LogResult<Self> {
        let map = normalize(value);
        if map.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_value(Value::Object(map)).or_config_error(|| "options")
    }

    /// Options from `JSONLOG_*` environment variables
    ///
    /// | Variable | Option |
    /// |---|---|
    /// | `JSONLOG_DIR` | `directory` |
    /// | `JSONLOG_FILE_NAME` | `fileName` |
    /// | `JSONLOG_ROTATION` | `enableRotation` |
    /// | `JSONLOG_SHORT_FIELDS` | `shortFieldNames` |
    /// | `JSONLOG_EXTRA_FIELDS` | `extraLogFields`, comma separated |
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            directory: std::env::var_os("JSONLOG_DIR").map(PathBuf::from),
            file_name: std::env::var("JSONLOG_FILE_NAME").ok(),
            enable_rotation: env_flag("JSONLOG_ROTATION"),
            short_field_names: env_flag("JSONLOG_SHORT_FIELDS"),
            extra_log_fields: std::env::var("JSONLOG_EXTRA_FIELDS").ok().map(|fields| {
                fields
                    .split(',')
                    .map(str::trim)
                    .filter(|field| !field.is_empty())
                    .map(String::from)
                    .collect()
            }),
            rotation_options: None,
        }
    }

    /// Whether no recognised option is set
    ///
    /// Registration decides whether a category shares the base configuration
    /// from the raw overrides instead; see [`normalize`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl TryFrom<Value> for Options {
    type Error = LogError;

    fn try_from(value: Value) -> LogResult<Self> {
        Self::from_value(value)
    }
}

impl RotationOptions {
    /// `type` if it names a known rotation kind
    pub fn kind(&self) -> Option<RotationType> {
        self.rotation_type
            .as_ref()
            .and_then(Value::as_str)
            .and_then(RotationType::parse)
    }

    /// `frequency` parsed; unset, empty or `null` yields `None`
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidFrequency`] for anything set that is not
    /// `monthly`, `daily` or `hourly`
    pub fn frequency(&self) -> LogResult<Option<Frequency>> {
        match self.frequency.as_ref().filter(|v| is_truthy(v)) {
            None => Ok(None),
            Some(Value::String(name)) => Frequency::parse(name).map(Some),
            Some(other) => Err(LogError::InvalidFrequency(other.to_string())),
        }
    }

    /// Whether `archiveBackups` is truthy
    pub fn archive_backups(&self) -> bool {
        self.archive_backups.as_ref().is_some_and(is_truthy)
    }

    /// `backupCount` coerced to a number; unset or zero yields `None`
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidConfiguration`] if the value is not numeric
    pub fn backup_count(&self) -> LogResult<Option<u32>> {
        let Some(value) = self.backup_count.as_ref().filter(|v| is_truthy(v)) else {
            return Ok(None);
        };
        let count = match value {
            Value::Number(number) => number.as_u64(),
            Value::String(text) => text.trim().parse::<u64>().ok(),
            _ => None,
        };
        count
            .and_then(|count| u32::try_from(count).ok())
            .map(Some)
            .ok_or_else(|| LogError::config(format!("backupCount must be a number, got {value}")))
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| v != "0" && v != "false")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_normalize_non_objects() {
        assert!(normalize(Value::Null).is_empty());
        assert!(normalize(json!([1, 2])).is_empty());
        assert!(normalize(json!("app")).is_empty());
        assert!(normalize(json!({})).is_empty());
        assert_eq!(normalize(json!({"fileName": "x"})).len(), 1);
    }

    #[test]
    fn test_from_value_ignores_unknown_keys() {
        let options = Options::from_value(json!({
            "fileName": "http",
            "layout": {"level": true},
            "compress": true,
            "whatever": [1, 2, 3]
        }))
        .unwrap();

        assert_eq!(
            options,
            Options {
                file_name: Some("http".to_string()),
                ..Options::default()
            }
        );
    }

    #[test]
    fn test_from_value_rejects_wrong_types() {
        let error = Options::from_value(json!({"enableRotation": "yes"})).unwrap_err();
        assert!(matches!(error, LogError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r"
directory: /var/log/app
enableRotation: true
extraLogFields: [level, serverIp]
rotationOptions:
  type: size
  backupCount: 2
  maxFileSize: 10M
";
        let options: Options = serde_yaml::from_str(yaml).unwrap();
        let rotation = options.rotation_options.unwrap();

        assert_eq!(options.directory, Some(PathBuf::from("/var/log/app")));
        assert_eq!(options.enable_rotation, Some(true));
        assert_eq!(rotation.kind(), Some(RotationType::Size));
        assert_eq!(rotation.max_file_size, Some(json!("10M")));
        assert_eq!(rotation.backup_count().unwrap(), Some(2));
    }

    #[test]
    fn test_extra_fields_accept_non_strings() {
        let options =
            Options::from_value(json!({"extraLogFields": ["level", 5, null, "id"]})).unwrap();
        assert_eq!(
            options.extra_log_fields,
            Some(vec![
                "level".to_string(),
                "5".to_string(),
                "null".to_string(),
                "id".to_string()
            ])
        );

        let options = Options::from_value(json!({"extraLogFields": "level"})).unwrap();
        assert_eq!(options.extra_log_fields, None);
    }

    #[test]
    fn test_rotation_options_are_not_checked_while_reading() {
        let options = Options::from_value(json!({
            "enableRotation": false,
            "rotationOptions": {"type": 5, "frequency": ["daily"], "archiveBackups": "yes"}
        }))
        .unwrap();
        let rotation = options.rotation_options.unwrap();

        assert_eq!(rotation.kind(), None);
        assert!(rotation.archive_backups());
        assert!(matches!(
            rotation.frequency(),
            Err(LogError::InvalidFrequency(_))
        ));

        let options = Options::from_value(json!({"rotationOptions": "size"})).unwrap();
        assert_eq!(options.rotation_options, None);
    }

    #[test]
    fn test_frequency_parsing() {
        let frequency = |value: Value| RotationOptions {
            frequency: Some(value),
            ..RotationOptions::default()
        };

        assert_eq!(
            frequency(json!("hourly")).frequency().unwrap(),
            Some(Frequency::Hourly)
        );
        assert_eq!(frequency(json!("")).frequency().unwrap(), None);
        assert_eq!(frequency(Value::Null).frequency().unwrap(), None);
        assert!(frequency(json!("weekly")).frequency().is_err());
    }

    #[test]
    fn test_backup_count_coercion() {
        let count = |value: Value| RotationOptions {
            backup_count: Some(value),
            ..RotationOptions::default()
        };

        assert_eq!(count(json!(5)).backup_count().unwrap(), Some(5));
        assert_eq!(count(json!("12")).backup_count().unwrap(), Some(12));
        assert_eq!(count(json!(0)).backup_count().unwrap(), None);
        assert_eq!(count(json!("")).backup_count().unwrap(), None);
        assert!(count(json!("many")).backup_count().is_err());
        assert_eq!(RotationOptions::default().backup_count().unwrap(), None);
    }

    #[test]
    fn test_is_empty() {
        assert!(Options::default().is_empty());
        assert!(Options::from_value(json!({"unrelated": 1})).unwrap().is_empty());
        assert!(
            !Options {
                short_field_names: Some(false),
                ..Options::default()
            }
            .is_empty()
        );
    }
}
