//! Appender descriptions and the file writers behind them

use std::path::PathBuf;
use std::sync::Arc;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::{Frequency, LOG_EXTENSION, LogConfig, RotationPolicy};
use crate::core::{LogResult, LogResultExt};

/// Guard flushing a non-blocking writer when dropped
pub type WriterGuard = tracing_appender::non_blocking::WorkerGuard;

/// Backend-facing description of one category's output
#[derive(Debug, Clone)]
pub struct Appender {
    /// Category the appender serves
    pub category: String,
    /// Resolved configuration, shared with the category's logger
    pub config: Arc<LogConfig>,
}

impl Appender {
    /// Path of the active log file
    pub fn path(&self) -> PathBuf {
        self.config.file_path()
    }

    /// Backend appender type: `file` unless time rotation is active
    pub fn appender_type(&self) -> &'static str {
        self.config
            .active_rotation()
            .map_or("file", |settings| settings.policy.kind().appender_type())
    }
}

/// Rotation schedule and retention the file appender can honour for `appender`
fn backend_rotation(appender: &Appender) -> (Rotation, Option<usize>) {
    let Some(settings) = appender.config.active_rotation() else {
        return (Rotation::NEVER, None);
    };

    match settings.policy {
        RotationPolicy::Time {
            num_backups,
            pattern,
            ..
        } => {
            let rotation = match pattern.frequency() {
                Frequency::Hourly => Rotation::HOURLY,
                Frequency::Daily => Rotation::DAILY,
                Frequency::Monthly => {
                    tracing::warn!(
                        category = %appender.category,
                        "monthly rotation is not supported by the file appender, rotation disabled"
                    );
                    Rotation::NEVER
                }
            };
            (rotation, Some(num_backups as usize))
        }
        RotationPolicy::Size {
            backups,
            max_log_size,
        } => {
            tracing::warn!(
                category = %appender.category,
                max_log_size = %max_log_size,
                backups,
                "size based rotation is not supported by the file appender, rotation disabled"
            );
            (Rotation::NEVER, None)
        }
    }
}

/// Create the writer for an appender
///
/// With `non_blocking` the returned guard must be kept alive for buffered
/// lines to be flushed.
///
/// # Errors
///
/// Returns [`LogError::Writer`](crate::LogError::Writer) if the file appender
/// cannot be created
pub fn make_writer(
    appender: &Appender,
    non_blocking: bool,
) -> LogResult<(BoxMakeWriter, Option<WriterGuard>)> {
    let (rotation, max_files) = backend_rotation(appender);

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(appender.config.file_name.clone())
        .filename_suffix(LOG_EXTENSION);
    if let Some(max_files) = max_files.filter(|n| *n > 0) {
        builder = builder.max_log_files(max_files);
    }

    let file_appender = builder
        .build(&appender.config.directory)
        .for_appender(&appender.category)?;

    tracing::debug!(
        category = %appender.category,
        path = %appender.path().display(),
        appender_type = appender.appender_type(),
        non_blocking,
        "opened log appender"
    );

    if non_blocking {
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        Ok((BoxMakeWriter::new(writer), Some(guard)))
    } else {
        Ok((BoxMakeWriter::new(file_appender), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Options, merge};
    use serde_json::json;
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    fn appender(dir: &std::path::Path, overrides: serde_json::Value) -> Appender {
        let mut config = LogConfig {
            directory: dir.to_path_buf(),
            ..LogConfig::default()
        };
        merge(&mut config, &Options::from_value(overrides).unwrap()).unwrap();
        Appender {
            category: "app".to_string(),
            config: Arc::new(config),
        }
    }

    #[test]
    fn test_appender_type() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(appender(dir.path(), json!({})).appender_type(), "file");
        assert_eq!(
            appender(dir.path(), json!({"enableRotation": true})).appender_type(),
            "dateFile"
        );
        assert_eq!(
            appender(
                dir.path(),
                json!({"enableRotation": true, "rotationOptions": {"type": "size"}})
            )
            .appender_type(),
            "file"
        );
    }

    #[test]
    fn test_backend_rotation_mapping() {
        let dir = tempfile::tempdir().unwrap();

        let (rotation, max) = backend_rotation(&appender(dir.path(), json!({})));
        assert_eq!(rotation, Rotation::NEVER);
        assert_eq!(max, None);

        let hourly = appender(
            dir.path(),
            json!({"enableRotation": true, "rotationOptions": {"frequency": "hourly", "backupCount": 2}}),
        );
        let (rotation, max) = backend_rotation(&hourly);
        assert_eq!(rotation, Rotation::HOURLY);
        assert_eq!(max, Some(2));

        let monthly = appender(
            dir.path(),
            json!({"enableRotation": true, "rotationOptions": {"frequency": "monthly"}}),
        );
        assert_eq!(backend_rotation(&monthly).0, Rotation::NEVER);
    }

    #[test]
    fn test_blocking_writer_writes_to_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let appender = appender(dir.path(), json!({"fileName": "http"}));

        let (writer, guard) = make_writer(&appender, false).unwrap();
        assert!(guard.is_none());
        writeln!(writer.make_writer(), "{{\"data\":1}}").unwrap();

        let contents = std::fs::read_to_string(dir.path().join("http.log")).unwrap();
        assert_eq!(contents, "{\"data\":1}\n");
    }

    #[test]
    fn test_non_blocking_writer_flushes_on_guard_drop() {
        let dir = tempfile::tempdir().unwrap();
        let appender = appender(dir.path(), json!({}));

        let (writer, guard) = make_writer(&appender, true).unwrap();
        writeln!(writer.make_writer(), "line").unwrap();
        drop(guard);

        let contents = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert_eq!(contents, "line\n");
    }
}
