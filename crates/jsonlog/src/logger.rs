//! Per-category logging handles

use std::io::Write;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::{Level, LogConfig};
use crate::layout::{self, CallSite, LogEvent};
use crate::writer::WriterGuard;

/// Handle emitting JSON lines for one category
///
/// Every emitted event is rendered with the category's layout and written as
/// one line. Emission never fails; write errors are reported through
/// `tracing` and the event is dropped.
pub struct CategoryLogger {
    category: Arc<str>,
    config: Arc<LogConfig>,
    writer: BoxMakeWriter,
}

impl std::fmt::Debug for CategoryLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryLogger")
            .field("category", &self.category)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CategoryLogger {
    /// Create a handle writing to `writer`
    pub fn new(
        category: impl Into<Arc<str>>,
        config: Arc<LogConfig>,
        writer: BoxMakeWriter,
    ) -> Self {
        Self {
            category: category.into(),
            config,
            writer,
        }
    }

    /// Category name
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Configuration this handle renders with
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Emit `payload` at `level`
    ///
    /// `payload` is expected to serialize to an object carrying `data` and
    /// optionally the other payload fields (`id`, `context`).
    pub fn log<T: Serialize + ?Sized>(
        &self,
        level: Level,
        payload: &T,
        call_site: Option<CallSite>,
    ) {
        let payload = serde_json::to_value(payload).unwrap_or_else(|e| {
            tracing::warn!(
                category = %self.category,
                error = %e,
                "log payload is not serializable"
            );
            Value::Null
        });
        let event = LogEvent::now(level, &self.category, &payload).with_call_site(call_site);
        self.write_line(&layout::render(&self.config, &event));
    }

    /// Hands the line and its newline to the writer in a single `write_all`
    /// so concurrent emitters never interleave inside a line
    fn write_line(&self, line: &str) {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let mut writer = self.writer.make_writer();
        if let Err(e) = writer.write_all(buf.as_bytes()) {
            tracing::warn!(category = %self.category, error = %e, "failed to write log line");
        }
    }

    /// Emit at TRACE
    #[track_caller]
    pub fn trace<T: Serialize + ?Sized>(&self, payload: &T) {
        self.log(Level::Trace, payload, Some(CallSite::caller()));
    }

    /// Emit at DEBUG
    #[track_caller]
    pub fn debug<T: Serialize + ?Sized>(&self, payload: &T) {
        self.log(Level::Debug, payload, Some(CallSite::caller()));
    }

    /// Emit at INFO
    #[track_caller]
    pub fn info<T: Serialize + ?Sized>(&self, payload: &T) {
        self.log(Level::Info, payload, Some(CallSite::caller()));
    }

    /// Emit at WARN
    #[track_caller]
    pub fn warn<T: Serialize + ?Sized>(&self, payload: &T) {
        self.log(Level::Warn, payload, Some(CallSite::caller()));
    }

    /// Emit at ERROR
    #[track_caller]
    pub fn error<T: Serialize + ?Sized>(&self, payload: &T) {
        self.log(Level::Error, payload, Some(CallSite::caller()));
    }

    /// Emit at FATAL
    #[track_caller]
    pub fn fatal<T: Serialize + ?Sized>(&self, payload: &T) {
        self.log(Level::Fatal, payload, Some(CallSite::caller()));
    }
}

/// Loggers for every registered category
///
/// Holds the guards of non-blocking writers; dropping this value flushes them.
#[derive(Debug)]
pub struct Loggers {
    loggers: IndexMap<String, CategoryLogger>,
    _guards: Vec<WriterGuard>,
}

impl Loggers {
    pub(crate) fn new(loggers: IndexMap<String, CategoryLogger>, guards: Vec<WriterGuard>) -> Self {
        Self {
            loggers,
            _guards: guards,
        }
    }

    /// Logger of `category`
    pub fn get(&self, category: &str) -> Option<&CategoryLogger> {
        self.loggers.get(category)
    }

    /// Logger of the first registered category
    pub fn default_logger(&self) -> Option<&CategoryLogger> {
        self.loggers.first().map(|(_, logger)| logger)
    }

    /// Registered category names in registration order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.loggers.keys().map(String::as_str)
    }

    /// Iterate over `(category, logger)` pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryLogger)> {
        self.loggers
            .iter()
            .map(|(category, logger)| (category.as_str(), logger))
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    /// Whether there are no categories
    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl std::ops::Index<&str> for Loggers {
    type Output = CategoryLogger;

    fn index(&self, category: &str) -> &CategoryLogger {
        match self.loggers.get(category) {
            Some(logger) => logger,
            None => panic!("no logger registered for category '{category}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Field, Options, merge};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    /// In-memory sink shared between the logger and the test; records each
    /// `write` call separately
    #[derive(Clone, Default)]
    struct Buffer {
        bytes: Arc<Mutex<Vec<u8>>>,
        writes: Arc<Mutex<Vec<Vec<u8>>>>,
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.bytes.lock().unwrap().extend_from_slice(buf);
            self.writes.lock().unwrap().push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn lines(&self) -> Vec<Value> {
            let bytes = self.bytes.lock().unwrap();
            std::str::from_utf8(&bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    fn logger(overrides: Value) -> (CategoryLogger, Buffer) {
        let mut config = LogConfig::default();
        merge(&mut config, &Options::from_value(overrides).unwrap()).unwrap();
        let buffer = Buffer::default();
        let sink = buffer.clone();
        let logger = CategoryLogger::new(
            "http",
            Arc::new(config),
            BoxMakeWriter::new(move || sink.clone()),
        );
        (logger, buffer)
    }

    #[test]
    fn test_emits_one_line_per_event() {
        let (logger, buffer) = logger(json!({"extraLogFields": ["level", "category"]}));

        logger.info(&json!({"data": "GET request sent"}));
        logger.error(&json!({"data": {"key": "value"}, "id": 7}));

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["level"], "INFO");
        assert_eq!(lines[0]["data"], "GET request sent");
        assert_eq!(lines[0]["category"], "http");
        assert_eq!(lines[1]["level"], "ERROR");
        assert_eq!(lines[1]["data"], r#"{"key":"value"}"#);
        assert!(lines[1].get("id").is_none());
    }

    #[test]
    fn test_event_written_in_one_call() {
        let (logger, buffer) = logger(json!({"extraLogFields": ["level"]}));
        logger.info(&json!({"data": "x"}));

        let writes = buffer.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        let line = std::str::from_utf8(&writes[0]).unwrap();
        assert!(line.ends_with('\n'));
        let parsed: Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed["data"], "x");
    }

    #[test]
    fn test_concurrent_emission_keeps_lines_whole() {
        let (logger, buffer) = logger(json!({"extraLogFields": ["level", "category"]}));

        std::thread::scope(|scope| {
            for thread in 0..8 {
                let logger = &logger;
                scope.spawn(move || {
                    for i in 0..200 {
                        logger.info(&json!({"data": format!("{thread}-{i}")}));
                    }
                });
            }
        });

        let lines = buffer.lines();
        assert_eq!(lines.len(), 8 * 200);
        assert!(lines.iter().all(|line| line["category"] == "http"));
    }

    #[test]
    fn test_track_caller_attribution() {
        let (logger, buffer) =
            logger(json!({"extraLogFields": ["file", "lineNumber", "function"]}));

        logger.warn(&json!({"data": 1}));
        let line = line!() - 1;

        let lines = buffer.lines();
        assert_eq!(lines[0]["file"], "logger.rs");
        assert_eq!(lines[0]["lineNumber"], line);
        assert!(lines[0].get("function").is_none());
    }

    #[test]
    fn test_serializable_payloads() {
        #[derive(Serialize)]
        struct Request<'a> {
            data: &'a str,
            context: [u8; 2],
        }

        let (logger, buffer) =
            logger(json!({"extraLogFields": ["context"], "shortFieldNames": true}));
        logger.debug(&Request {
            data: "payload",
            context: [1, 2],
        });

        let line = &buffer.lines()[0];
        assert_eq!(line["dt"], "payload");
        assert_eq!(line["ctx"], "[1,2]");
        assert!(line.get("ts").is_some());
    }

    #[test]
    fn test_loggers_lookup() {
        let (http, _) = logger(json!({}));
        let (app, _) = logger(json!({}));
        let mut map = IndexMap::new();
        map.insert("http".to_string(), http);
        map.insert("app".to_string(), app);
        let loggers = Loggers::new(map, Vec::new());

        assert_eq!(loggers.len(), 2);
        assert_eq!(loggers.categories().collect::<Vec<_>>(), vec!["http", "app"]);
        assert!(loggers.get("missing").is_none());
        assert!(loggers.default_logger().is_some());
        assert!(loggers["app"].config().layout.is_enabled(Field::Data));
    }
}
