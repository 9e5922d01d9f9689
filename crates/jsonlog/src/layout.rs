//! JSON line rendering
//!
//! [`render`] projects one event onto the fields enabled in a category's
//! [`Layout`](crate::config::Layout). It never fails: a value that cannot be
//! produced (no call site, missing payload property) is left out of the line.

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::config::{Field, Level, LogConfig};
use crate::utils;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
);

/// Source location an event was emitted from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Source file as reported by the compiler
    pub file: &'static str,
    /// Line number
    pub line: u32,
    /// Enclosing function, when known
    pub function: Option<&'static str>,
}

impl CallSite {
    /// Call site without function attribution
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self {
            file,
            line,
            function: None,
        }
    }

    /// Attach the enclosing function name
    pub const fn with_function(mut self, function: &'static str) -> Self {
        self.function = Some(function);
        self
    }

    /// Location of the caller of a `#[track_caller]` function
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self::new(location.file(), location.line())
    }

    /// File name without directories
    pub fn file_name(&self) -> &'static str {
        let file = self.file;
        Path::new(file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(file)
    }
}

/// One event as seen by the renderer
#[derive(Debug, Clone, Copy)]
pub struct LogEvent<'a> {
    /// When the event was emitted
    pub time: OffsetDateTime,
    /// Severity
    pub level: Level,
    /// Category the event was emitted under
    pub category: &'a str,
    /// Where it was emitted from
    pub call_site: Option<CallSite>,
    /// Application payload; its properties feed the payload fields
    pub payload: &'a Value,
}

impl<'a> LogEvent<'a> {
    /// Event stamped with the current local time
    pub fn now(level: Level, category: &'a str, payload: &'a Value) -> Self {
        Self {
            time: now_local(),
            level,
            category,
            call_site: None,
            payload,
        }
    }

    /// Attach a call site
    pub fn with_call_site(mut self, call_site: Option<CallSite>) -> Self {
        self.call_site = call_site;
        self
    }
}

/// Current time in the local offset, UTC if the offset cannot be determined
pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Format a timestamp as `YYYY-MM-DD HH:mm:ss.SSS`
pub fn format_timestamp(time: OffsetDateTime) -> String {
    time.format(TIMESTAMP_FORMAT).unwrap_or_default()
}

/// Render `event` as a single JSON object using `config`'s layout
pub fn render(config: &LogConfig, event: &LogEvent<'_>) -> String {
    let mut line: IndexMap<&'static str, Value> = IndexMap::with_capacity(Field::COUNT);

    for field in config.layout.enabled_fields() {
        if let Some(value) = field_value(field, event) {
            line.insert(field.key(config.short_field_names), value);
        }
    }

    serde_json::to_string(&line).unwrap_or_else(|_| String::from("{}"))
}

fn field_value(field: Field, event: &LogEvent<'_>) -> Option<Value> {
    match field {
        Field::Timestamp => Some(Value::String(format_timestamp(event.time))),
        Field::Level => Some(Value::from(event.level.label())),
        Field::Category => Some(Value::from(event.category)),
        Field::ServerIp => Some(Value::from(utils::server_ip())),
        Field::File => event.call_site.map(|site| Value::from(site.file_name())),
        Field::Function => event
            .call_site
            .and_then(|site| site.function)
            .map(Value::from),
        Field::LineNumber => event.call_site.map(|site| Value::from(site.line)),
        Field::Data | Field::Id | Field::Context => payload_value(event.payload, field.name()),
    }
}

/// Composite payload values are embedded as JSON text rather than nested
fn payload_value(payload: &Value, name: &str) -> Option<Value> {
    match payload.get(name)? {
        composite @ (Value::Object(_) | Value::Array(_)) => {
            Some(Value::String(composite.to_string()))
        }
        scalar => Some(scalar.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Field, Layout};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use time::macros::datetime;

    const T: OffsetDateTime = datetime!(2024-03-05 07:08:09.123456 +02:00);

    fn config_with(fields: &[Field], short: bool) -> LogConfig {
        let mut layout = Layout::default();
        for field in Field::ALL {
            layout.set(field, fields.contains(&field));
        }
        LogConfig {
            layout,
            short_field_names: short,
            ..LogConfig::default()
        }
    }

    fn event<'a>(payload: &'a Value) -> LogEvent<'a> {
        LogEvent {
            time: T,
            level: Level::Info,
            category: "app",
            call_site: None,
            payload,
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(T), "2024-03-05 07:08:09.123");
    }

    #[test]
    fn test_short_names_in_declaration_order() {
        let config = config_with(&[Field::Level, Field::Timestamp], true);
        let payload = json!({});
        assert_eq!(
            render(&config, &event(&payload)),
            r#"{"ts":"2024-03-05 07:08:09.123","lvl":"INFO"}"#
        );
    }

    #[test]
    fn test_composite_data_is_stringified() {
        let config = config_with(&[Field::Data], false);
        let payload = json!({"data": {"key": "value"}});
        assert_eq!(
            render(&config, &event(&payload)),
            r#"{"data":"{\"key\":\"value\"}"}"#
        );
    }

    #[test]
    fn test_scalar_payload_fields_kept_as_is() {
        let config = config_with(&[Field::Data, Field::Id, Field::Context], true);
        let payload = json!({"data": "GET /clients/123", "id": 123_456_789, "context": ["a"]});
        assert_eq!(
            render(&config, &event(&payload)),
            r#"{"dt":"GET /clients/123","id":123456789,"ctx":"[\"a\"]"}"#
        );
    }

    #[test]
    fn test_missing_values_are_omitted() {
        let config = config_with(
            &[Field::Data, Field::File, Field::Function, Field::LineNumber, Field::Id],
            false,
        );
        let payload = json!("not an object");
        assert_eq!(render(&config, &event(&payload)), "{}");
    }

    #[test]
    fn test_call_site_fields() {
        let config = config_with(
            &[Field::File, Field::Function, Field::LineNumber, Field::Category],
            false,
        );
        let payload = Value::Null;
        let site = CallSite::new("src/handlers/users.rs", 42).with_function("get_user");
        let event = event(&payload).with_call_site(Some(site));

        assert_eq!(
            render(&config, &event),
            r#"{"file":"users.rs","function":"get_user","lineNumber":42,"category":"app"}"#
        );
    }

    #[test]
    fn test_server_ip_field() {
        let config = config_with(&[Field::ServerIp], true);
        let payload = Value::Null;
        let rendered: Value = serde_json::from_str(&render(&config, &event(&payload))).unwrap();
        assert_eq!(rendered["sIp"], utils::server_ip());
    }

    #[test]
    fn test_caller_location() {
        let site = CallSite::caller();
        assert_eq!(site.file_name(), "layout.rs");
        assert_eq!(site.line, line!() - 2);
        assert_eq!(site.function, None);
    }
}
