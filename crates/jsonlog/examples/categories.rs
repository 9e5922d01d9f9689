//! Two categories sharing one base configuration
//!
//! Run with `cargo run -p jsonlog --example categories`; lines land in
//! `./logs/base.log` and `./logs/http.log`.

use jsonlog::prelude::*;
use serde_json::json;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let directory = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&directory)?;

    let mut registry = LogRegistry::from_value(json!({
        "directory": directory,
        "fileName": "base",
        "enableRotation": true,
        "extraLogFields": ["level", "file", "function", "lineNumber", "serverIp", "category"],
        "rotationOptions": {
            "type": "time",
            "backupCount": 2,
            "frequency": "hourly",
            "archiveBackups": true
        }
    }))?
    .non_blocking(true);

    registry.register_category("app", Options::default())?;
    registry.register_category_value(
        "http",
        json!({
            "fileName": "http",
            "enableRotation": true,
            "extraLogFields": ["serverIp"],
            "rotationOptions": { "type": "size", "backupCount": 2, "maxFileSize": 10 }
        }),
    )?;

    if let Err(e) = registry.register_category("app", Options::default()) {
        eprintln!("{e}");
    }

    let loggers = registry.get_loggers()?;
    do_something(&loggers);
    Ok(())
}

fn do_something(loggers: &Loggers) {
    log_info!(
        loggers["http"],
        json!({ "data": "GET request sent to https://example.com/clients/123" })
    );
    log_debug!(loggers["app"], json!({ "data": { "key": "value" }, "id": 123_456_789 }));
}
