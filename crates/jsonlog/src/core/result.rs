//! Result extension traits for setup operations

use crate::core::error::{LogError, LogResult};

/// Extension trait for Result types (log-specific)
pub trait LogResultExt<T> {
    /// Convert any error into [`LogError::InvalidConfiguration`] with context
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidConfiguration`] with the context prepended
    fn or_config_error<S: Into<String>, F>(self, f: F) -> LogResult<T>
    where
        F: FnOnce() -> S;

    /// Attribute an error to the appender of `category`
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Writer`] carrying the original error message
    fn for_appender(self, category: &str) -> LogResult<T>;
}

impl<T, E> LogResultExt<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn or_config_error<S: Into<String>, F>(self, f: F) -> LogResult<T>
    where
        F: FnOnce() -> S,
    {
        self.map_err(|e| {
            let ctx = f().into();
            LogError::InvalidConfiguration(format!("{ctx}: {e}"))
        })
    }

    fn for_appender(self, category: &str) -> LogResult<T> {
        self.map_err(|e| LogError::writer(category, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_or_config_error() {
        let result: Result<(), io::Error> = Err(io::Error::other("bad type"));
        let error = result.or_config_error(|| "enableRotation").unwrap_err();

        assert!(error.is_config_error());
        assert_eq!(
            error.to_string(),
            "Invalid logger configuration: enableRotation: bad type"
        );
    }

    #[test]
    fn test_for_appender() {
        let result: Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let error = result.for_appender("http").unwrap_err();

        assert!(!error.is_config_error());
        assert!(matches!(error, LogError::Writer { ref appender, .. } if appender == "http"));
    }
}
