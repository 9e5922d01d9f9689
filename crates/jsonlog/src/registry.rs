//! Category registry
//!
//! [`LogRegistry`] owns the base configuration and the configuration of every
//! registered category. Categories registered without overrides share the base
//! configuration; the others own a copy with their overrides merged in.
//! Nothing can be changed after registration.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::{LogConfig, Options, merge, normalize};
use crate::core::{LogError, LogResult};
use crate::logger::{CategoryLogger, Loggers};
use crate::utils;
use crate::writer::{self, Appender};

/// Configuration slot of a registered category
#[derive(Debug, Clone)]
enum CategoryConfig {
    /// Use the base configuration
    Base,
    /// Base configuration with overrides applied
    Custom(Arc<LogConfig>),
}

/// Builds per-category loggers from a base configuration and overrides
#[derive(Debug)]
pub struct LogRegistry {
    base: Arc<LogConfig>,
    categories: IndexMap<String, CategoryConfig>,
    non_blocking: bool,
}

impl LogRegistry {
    /// Create a registry whose base configuration is the defaults with
    /// `options` applied
    ///
    /// # Errors
    ///
    /// Returns rotation errors raised while applying `options`
    pub fn new(options: Options) -> LogResult<Self> {
        let mut base = LogConfig::default();
        merge(&mut base, &options)?;
        tracing::debug!(
            directory = %base.directory.display(),
            file_name = %base.file_name,
            enable_rotation = base.enable_rotation,
            "base log configuration resolved"
        );

        Ok(Self {
            base: Arc::new(base),
            categories: IndexMap::new(),
            non_blocking: false,
        })
    }

    /// Create a registry from untyped options; see [`Options::from_value`]
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidConfiguration`] for mistyped options and
    /// rotation errors raised while applying them
    pub fn from_value(options: Value) -> LogResult<Self> {
        Self::new(Options::from_value(options)?)
    }

    /// Write through background workers instead of on the emitting thread
    #[must_use]
    pub fn non_blocking(mut self, enabled: bool) -> Self {
        self.non_blocking = enabled;
        self
    }

    /// Base configuration categories without overrides use
    pub fn base_config(&self) -> &LogConfig {
        &self.base
    }

    /// Register `category`, optionally with overrides of the base configuration
    ///
    /// Empty `overrides` share the base configuration.
    ///
    /// # Errors
    ///
    /// - [`LogError::DuplicateCategory`] if `category` is already registered
    /// - rotation errors raised while applying `overrides`
    pub fn register_category(
        &mut self,
        category: impl Into<String>,
        overrides: Options,
    ) -> LogResult<()> {
        let overrides = (!overrides.is_empty()).then_some(overrides);
        self.insert_category(category.into(), overrides.as_ref())
    }

    /// Register `category` with untyped overrides; see [`Options::from_value`]
    ///
    /// Only an absent, non-object or empty object value shares the base
    /// configuration. Any other object is merged into a copy of the base,
    /// even if none of its keys is recognised.
    ///
    /// # Errors
    ///
    /// Same as [`register_category`](Self::register_category), plus
    /// [`LogError::InvalidConfiguration`] for mistyped overrides
    pub fn register_category_value(
        &mut self,
        category: impl Into<String>,
        overrides: Value,
    ) -> LogResult<()> {
        let category = category.into();
        if self.categories.contains_key(&category) {
            return Err(LogError::DuplicateCategory(category));
        }

        let overrides = normalize(overrides);
        let overrides = if overrides.is_empty() {
            None
        } else {
            Some(Options::from_value(Value::Object(overrides))?)
        };
        self.insert_category(category, overrides.as_ref())
    }

    fn insert_category(&mut self, category: String, overrides: Option<&Options>) -> LogResult<()> {
        if self.categories.contains_key(&category) {
            return Err(LogError::DuplicateCategory(category));
        }

        let config = match overrides {
            None => CategoryConfig::Base,
            Some(overrides) => {
                let mut config = LogConfig::clone(&self.base);
                merge(&mut config, overrides)?;
                CategoryConfig::Custom(Arc::new(config))
            }
        };

        tracing::debug!(
            category = %category,
            custom = matches!(config, CategoryConfig::Custom(_)),
            "registered log category"
        );
        self.categories.insert(category, config);
        Ok(())
    }

    /// Whether `category` has been registered
    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Effective configuration of `category`
    pub fn config(&self, category: &str) -> Option<&LogConfig> {
        self.categories
            .get(category)
            .map(|slot| self.resolve(slot).as_ref())
    }

    /// Whether `category` shares the base configuration
    pub fn uses_base_config(&self, category: &str) -> bool {
        matches!(self.categories.get(category), Some(CategoryConfig::Base))
    }

    fn resolve<'a>(&'a self, slot: &'a CategoryConfig) -> &'a Arc<LogConfig> {
        match slot {
            CategoryConfig::Base => &self.base,
            CategoryConfig::Custom(config) => config,
        }
    }

    /// Appender descriptions of every category, in registration order
    ///
    /// # Errors
    ///
    /// - [`LogError::NoCategoriesRegistered`] if no category was registered
    /// - [`LogError::DirectoryNotFound`] if a category's directory is missing
    pub fn appenders(&self) -> LogResult<Vec<Appender>> {
        if self.categories.is_empty() {
            return Err(LogError::NoCategoriesRegistered);
        }

        self.categories
            .iter()
            .map(|(category, slot)| {
                let config = self.resolve(slot);
                if !config.directory.is_dir() {
                    return Err(LogError::DirectoryNotFound(config.directory.clone()));
                }
                Ok(Appender {
                    category: category.clone(),
                    config: Arc::clone(config),
                })
            })
            .collect()
    }

    /// Open the appender of every category and return their loggers
    ///
    /// # Errors
    ///
    /// - [`LogError::NoCategoriesRegistered`] if no category was registered
    /// - [`LogError::DirectoryNotFound`] if a category's directory is missing
    /// - [`LogError::Writer`] if an appender cannot be opened
    pub fn get_loggers(&self) -> LogResult<Loggers> {
        let appenders = self.appenders()?;
        // Resolve the host address now so rendering never touches the network stack
        let server_ip = utils::server_ip();
        tracing::debug!(server_ip, "host address resolved");

        let mut loggers = IndexMap::with_capacity(appenders.len());
        let mut guards = Vec::new();

        for appender in appenders {
            let (writer, guard) = writer::make_writer(&appender, self.non_blocking)?;
            guards.extend(guard);
            let logger =
                CategoryLogger::new(appender.category.as_str(), appender.config, writer);
            loggers.insert(appender.category, logger);
        }

        Ok(Loggers::new(loggers, guards))
    }
}
