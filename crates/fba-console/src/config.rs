//! Console configuration
//!
//! Defaults, then an optional TOML file, then `FBA_*` environment variables.

use crate::error::{ConsoleError, ConsoleResult};
use fba_access::{DEFAULT_ROUTE, LOGIN_ROUTE};
use fba_integrations::DEFAULT_STORAGE_KEY;
use fba_session::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding [`ConsoleConfig::api_base_url`]
pub const ENV_API_BASE_URL: &str = "FBA_API_BASE_URL";

/// Environment variable overriding [`ConsoleConfig::storage_dir`]
pub const ENV_STORAGE_DIR: &str = "FBA_STORAGE_DIR";

/// Console configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Backend API root
    pub api_base_url: String,
    /// Directory holding locally persisted settings
    pub storage_dir: PathBuf,
    /// Storage key of the integration settings
    pub storage_key: String,
    /// Auto-refresh period of data views, in seconds
    pub refresh_interval_secs: u64,
    /// Delay of the simulated connection test, in milliseconds
    pub connection_test_delay_ms: u64,
    /// Landing route after sign-in and for denied navigation
    pub default_route: String,
    /// Sign-in route
    pub login_route: String,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl ConsoleConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With backend API root
    #[inline]
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// With storage directory
    #[inline]
    #[must_use]
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// With auto-refresh period
    #[inline]
    #[must_use]
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval_secs = interval.as_secs();
        self
    }

    /// With simulated connection test delay
    #[inline]
    #[must_use]
    pub fn with_connection_test_delay(mut self, delay: Duration) -> Self {
        self.connection_test_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Auto-refresh period
    #[inline]
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Simulated connection test delay
    #[inline]
    #[must_use]
    pub fn connection_test_delay(&self) -> Duration {
        Duration::from_millis(self.connection_test_delay_ms)
    }

    /// Parse TOML; missing keys keep their defaults
    ///
    /// # Errors
    /// Returns [`ConsoleError::ConfigParse`] for malformed TOML and
    /// [`ConsoleError::Config`] for values that fail validation.
    pub fn from_toml_str(source: &str) -> ConsoleResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// Returns [`ConsoleError::ConfigIo`] if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> ConsoleResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConsoleError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Defaults or `path`, then process environment overrides
    ///
    /// # Errors
    /// Returns error if the file is unreadable or invalid.
    pub fn load(path: Option<&Path>) -> ConsoleResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `FBA_*` overrides from `lookup`
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(dir) = lookup(ENV_STORAGE_DIR).filter(|v| !v.trim().is_empty()) {
            self.storage_dir = PathBuf::from(dir);
        }
        self
    }

    /// Check value constraints
    ///
    /// # Errors
    /// Returns [`ConsoleError::Config`] naming the first bad value.
    pub fn validate(&self) -> ConsoleResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConsoleError::config("api_base_url must not be empty"));
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConsoleError::config("refresh_interval_secs must be positive"));
        }
        for (name, route) in [
            ("default_route", &self.default_route),
            ("login_route", &self.login_route),
        ] {
            if !route.starts_with('/') {
                return Err(ConsoleError::config(format!(
                    "{name} must start with '/', got '{route}'"
                )));
            }
        }
        if self.default_route == self.login_route {
            return Err(ConsoleError::config(
                "default_route and login_route must differ",
            ));
        }
        Ok(())
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            storage_dir: PathBuf::from(".fba"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            refresh_interval_secs: 30,
            connection_test_delay_ms: 1500,
            default_route: DEFAULT_ROUTE.to_string(),
            login_route: LOGIN_ROUTE.to_string(),
            log_level: "info".to_string(),
        }
    }
}
