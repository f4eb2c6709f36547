//! Error types for the console
//!
//! Wraps the errors of the underlying crates. Access denials on navigation
//! are not errors; they come back as redirects from the guard.

use fba_access::AccessError;
use fba_integrations::IntegrationError;
use fba_session::ApiError;
use std::path::PathBuf;

/// Console errors
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Configuration value rejected
    #[error("config error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("config file {path}: {source}")]
    ConfigIo {
        /// Configuration file path
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for the console
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Role or catalog error
    #[error("access error: {0}")]
    Access(#[from] AccessError),

    /// Integration settings error
    #[error("integration error: {0}")]
    Integration(#[from] IntegrationError),

    /// Backend call failed
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Signed-in principal may not perform the action
    #[error("not permitted: {0}")]
    Forbidden(String),
}

impl ConsoleError {
    /// Create config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Text suitable for a transient notification
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Integration(IntegrationError::NotFound(id)) => {
                format!("Unknown integration '{id}'")
            }
            Self::Forbidden(_) => "You do not have permission to do that".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;
