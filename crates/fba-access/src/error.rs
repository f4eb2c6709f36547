//! Error types for access control
//!
//! Authorization failures are not errors: the guard returns a redirect
//! decision. These errors cover catalog construction and role administration.

/// Access control errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// Role name not recognized
    #[error("unknown role: '{0}'")]
    UnknownRole(String),

    /// A route or action was given more than one rule
    #[error("duplicate access rule for '{0}'")]
    DuplicateRule(String),

    /// Default route is gated, so some signed-in roles could not land on it
    #[error("default route '{0}' must admit every role")]
    GatedDefaultRoute(String),

    /// Role decision requested for a principal without a pending request
    #[error("no pending role request for user {username}")]
    NoPendingRequest {
        /// Username of the principal
        username: String,
    },
}

impl AccessError {
    /// Create no-pending-request error
    pub fn no_pending_request(username: impl Into<String>) -> Self {
        Self::NoPendingRequest {
            username: username.into(),
        }
    }
}

/// Result type alias for access operations
pub type AccessResult<T> = Result<T, AccessError>;
