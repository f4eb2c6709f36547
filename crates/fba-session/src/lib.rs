//! FBA Session - who is signed in, and the backend they talk to
//!
//! - [`SessionContext`]: principal and bearer token, set and cleared together
//! - [`AuthGateway`]: credential exchange, implemented by [`ApiClient`]
//! - [`ApiClient`]: typed calls to the REST backend
//!
//! The session is an explicit value handed to whoever needs it; there is no
//! process-wide current user.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod session;

// Re-exports for convenience
pub use auth::AuthGateway;
pub use client::{ApiClient, DEFAULT_BASE_URL, DEFAULT_DASHBOARD_DAYS, DEFAULT_TIMEOUT};
pub use error::{ApiError, ApiResult};
pub use models::{
    AdminActionResponse, ClusteringInfo, DashboardStats, FeedbackFilter, FeedbackItem,
    ProfileUpdate, RegisterRequest, RoleDecisionUser, Sentiment, TokenResponse, UrgencyLevel,
    UserRecord, UserStatusUser,
};
pub use session::{AccessToken, LoginResponse, SessionContext};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for session handling
    pub use crate::{
        AccessToken, ApiClient, ApiError, ApiResult, AuthGateway, LoginResponse, SessionContext,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
