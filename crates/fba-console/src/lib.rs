//! FBA Console - the feedback analyzer front end without the pixels
//!
//! Drives what the console pages do:
//! - Role-gated navigation and menus over [`fba_access`]
//! - Sign-in and admin calls over [`fba_session`]
//! - Integration settings over [`fba_integrations`]
//! - Loading state, notifications and periodic refresh of data views
//!
//! # Example
//!
//! ```rust
//! use fba_console::prelude::*;
//! use fba_integrations::MemoryStorage;
//!
//! let mut console = Console::new(ConsoleConfig::default(), MemoryStorage::new()).unwrap();
//! let decision = console.navigate("/admin");
//! assert_eq!(decision.target(), "/login");
//! assert!(console.menu().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod app;
pub mod config;
pub mod error;
pub mod refresh;
pub mod view;

// Re-exports for convenience
pub use app::{build_catalog, AdminDataSource, AdminView, Console};
pub use config::{ConsoleConfig, ENV_API_BASE_URL, ENV_STORAGE_DIR};
pub use error::{ConsoleError, ConsoleResult};
pub use refresh::{AutoRefresh, RefreshGate, RefreshPermit, DEFAULT_REFRESH_INTERVAL};
pub use view::{Notification, NotificationLevel, Notifications, ViewState};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the console
    pub use crate::{
        AdminDataSource, AdminView, AutoRefresh, Console, ConsoleConfig, ConsoleError,
        ConsoleResult, Notification, NotificationLevel, ViewState,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
