//! FBA Access - role-gated navigation for the feedback console
//!
//! Decides which routes and actions a signed-in user may reach:
//! - Roles and role sets
//! - The principal record and role request lifecycle
//! - A static catalog of routes and actions with one rule each
//! - A pure evaluator and a redirecting navigation guard
//!
//! # Example
//!
//! ```rust
//! use fba_access::prelude::*;
//!
//! let catalog = RouteCatalog::with_defaults();
//! let guard = NavigationGuard::new(&catalog);
//!
//! let viewer = Principal::new("vic", "vic@example.com", Role::Viewer);
//! let decision = guard.check(Some(&viewer), "/integrations");
//! assert_eq!(decision.target(), "/dashboard");
//!
//! let analyst = Principal::new("ana", "ana@example.com", Role::Analyst);
//! assert!(guard.check(Some(&analyst), "/integrations").is_allowed());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod catalog;
pub mod error;
pub mod guard;
pub mod policy;
pub mod principal;
pub mod role;
pub mod rule;

// Re-exports for convenience
pub use catalog::{NavEntry, RouteCatalog, RouteCatalogBuilder, DEFAULT_ROUTE, LOGIN_ROUTE};
pub use error::{AccessError, AccessResult};
pub use guard::{DenialReason, NavigationDecision, NavigationGuard};
pub use policy::{authenticated, can_access, effective_role, user_scope, AccessPolicy, UserScope};
pub use principal::{Principal, RoleAssignment, RoleDecision};
pub use role::{Role, RoleSet};
pub use rule::{actions, AccessRule};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for access checks
    pub use crate::{
        can_access, effective_role, AccessPolicy, AccessRule, DenialReason, NavigationDecision,
        NavigationGuard, Principal, Role, RoleSet, RouteCatalog,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
