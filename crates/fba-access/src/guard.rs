//! Navigation guard
//!
//! Turns a policy denial into a silent two-tier redirect: signed-out users go
//! to the login route, signed-in users lacking the role go to the default
//! route. No message is produced, so restricted routes are not revealed.

use crate::catalog::{normalize_route, RouteCatalog};
use crate::policy::{authenticated, AccessPolicy};
use crate::principal::Principal;

/// Why a navigation attempt was redirected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// No (active) principal
    AuthenticationRequired,
    /// Principal lacks a role the route admits
    AuthorizationDenied,
}

/// Outcome of a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Render the requested route
    Allow {
        /// Normalized route
        route: String,
    },
    /// Render another route instead
    Redirect {
        /// Redirect target
        to: String,
        /// Denial tier
        reason: DenialReason,
    },
}

impl NavigationDecision {
    /// Check if navigation proceeds
    #[inline]
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    /// Route that ends up rendered
    #[inline]
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Allow { route } => route,
            Self::Redirect { to, .. } => to,
        }
    }
}

/// Route guard over a catalog
#[derive(Debug, Clone, Copy)]
pub struct NavigationGuard<'a> {
    catalog: &'a RouteCatalog,
}

impl<'a> NavigationGuard<'a> {
    /// Create guard
    #[inline]
    #[must_use]
    pub fn new(catalog: &'a RouteCatalog) -> Self {
        Self { catalog }
    }

    /// Decide a navigation attempt to `route`
    #[must_use]
    pub fn check(&self, principal: Option<&Principal>, route: &str) -> NavigationDecision {
        let route = normalize_route(route);

        if route == self.catalog.login_route() {
            return NavigationDecision::Allow {
                route: route.to_string(),
            };
        }

        if authenticated(principal).is_none() {
            tracing::debug!(route, "Redirecting unauthenticated navigation");
            return NavigationDecision::Redirect {
                to: self.catalog.login_route().to_string(),
                reason: DenialReason::AuthenticationRequired,
            };
        }

        if self.catalog.permits(principal, route) {
            NavigationDecision::Allow {
                route: route.to_string(),
            }
        } else {
            tracing::debug!(route, "Redirecting unauthorized navigation");
            NavigationDecision::Redirect {
                to: self.catalog.default_route().to_string(),
                reason: DenialReason::AuthorizationDenied,
            }
        }
    }
}
