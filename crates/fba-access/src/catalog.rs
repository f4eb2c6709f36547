//! Route catalog
//!
//! The static table of navigation entries and action rules, built once at
//! startup. Every route and action has exactly one rule; lookups for
//! anything else deny, except the authenticated default route.

use crate::error::{AccessError, AccessResult};
use crate::policy::{authenticated, can_access, AccessPolicy};
use crate::principal::Principal;
use crate::role::RoleSet;
use crate::rule::{default_action_rules, AccessRule};
use indexmap::IndexMap;

/// Landing route for authenticated users
pub const DEFAULT_ROUTE: &str = "/dashboard";

/// Sign-in route
pub const LOGIN_ROUTE: &str = "/login";

/// Entry in the navigation menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// Route path
    pub route: String,
    /// Menu label
    pub label: String,
}

/// Static route and action rule table
#[derive(Debug, Clone)]
pub struct RouteCatalog {
    rules: IndexMap<String, AccessRule>,
    menu: Vec<NavEntry>,
    default_route: String,
    login_route: String,
}

impl RouteCatalog {
    /// Start building a catalog
    #[inline]
    #[must_use]
    pub fn builder() -> RouteCatalogBuilder {
        RouteCatalogBuilder::new()
    }

    /// Catalog used by the console
    ///
    /// | Route | Roles |
    /// |-------|-------|
    /// | `/dashboard`, `/feedback`, `/settings` | everyone |
    /// | `/analytics`, `/upload`, `/clustering`, `/reports`, `/integrations` | analyst, admin |
    /// | `/admin` | admin |
    #[must_use]
    pub fn with_defaults() -> Self {
        // The table has no duplicates, so build cannot fail.
        match Self::default_table().build() {
            Ok(catalog) => catalog,
            Err(e) => unreachable!("default catalog is invalid: {e}"),
        }
    }

    /// Builder pre-loaded with the console's routes and actions
    ///
    /// Lets callers move the default or login route without restating the
    /// table.
    #[must_use]
    pub fn default_table() -> RouteCatalogBuilder {
        let mut builder = Self::builder()
            .route(DEFAULT_ROUTE, "Dashboard", RoleSet::EVERYONE)
            .route("/feedback", "Feedback", RoleSet::EVERYONE)
            .route("/analytics", "Analytics", RoleSet::STAFF)
            .route("/upload", "Upload", RoleSet::STAFF)
            .route("/clustering", "Clustering", RoleSet::STAFF)
            .route("/reports", "Reports", RoleSet::STAFF)
            .route("/integrations", "Integrations", RoleSet::STAFF)
            .route("/admin", "Admin", RoleSet::ADMIN)
            .route("/settings", "Settings", RoleSet::EVERYONE);
        for rule in default_action_rules() {
            builder = builder.action(rule.target, rule.allowed_roles);
        }
        builder
    }

    /// Rule for a route or action
    #[must_use]
    pub fn rule_for(&self, target: &str) -> Option<&AccessRule> {
        self.rules.get(normalize_route(target))
    }

    /// Navigation entries visible to `principal`
    ///
    /// Entries the principal's effective role cannot reach are omitted.
    #[must_use]
    pub fn menu_for(&self, principal: Option<&Principal>) -> Vec<&NavEntry> {
        let Some(principal) = authenticated(principal) else {
            return Vec::new();
        };
        self.menu
            .iter()
            .filter(|entry| {
                self.rules
                    .get(&entry.route)
                    .is_some_and(|rule| can_access(Some(principal), rule))
            })
            .collect()
    }

    /// Every navigation entry, in menu order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[NavEntry] {
        &self.menu
    }

    /// Every rule, in registration order
    pub fn rules(&self) -> impl Iterator<Item = &AccessRule> {
        self.rules.values()
    }

    /// Landing route for authenticated users
    #[inline]
    #[must_use]
    pub fn default_route(&self) -> &str {
        &self.default_route
    }

    /// Sign-in route
    #[inline]
    #[must_use]
    pub fn login_route(&self) -> &str {
        &self.login_route
    }
}

impl Default for RouteCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl AccessPolicy for RouteCatalog {
    fn permits(&self, principal: Option<&Principal>, target: &str) -> bool {
        let Some(principal) = authenticated(principal) else {
            return false;
        };
        let target = normalize_route(target);
        match self.rules.get(target) {
            Some(rule) => can_access(Some(principal), rule),
            None => target == self.default_route,
        }
    }
}

/// Builder for [`RouteCatalog`]
#[derive(Debug)]
pub struct RouteCatalogBuilder {
    rules: IndexMap<String, AccessRule>,
    menu: Vec<NavEntry>,
    default_route: String,
    login_route: String,
    duplicate: Option<String>,
}

impl RouteCatalogBuilder {
    /// Create empty builder with the standard default and login routes
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
            menu: Vec::new(),
            default_route: DEFAULT_ROUTE.to_string(),
            login_route: LOGIN_ROUTE.to_string(),
            duplicate: None,
        }
    }

    /// Add a navigable route
    #[must_use]
    pub fn route(mut self, route: &str, label: impl Into<String>, roles: RoleSet) -> Self {
        let route = normalize_route(route).to_string();
        if self.insert_rule(AccessRule::new(route.clone(), roles)) {
            self.menu.push(NavEntry {
                route,
                label: label.into(),
            });
        }
        self
    }

    /// Add a gated action (not shown in the menu)
    #[must_use]
    pub fn action(mut self, name: impl Into<String>, roles: RoleSet) -> Self {
        self.insert_rule(AccessRule::new(name, roles));
        self
    }

    /// Set the authenticated landing route
    #[must_use]
    pub fn default_route(mut self, route: &str) -> Self {
        self.default_route = normalize_route(route).to_string();
        self
    }

    /// Set the sign-in route
    #[must_use]
    pub fn login_route(mut self, route: &str) -> Self {
        self.login_route = normalize_route(route).to_string();
        self
    }

    /// Finish the catalog
    ///
    /// # Errors
    /// Returns [`AccessError::DuplicateRule`] if a target was registered twice,
    /// or [`AccessError::GatedDefaultRoute`] if the default route has a rule
    /// that does not admit every role.
    pub fn build(self) -> AccessResult<RouteCatalog> {
        if let Some(target) = self.duplicate {
            return Err(AccessError::DuplicateRule(target));
        }
        if self
            .rules
            .get(&self.default_route)
            .is_some_and(|rule| !rule.allowed_roles.contains(RoleSet::EVERYONE))
        {
            return Err(AccessError::GatedDefaultRoute(self.default_route));
        }
        tracing::debug!(
            rules = self.rules.len(),
            menu = self.menu.len(),
            "Built route catalog"
        );
        Ok(RouteCatalog {
            rules: self.rules,
            menu: self.menu,
            default_route: self.default_route,
            login_route: self.login_route,
        })
    }

    fn insert_rule(&mut self, rule: AccessRule) -> bool {
        if self.rules.contains_key(&rule.target) {
            self.duplicate.get_or_insert_with(|| rule.target.clone());
            return false;
        }
        self.rules.insert(rule.target.clone(), rule);
        true
    }
}

impl Default for RouteCatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip query, fragment and trailing slash from a typed route
///
/// # Examples
/// ```
/// # use fba_access::catalog::normalize_route;
/// assert_eq!(normalize_route("/admin/?tab=users"), "/admin");
/// assert_eq!(normalize_route("/"), "/");
/// ```
#[must_use]
pub fn normalize_route(route: &str) -> &str {
    let end = route.find(['?', '#']).unwrap_or(route.len());
    let path = route[..end].trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}
