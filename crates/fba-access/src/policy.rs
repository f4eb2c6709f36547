//! Access policy evaluation
//!
//! Pure functions over a principal and a rule. Nothing here performs I/O or
//! touches the session; callers decide what to do with a denial.
//!
//! ```text
//! Principal ──effective_role──▶ Role ──∈ AccessRule.allowed_roles──▶ allow / deny
//!     │
//!     └──is_super_admin──▶ UserScope (inside admin views only)
//! ```

use crate::principal::Principal;
use crate::role::Role;
use crate::rule::AccessRule;
use uuid::Uuid;

/// Role used for authorization decisions
///
/// The assigned role, except that a principal with a pending, unapproved
/// role request counts as [`Role::Viewer`] until an administrator resolves
/// it. `requested_role` never grants anything.
#[inline]
#[must_use]
pub fn effective_role(principal: &Principal) -> Role {
    if principal.has_pending_request() {
        Role::Viewer
    } else {
        principal.role
    }
}

/// Check whether `principal` satisfies `rule`
///
/// `None` means unauthenticated and is always denied.
#[inline]
#[must_use]
pub fn can_access(principal: Option<&Principal>, rule: &AccessRule) -> bool {
    principal.is_some_and(|p| rule.admits(effective_role(p)))
}

/// Filter out principals that must be treated as signed out
///
/// Disabled accounts hold no session rights.
#[inline]
#[must_use]
pub fn authenticated(principal: Option<&Principal>) -> Option<&Principal> {
    principal.filter(|p| p.is_active)
}

/// Which users an admin view may list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserScope {
    /// Users of one tenant
    Tenant(Uuid),
    /// Users without a tenant
    Unassigned,
    /// Every tenant (super admin)
    AllTenants,
}

impl UserScope {
    /// Check if a user in `tenant_id` is visible in this scope
    #[inline]
    #[must_use]
    pub fn includes(&self, tenant_id: Option<Uuid>) -> bool {
        match self {
            UserScope::AllTenants => true,
            UserScope::Tenant(id) => tenant_id == Some(*id),
            UserScope::Unassigned => tenant_id.is_none(),
        }
    }
}

/// Scope of user administration for `principal`
///
/// `None` for anyone whose effective role is not admin. The super admin
/// capability only widens scope; it never substitutes for the admin role.
#[must_use]
pub fn user_scope(principal: &Principal) -> Option<UserScope> {
    if !effective_role(principal).is_admin() {
        return None;
    }
    if principal.is_super_admin {
        return Some(UserScope::AllTenants);
    }
    Some(
        principal
            .tenant_id
            .map_or(UserScope::Unassigned, UserScope::Tenant),
    )
}

/// Policy lookup by route or action name
///
/// Implemented by [`crate::RouteCatalog`]; views depend on this trait so a
/// restricted policy can be substituted in tests.
pub trait AccessPolicy: Send + Sync {
    /// Check if `principal` may reach `target`
    fn permits(&self, principal: Option<&Principal>, target: &str) -> bool;
}
