//! Authenticated principal
//!
//! Mirrors the user record returned by the backend (`/users/me`). A principal
//! is a value: role administration returns a new principal instead of
//! mutating the session's copy.

use crate::error::{AccessError, AccessResult};
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

fn default_true() -> bool {
    true
}

/// The authenticated user's identity and role record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User id
    pub id: Uuid,
    /// Login name
    pub username: String,
    /// Email address (login identifier)
    pub email: String,
    /// Display name
    #[serde(default)]
    pub full_name: Option<String>,
    /// Assigned role
    #[serde(default)]
    pub role: Role,
    /// Role the user asked for, awaiting approval
    #[serde(default)]
    pub requested_role: Option<Role>,
    /// Whether the assigned role has been approved
    #[serde(default = "default_true")]
    pub role_approved: bool,
    /// Whether the account is enabled
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Cross-tenant administration capability
    #[serde(default)]
    pub is_super_admin: bool,
    /// Owning tenant
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
}

impl Principal {
    /// Create an active, approved principal
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            full_name: None,
            role,
            requested_role: None,
            role_approved: true,
            is_active: true,
            is_super_admin: false,
            tenant_id: None,
        }
    }

    /// With display name
    #[inline]
    #[must_use]
    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    /// With tenant
    #[inline]
    #[must_use]
    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// With a pending, unapproved request for `role`
    #[inline]
    #[must_use]
    pub fn with_pending_request(mut self, role: Role) -> Self {
        self.requested_role = Some(role);
        self.role_approved = false;
        self
    }

    /// Grant the super admin capability
    #[inline]
    #[must_use]
    pub fn with_super_admin(mut self) -> Self {
        self.is_super_admin = true;
        self
    }

    /// Mark the account disabled
    #[inline]
    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Check if a role request awaits an administrator
    #[inline]
    #[must_use]
    pub fn has_pending_request(&self) -> bool {
        self.requested_role.is_some() && !self.role_approved
    }

    /// Role used for authorization decisions
    ///
    /// See [`crate::policy::effective_role`].
    #[inline]
    #[must_use]
    pub fn effective_role(&self) -> Role {
        crate::policy::effective_role(self)
    }

    /// Name shown in the console header
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }

    /// Apply an administrator's decision on the pending role request
    ///
    /// Approval assigns the requested role; rejection keeps the current one.
    /// Either way the request is cleared and the role counts as approved.
    ///
    /// # Errors
    /// Returns [`AccessError::NoPendingRequest`] if nothing is pending.
    pub fn resolve_role_request(&self, decision: RoleDecision) -> AccessResult<Principal> {
        let Some(requested) = self.requested_role.filter(|_| !self.role_approved) else {
            return Err(AccessError::no_pending_request(&self.username));
        };

        let mut next = self.clone();
        if decision == RoleDecision::Approve {
            next.role = requested;
        }
        next.requested_role = None;
        next.role_approved = true;

        tracing::info!(
            username = %self.username,
            requested = %requested,
            ?decision,
            role = %next.role,
            "Resolved role request"
        );
        Ok(next)
    }
}

/// Administrator decision on a role request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleDecision {
    /// Grant the requested role
    Approve,
    /// Keep the current role
    Reject,
}

impl RoleDecision {
    /// Decision from the backend's `approved` flag
    #[inline]
    #[must_use]
    pub fn from_approved(approved: bool) -> Self {
        if approved {
            RoleDecision::Approve
        } else {
            RoleDecision::Reject
        }
    }

    /// Backend `approved` flag for this decision
    #[inline]
    #[must_use]
    pub fn approved(&self) -> bool {
        matches!(self, RoleDecision::Approve)
    }
}

/// Role fields assigned at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAssignment {
    /// Role granted immediately
    pub role: Role,
    /// Role held for approval
    pub requested_role: Option<Role>,
    /// Whether `role` counts as approved
    pub role_approved: bool,
}

impl RoleAssignment {
    /// Map the role a registrant asked for onto what they actually get
    ///
    /// | Requested | Assigned | Pending |
    /// |-----------|----------|---------|
    /// | `admin` | viewer | admin |
    /// | `analyst` | analyst | - |
    /// | anything else | viewer | - |
    #[must_use]
    pub fn for_registration(requested: &str) -> Self {
        match Role::from_str(requested) {
            Ok(Role::Admin) => Self {
                role: Role::Viewer,
                requested_role: Some(Role::Admin),
                role_approved: false,
            },
            Ok(Role::Analyst) => Self {
                role: Role::Analyst,
                requested_role: None,
                role_approved: true,
            },
            _ => Self {
                role: Role::Viewer,
                requested_role: None,
                role_approved: true,
            },
        }
    }

    /// Apply to a principal
    #[must_use]
    pub fn apply(self, mut principal: Principal) -> Principal {
        principal.role = self.role;
        principal.requested_role = self.requested_role;
        principal.role_approved = self.role_approved;
        principal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_admin() -> Principal {
        Principal::new("dana", "dana@example.com", Role::Viewer).with_pending_request(Role::Admin)
    }

    #[test]
    fn principal_defaults() {
        let p = Principal::new("ana", "ana@example.com", Role::Analyst);
        assert!(p.is_active);
        assert!(p.role_approved);
        assert!(!p.has_pending_request());
        assert!(!p.is_super_admin);
    }

    #[test]
    fn principal_deserializes_backend_user() {
        let json = r#"{
            "id": "6f1f3c52-3a55-4d8e-9a4e-6a8b8f2f0c11",
            "email": "dana@example.com",
            "username": "dana",
            "full_name": null,
            "role": "viewer",
            "tenant_id": null,
            "is_active": true,
            "created_at": "2024-05-01T10:00:00.123456",
            "requested_role": "admin",
            "role_approved": false,
            "is_super_admin": false
        }"#;
        let p: Principal = serde_json::from_str(json).unwrap();
        assert_eq!(p.role, Role::Viewer);
        assert_eq!(p.requested_role, Some(Role::Admin));
        assert!(p.has_pending_request());
    }

    #[test]
    fn principal_missing_flags_default_to_approved_and_active() {
        let json = r#"{
            "id": "6f1f3c52-3a55-4d8e-9a4e-6a8b8f2f0c11",
            "email": "a@example.com",
            "username": "a",
            "role": "analyst"
        }"#;
        let p: Principal = serde_json::from_str(json).unwrap();
        assert!(p.role_approved);
        assert!(p.is_active);
    }

    #[test]
    fn approve_assigns_requested_role() {
        let approved = pending_admin()
            .resolve_role_request(RoleDecision::Approve)
            .unwrap();
        assert_eq!(approved.role, Role::Admin);
        assert_eq!(approved.requested_role, None);
        assert!(approved.role_approved);
    }

    #[test]
    fn reject_keeps_current_role() {
        let rejected = pending_admin()
            .resolve_role_request(RoleDecision::Reject)
            .unwrap();
        assert_eq!(rejected.role, Role::Viewer);
        assert_eq!(rejected.requested_role, None);
        assert!(rejected.role_approved);
    }

    #[test]
    fn resolve_without_pending_request_fails() {
        let p = Principal::new("ana", "ana@example.com", Role::Analyst);
        assert!(matches!(
            p.resolve_role_request(RoleDecision::Approve),
            Err(AccessError::NoPendingRequest { .. })
        ));
    }

    #[test]
    fn registration_mapping() {
        let admin = RoleAssignment::for_registration("Admin");
        assert_eq!(admin.role, Role::Viewer);
        assert_eq!(admin.requested_role, Some(Role::Admin));
        assert!(!admin.role_approved);

        let analyst = RoleAssignment::for_registration("analyst");
        assert_eq!(analyst.role, Role::Analyst);
        assert!(analyst.role_approved);

        let other = RoleAssignment::for_registration("superuser");
        assert_eq!(other.role, Role::Viewer);
        assert_eq!(other.requested_role, None);
    }

    #[test]
    fn registration_apply() {
        let p = RoleAssignment::for_registration("admin")
            .apply(Principal::new("new", "new@example.com", Role::Analyst));
        assert!(p.has_pending_request());
        assert_eq!(p.role, Role::Viewer);
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let p = Principal::new("ana", "ana@example.com", Role::Viewer);
        assert_eq!(p.display_name(), "ana");
        let named = p.with_full_name("Ana Ruiz");
        assert_eq!(named.display_name(), "Ana Ruiz");
    }

    #[test]
    fn decision_from_flag() {
        assert_eq!(RoleDecision::from_approved(true), RoleDecision::Approve);
        assert!(!RoleDecision::Reject.approved());
    }
}
