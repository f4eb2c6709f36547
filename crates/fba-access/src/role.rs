//! Roles and role sets
//!
//! Three roles exist in the console. Rules carry a [`RoleSet`] rather than a
//! minimum role, so authorization is always set membership.

use crate::error::AccessError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Console role
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only access to dashboards and feedback
    Viewer,
    /// Analysis, uploads, reports and integrations
    Analyst,
    /// Everything, including user administration
    Admin,
}

impl Role {
    /// All roles, lowest first
    pub const ALL: [Role; 3] = [Role::Viewer, Role::Analyst, Role::Admin];

    /// Wire name of the role
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Analyst => "analyst",
            Role::Admin => "admin",
        }
    }

    /// Check if this is the admin role
    #[inline]
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Viewer
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viewer" => Ok(Role::Viewer),
            "analyst" => Ok(Role::Analyst),
            "admin" => Ok(Role::Admin),
            other => Err(AccessError::UnknownRole(other.to_string())),
        }
    }
}

bitflags! {
    /// Set of roles a rule admits.
    ///
    /// | Set | Roles |
    /// |-----|-------|
    /// | [`VIEWER`](Self::VIEWER) | viewer |
    /// | [`ANALYST`](Self::ANALYST) | analyst |
    /// | [`ADMIN`](Self::ADMIN) | admin |
    /// | [`STAFF`](Self::STAFF) | analyst, admin |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RoleSet: u8 {
        /// Viewer role
        const VIEWER  = 0b0000_0001;
        /// Analyst role
        const ANALYST = 0b0000_0010;
        /// Admin role
        const ADMIN   = 0b0000_0100;
        /// Analysts and admins
        const STAFF   = Self::ANALYST.bits() | Self::ADMIN.bits();
        /// Every authenticated role
        const EVERYONE = Self::VIEWER.bits() | Self::ANALYST.bits() | Self::ADMIN.bits();
    }
}

impl RoleSet {
    /// Check if the set admits `role`
    #[inline]
    #[must_use]
    pub fn admits(self, role: Role) -> bool {
        self.contains(RoleSet::from(role))
    }

    /// Roles in this set, lowest first
    #[must_use]
    pub fn roles(self) -> Vec<Role> {
        Role::ALL.into_iter().filter(|r| self.admits(*r)).collect()
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        match role {
            Role::Viewer => RoleSet::VIEWER,
            Role::Analyst => RoleSet::ANALYST,
            Role::Admin => RoleSet::ADMIN,
        }
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter()
            .fold(RoleSet::empty(), |set, role| set | RoleSet::from(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(Role::from_str("ADMIN").unwrap(), Role::Admin);
        assert_eq!(Role::from_str(" Analyst ").unwrap(), Role::Analyst);
        assert!(matches!(
            Role::from_str("owner"),
            Err(AccessError::UnknownRole(r)) if r == "owner"
        ));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Analyst).unwrap();
        assert_eq!(json, "\"analyst\"");
        let back: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(back, Role::Admin);
    }

    #[test]
    fn role_set_membership() {
        assert!(RoleSet::STAFF.admits(Role::Admin));
        assert!(RoleSet::STAFF.admits(Role::Analyst));
        assert!(!RoleSet::STAFF.admits(Role::Viewer));
        assert!(!RoleSet::empty().admits(Role::Admin));
    }

    #[test]
    fn role_set_from_iter() {
        let set: RoleSet = [Role::Viewer, Role::Admin].into_iter().collect();
        assert_eq!(set.roles(), vec![Role::Viewer, Role::Admin]);
        assert_eq!(RoleSet::EVERYONE.roles(), Role::ALL.to_vec());
    }

    #[test]
    fn role_ordering() {
        assert!(Role::Viewer < Role::Analyst);
        assert!(Role::Analyst < Role::Admin);
        assert_eq!(Role::default(), Role::Viewer);
    }
}
