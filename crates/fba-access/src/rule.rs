//! Access rules for routes and actions

use crate::role::{Role, RoleSet};

/// Named actions gated inside views
pub mod actions {
    /// List users in the admin view
    pub const ADMIN_USERS_LIST: &str = "admin.users.list";
    /// Approve or reject role requests
    pub const ADMIN_ROLES_APPROVE: &str = "admin.roles.approve";
    /// Activate or deactivate users
    pub const ADMIN_USERS_STATUS: &str = "admin.users.status";
    /// Enable or disable an integration
    pub const INTEGRATIONS_TOGGLE: &str = "integrations.toggle";
    /// Save integration settings
    pub const INTEGRATIONS_CONFIGURE: &str = "integrations.configure";
    /// Upload feedback files
    pub const FEEDBACK_UPLOAD: &str = "feedback.upload";
}

/// Which roles may reach a route or perform an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    /// Route path or action name
    pub target: String,
    /// Roles admitted
    pub allowed_roles: RoleSet,
}

impl AccessRule {
    /// Create new rule
    #[inline]
    #[must_use]
    pub fn new(target: impl Into<String>, allowed_roles: RoleSet) -> Self {
        Self {
            target: target.into(),
            allowed_roles,
        }
    }

    /// Rule admitting nobody
    #[inline]
    #[must_use]
    pub fn deny_all(target: impl Into<String>) -> Self {
        Self::new(target, RoleSet::empty())
    }

    /// Check if `role` is admitted
    #[inline]
    #[must_use]
    pub fn admits(&self, role: Role) -> bool {
        self.allowed_roles.admits(role)
    }
}

/// Built-in action rules
#[must_use]
pub fn default_action_rules() -> Vec<AccessRule> {
    vec![
        AccessRule::new(actions::ADMIN_USERS_LIST, RoleSet::ADMIN),
        AccessRule::new(actions::ADMIN_ROLES_APPROVE, RoleSet::ADMIN),
        AccessRule::new(actions::ADMIN_USERS_STATUS, RoleSet::ADMIN),
        AccessRule::new(actions::INTEGRATIONS_TOGGLE, RoleSet::STAFF),
        AccessRule::new(actions::INTEGRATIONS_CONFIGURE, RoleSet::STAFF),
        AccessRule::new(actions::FEEDBACK_UPLOAD, RoleSet::STAFF),
    ]
}
