//! Static integration catalog
//!
//! Descriptors are code-defined templates, one per supported integration
//! type. They are never persisted; presentation fields always come from here.

use serde::{Deserialize, Serialize};

/// Connection status of an integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationStatus {
    /// Settings saved and assumed reachable
    Connected,
    /// Not set up
    Disconnected,
    /// Reserved for a future connectivity check
    Error,
}

impl IntegrationStatus {
    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationStatus::Connected => "connected",
            IntegrationStatus::Disconnected => "disconnected",
            IntegrationStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for IntegrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Template for one integration type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationDescriptor {
    /// Stable key
    pub id: &'static str,
    /// Name shown on the card
    pub display_name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Icon name
    pub icon: &'static str,
    /// Setting keys the configuration form asks for
    pub config_fields: &'static [&'static str],
    /// Initial enabled flag
    pub default_enabled: bool,
    /// Initial status
    pub default_status: IntegrationStatus,
}

impl IntegrationDescriptor {
    /// Create descriptor with no form fields, disabled and disconnected
    #[must_use]
    pub const fn new(id: &'static str, display_name: &'static str) -> Self {
        Self {
            id,
            display_name,
            description: "",
            icon: "",
            config_fields: &[],
            default_enabled: false,
            default_status: IntegrationStatus::Disconnected,
        }
    }
}

/// Built-in integration types
pub const BUILTIN_DESCRIPTORS: &[IntegrationDescriptor] = &[
    IntegrationDescriptor {
        id: "slack",
        display_name: "Slack",
        description: "Post urgent feedback alerts to a Slack channel",
        icon: "slack",
        config_fields: &["webhookUrl", "channel"],
        default_enabled: false,
        default_status: IntegrationStatus::Disconnected,
    },
    IntegrationDescriptor {
        id: "email",
        display_name: "Email",
        description: "Send digests and alerts by email",
        icon: "email",
        config_fields: &["recipients", "smtpHost"],
        default_enabled: true,
        default_status: IntegrationStatus::Connected,
    },
    IntegrationDescriptor {
        id: "teams",
        display_name: "Microsoft Teams",
        description: "Post alerts to a Teams channel webhook",
        icon: "teams",
        config_fields: &["webhookUrl"],
        default_enabled: false,
        default_status: IntegrationStatus::Disconnected,
    },
    IntegrationDescriptor {
        id: "zendesk",
        display_name: "Zendesk",
        description: "Import support tickets as feedback",
        icon: "zendesk",
        config_fields: &["subdomain", "email", "apiToken"],
        default_enabled: false,
        default_status: IntegrationStatus::Disconnected,
    },
    IntegrationDescriptor {
        id: "intercom",
        display_name: "Intercom",
        description: "Import conversations as feedback",
        icon: "intercom",
        config_fields: &["accessToken", "appId"],
        default_enabled: false,
        default_status: IntegrationStatus::Disconnected,
    },
    IntegrationDescriptor {
        id: "freshdesk",
        display_name: "Freshdesk",
        description: "Import support tickets as feedback",
        icon: "freshdesk",
        config_fields: &["domain", "apiKey"],
        default_enabled: false,
        default_status: IntegrationStatus::Disconnected,
    },
    IntegrationDescriptor {
        id: "hubspot",
        display_name: "HubSpot",
        description: "Sync customer records with feedback",
        icon: "hubspot",
        config_fields: &["apiKey", "portalId"],
        default_enabled: false,
        default_status: IntegrationStatus::Disconnected,
    },
];

/// Ordered set of descriptors
#[derive(Debug, Clone)]
pub struct IntegrationCatalog {
    descriptors: Vec<IntegrationDescriptor>,
}

impl IntegrationCatalog {
    /// Catalog from descriptors; later duplicates of an id are ignored
    #[must_use]
    pub fn new(descriptors: impl IntoIterator<Item = IntegrationDescriptor>) -> Self {
        let mut unique: Vec<IntegrationDescriptor> = Vec::new();
        for d in descriptors {
            if unique.iter().any(|u| u.id == d.id) {
                tracing::warn!(id = d.id, "Ignoring duplicate integration descriptor");
                continue;
            }
            unique.push(d);
        }
        Self { descriptors: unique }
    }

    /// Built-in catalog
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(BUILTIN_DESCRIPTORS.iter().cloned())
    }

    /// Look up a descriptor
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&IntegrationDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    /// Check if id is known
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterate in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &IntegrationDescriptor> {
        self.descriptors.iter()
    }

    /// Ids in catalog order
    #[must_use]
    pub fn ids(&self) -> Vec<&'static str> {
        self.descriptors.iter().map(|d| d.id).collect()
    }

    /// Number of descriptors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for IntegrationCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
