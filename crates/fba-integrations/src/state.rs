//! Integration state and the persisted-over-default merge

use crate::descriptor::{IntegrationDescriptor, IntegrationStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form connection settings
pub type IntegrationConfig = BTreeMap<String, String>;

/// A user's configuration of one integration type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationState {
    /// Descriptor id
    pub id: String,
    /// Whether notifications flow through this integration
    pub enabled: bool,
    /// Connection status
    pub status: IntegrationStatus,
    /// Connection settings
    #[serde(default)]
    pub config: IntegrationConfig,
}

impl IntegrationState {
    /// State materialized from descriptor defaults
    #[must_use]
    pub fn from_descriptor(descriptor: &IntegrationDescriptor) -> Self {
        Self {
            id: descriptor.id.to_string(),
            enabled: descriptor.default_enabled,
            status: descriptor.default_status,
            config: IntegrationConfig::new(),
        }
    }

    /// Check if settings have been saved
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status == IntegrationStatus::Connected
    }
}

/// Record as found in storage
///
/// Every behavioral field is optional so partially written records still
/// contribute what they have.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedIntegration {
    /// Descriptor id
    pub id: String,
    /// Stored enabled flag
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Stored status
    #[serde(default)]
    pub status: Option<IntegrationStatus>,
    /// Stored settings
    #[serde(default)]
    pub config: Option<IntegrationConfig>,
}

impl From<&IntegrationState> for PersistedIntegration {
    fn from(state: &IntegrationState) -> Self {
        Self {
            id: state.id.clone(),
            enabled: Some(state.enabled),
            status: Some(state.status),
            config: Some(state.config.clone()),
        }
    }
}

/// Merge a stored record over descriptor defaults
///
/// Stored values win for `enabled`, `status` and `config`; anything the
/// record lacks comes from the descriptor. Presentation fields are not part
/// of the state at all and are read from the descriptor by [`IntegrationView`].
#[must_use]
pub fn merge(
    descriptor: &IntegrationDescriptor,
    persisted: Option<&PersistedIntegration>,
) -> IntegrationState {
    let defaults = IntegrationState::from_descriptor(descriptor);
    let Some(record) = persisted else {
        return defaults;
    };
    debug_assert_eq!(record.id, descriptor.id);

    IntegrationState {
        id: defaults.id,
        enabled: record.enabled.unwrap_or(defaults.enabled),
        status: record.status.unwrap_or(defaults.status),
        config: record.config.clone().unwrap_or(defaults.config),
    }
}

/// Descriptor and state together, as rendered on an integration card
#[derive(Debug, Clone, Copy)]
pub struct IntegrationView<'a> {
    /// Static presentation
    pub descriptor: &'a IntegrationDescriptor,
    /// Current settings
    pub state: &'a IntegrationState,
}

impl IntegrationView<'_> {
    /// Display name from the descriptor
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        self.descriptor.display_name
    }

    /// Form fields the descriptor asks for that have no saved value
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.descriptor
            .config_fields
            .iter()
            .copied()
            .filter(|f| {
                self.state
                    .config
                    .get(*f)
                    .map_or(true, |v| v.trim().is_empty())
            })
            .collect()
    }
}
