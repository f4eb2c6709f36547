//! Integration settings store
//!
//! Holds one [`IntegrationState`] per catalog descriptor and writes the whole
//! set back to storage after every mutation.
//!
//! # Lifecycle
//!
//! ```text
//! storage ──read──▶ decode ──merge per descriptor──▶ states ──toggle/configure──▶ persist ──▶ storage
//!            │ corrupt / unreadable                          │ unknown id
//!            └──────────▶ defaults (logged)                  └──▶ NotFound
//! ```
//!
//! Mutation and persistence are not transactional: a failed write is logged
//! and the in-memory state stays ahead of storage until the next successful
//! write.

use crate::codec;
use crate::descriptor::{IntegrationCatalog, IntegrationStatus};
use crate::error::{IntegrationError, IntegrationResult};
use crate::state::{
    merge, IntegrationConfig, IntegrationState, IntegrationView, PersistedIntegration,
};
use crate::storage::KeyValueStorage;
use crate::tester::{ConnectionTestResult, ConnectionTester};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Storage key of the persisted settings
pub const DEFAULT_STORAGE_KEY: &str = "integrations_config";

/// States keyed by integration id, in catalog order
pub type IntegrationStates = IndexMap<String, IntegrationState>;

/// Build states from a stored payload
///
/// Never fails: unknown ids are dropped, missing ids get defaults, and an
/// unreadable payload yields defaults for every descriptor.
#[must_use]
pub fn load_states(catalog: &IntegrationCatalog, payload: Option<&str>) -> IntegrationStates {
    let records = match payload.map(codec::decode) {
        None => Vec::new(),
        Some(Ok(records)) => records,
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Discarding unreadable integration settings");
            Vec::new()
        }
    };

    let mut by_id: HashMap<&str, &PersistedIntegration> = HashMap::with_capacity(records.len());
    for record in &records {
        if catalog.contains(&record.id) {
            by_id.insert(record.id.as_str(), record);
        } else {
            tracing::debug!(id = %record.id, "Dropping settings for unknown integration");
        }
    }

    catalog
        .iter()
        .map(|d| (d.id.to_string(), merge(d, by_id.get(d.id).copied())))
        .collect()
}

/// Locally persisted integration settings
#[derive(Debug)]
pub struct IntegrationStore<S> {
    catalog: IntegrationCatalog,
    storage: S,
    key: String,
    states: IntegrationStates,
}

impl<S: KeyValueStorage> IntegrationStore<S> {
    /// Create store holding catalog defaults, without reading storage
    #[must_use]
    pub fn new(catalog: IntegrationCatalog, storage: S) -> Self {
        let states = load_states(&catalog, None);
        Self {
            catalog,
            storage,
            key: DEFAULT_STORAGE_KEY.to_string(),
            states,
        }
    }

    /// Create store and load persisted settings
    #[must_use]
    pub fn open(catalog: IntegrationCatalog, storage: S) -> Self {
        let mut store = Self::new(catalog, storage);
        store.load();
        store
    }

    /// Use a different storage key
    #[inline]
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Reload states from storage
    ///
    /// Storage read failures and corrupt payloads are logged and fall back
    /// to defaults.
    pub fn load(&mut self) -> &IntegrationStates {
        let payload = match self.storage.read(&self.key) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read integration settings");
                None
            }
        };
        self.states = load_states(&self.catalog, payload.as_deref());
        tracing::debug!(key = %self.key, count = self.states.len(), "Loaded integration settings");
        &self.states
    }

    /// Flip the enabled flag
    ///
    /// Status and settings are untouched.
    ///
    /// # Errors
    /// Returns [`IntegrationError::NotFound`] for unknown ids.
    pub fn toggle(&mut self, id: &str) -> IntegrationResult<IntegrationState> {
        let state = self
            .states
            .get_mut(id)
            .ok_or_else(|| IntegrationError::NotFound(id.to_string()))?;
        state.enabled = !state.enabled;
        let updated = state.clone();

        tracing::info!(id, enabled = updated.enabled, "Toggled integration");
        self.persist_logged();
        Ok(updated)
    }

    /// Save settings, marking the integration connected and enabled
    ///
    /// The only way an integration becomes connected.
    ///
    /// # Errors
    /// Returns [`IntegrationError::NotFound`] for unknown ids.
    pub fn configure(
        &mut self,
        id: &str,
        values: IntegrationConfig,
    ) -> IntegrationResult<IntegrationState> {
        let state = self
            .states
            .get_mut(id)
            .ok_or_else(|| IntegrationError::NotFound(id.to_string()))?;
        state.config = values;
        state.status = IntegrationStatus::Connected;
        state.enabled = true;
        let updated = state.clone();

        tracing::info!(id, keys = updated.config.len(), "Configured integration");
        self.persist_logged();
        Ok(updated)
    }

    /// Run a connection test
    ///
    /// The result is informational; status is not changed.
    ///
    /// # Errors
    /// Returns [`IntegrationError::NotFound`] for unknown ids.
    pub async fn test_connection<T>(
        &self,
        id: &str,
        tester: &T,
    ) -> IntegrationResult<ConnectionTestResult>
    where
        T: ConnectionTester + ?Sized,
    {
        let state = self
            .get(id)
            .ok_or_else(|| IntegrationError::NotFound(id.to_string()))?;
        Ok(tester.test(state).await)
    }

    /// Write current states to storage
    ///
    /// # Errors
    /// Returns error if encoding or the storage write fails.
    pub fn persist(&self) -> IntegrationResult<()> {
        let payload = codec::encode(self.states.values())?;
        self.storage.write(&self.key, &payload)?;
        Ok(())
    }

    fn persist_logged(&self) {
        if let Err(e) = self.persist() {
            tracing::error!(key = %self.key, error = %e, "Failed to persist integration settings");
        }
    }

    /// Current states
    #[inline]
    #[must_use]
    pub fn states(&self) -> &IntegrationStates {
        &self.states
    }

    /// State for one integration
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&IntegrationState> {
        self.states.get(id)
    }

    /// Descriptor and state pairs in catalog order
    #[must_use]
    pub fn views(&self) -> Vec<IntegrationView<'_>> {
        self.catalog
            .iter()
            .filter_map(|descriptor| {
                self.states
                    .get(descriptor.id)
                    .map(|state| IntegrationView { descriptor, state })
            })
            .collect()
    }

    /// Ids of enabled integrations
    #[must_use]
    pub fn enabled_ids(&self) -> Vec<&str> {
        self.states
            .values()
            .filter(|s| s.enabled)
            .map(|s| s.id.as_str())
            .collect()
    }

    /// Catalog in use
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &IntegrationCatalog {
        &self.catalog
    }

    /// Storage key in use
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backing storage
    #[inline]
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }
}
