//! Testing utilities for FBA workspace
//!
//! Shared principals, backend payloads, integration stores, and a stub HTTP
//! backend.

#![allow(missing_docs)]

pub mod stub;

pub use stub::{RecordedRequest, StubResponse, StubServer, API_PREFIX};

use fba_access::{Principal, Role};
use fba_integrations::{IntegrationCatalog, IntegrationStore, MemoryStorage, DEFAULT_STORAGE_KEY};
use serde_json::{json, Value};

pub fn viewer() -> Principal {
    Principal::new("vic", "vic@example.com", Role::Viewer)
}

pub fn analyst() -> Principal {
    Principal::new("ana", "ana@example.com", Role::Analyst)
}

pub fn admin() -> Principal {
    Principal::new("ada", "ada@example.com", Role::Admin)
}

/// Registered asking for admin, not yet approved
pub fn pending_admin() -> Principal {
    Principal::new("dana", "dana@example.com", Role::Viewer).with_pending_request(Role::Admin)
}

pub fn principal_with_role(role: Role) -> Principal {
    match role {
        Role::Viewer => viewer(),
        Role::Analyst => analyst(),
        Role::Admin => admin(),
    }
}

/// Backend user record for `principal`
pub fn user_json(principal: &Principal) -> Value {
    let mut value = serde_json::to_value(principal).expect("principal serializes");
    value["created_at"] = json!("2024-01-15T10:00:00");
    value
}

/// Backend token pair
pub fn token_json(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "refresh_token": format!("refresh-{access_token}"),
        "token_type": "bearer",
    })
}

pub fn memory_store() -> IntegrationStore<MemoryStorage> {
    IntegrationStore::open(IntegrationCatalog::builtin(), MemoryStorage::new())
}

/// Store opened over storage already holding `payload`
pub fn memory_store_with(payload: &str) -> (IntegrationStore<MemoryStorage>, MemoryStorage) {
    let storage = MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, payload);
    let store = IntegrationStore::open(IntegrationCatalog::builtin(), storage.clone());
    (store, storage)
}
