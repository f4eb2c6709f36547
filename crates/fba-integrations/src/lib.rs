//! FBA Integrations - notification integration settings
//!
//! Manages the per-user enablement and configuration of outbound
//! notification channels:
//! - A static catalog of integration descriptors
//! - Persisted state merged over descriptor defaults
//! - Versioned, fail-soft storage of the whole settings set
//! - Pluggable connection testing
//!
//! # Example
//!
//! ```rust
//! use fba_integrations::prelude::*;
//!
//! let mut store = IntegrationStore::open(IntegrationCatalog::builtin(), MemoryStorage::new());
//! assert!(store.get("email").unwrap().enabled);
//!
//! let slack = store.toggle("slack").unwrap();
//! assert!(slack.enabled);
//! assert!(store.toggle("fax").unwrap_err().is_not_found());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod state;
pub mod storage;
pub mod store;
pub mod tester;

// Re-exports for convenience
pub use codec::SCHEMA_VERSION;
pub use descriptor::{IntegrationCatalog, IntegrationDescriptor, IntegrationStatus, BUILTIN_DESCRIPTORS};
pub use error::{CodecError, IntegrationError, IntegrationResult, StorageError};
pub use state::{merge, IntegrationConfig, IntegrationState, IntegrationView, PersistedIntegration};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{load_states, IntegrationStates, IntegrationStore, DEFAULT_STORAGE_KEY};
pub use tester::{ConnectionTestResult, ConnectionTester, SimulatedConnectionTester, DEFAULT_TEST_DELAY};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for integration settings
    pub use crate::{
        ConnectionTester, FileStorage, IntegrationCatalog, IntegrationConfig, IntegrationError,
        IntegrationState, IntegrationStatus, IntegrationStore, KeyValueStorage, MemoryStorage,
        SimulatedConnectionTester,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
