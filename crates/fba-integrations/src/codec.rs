//! Persisted settings format
//!
//! Current documents carry a schema version:
//!
//! ```json
//! {"version": 1, "integrations": [{"id": "slack", "enabled": true, "status": "connected", "config": {}}]}
//! ```
//!
//! The unversioned bare array written by earlier releases is still read.

use crate::error::CodecError;
use crate::state::{IntegrationState, PersistedIntegration};
use serde::{Deserialize, Serialize};

/// Schema version written by [`encode`]
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    integrations: Vec<&'a IntegrationState>,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    #[serde(default)]
    integrations: Vec<PersistedIntegration>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Versioned(Envelope),
    Legacy(Vec<PersistedIntegration>),
}

/// Serialize states into a versioned document
///
/// # Errors
/// Returns error if serialization fails.
pub fn encode<'a>(
    states: impl IntoIterator<Item = &'a IntegrationState>,
) -> Result<String, CodecError> {
    let envelope = EnvelopeRef {
        version: SCHEMA_VERSION,
        integrations: states.into_iter().collect(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse a stored document, versioned or legacy
///
/// # Errors
/// Returns [`CodecError::Corrupt`] for unparseable payloads and
/// [`CodecError::UnsupportedVersion`] for documents from a newer schema.
pub fn decode(payload: &str) -> Result<Vec<PersistedIntegration>, CodecError> {
    match serde_json::from_str::<Document>(payload)? {
        Document::Versioned(envelope) if envelope.version > SCHEMA_VERSION => {
            Err(CodecError::UnsupportedVersion {
                found: envelope.version,
                supported: SCHEMA_VERSION,
            })
        }
        Document::Versioned(envelope) => Ok(envelope.integrations),
        Document::Legacy(records) => {
            tracing::debug!(records = records.len(), "Read legacy unversioned settings");
            Ok(records)
        }
    }
}
