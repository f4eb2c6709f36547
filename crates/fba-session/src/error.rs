//! Error types for backend calls
//!
//! The backend reports failures as a non-2xx status with a JSON body whose
//! `detail` field is either a message or a list of validation errors.

use serde_json::Value;

/// Backend call errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request never produced a response
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status
    #[error("backend error ({status}): {detail}")]
    Backend {
        /// HTTP status code
        status: u16,
        /// `detail` from the error body, or a generic message
        detail: String,
    },

    /// Response body did not match the expected shape
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Call requires a bearer token and none is held
    #[error("not authenticated")]
    Unauthenticated,
}

impl ApiError {
    /// Build a backend error from a status and raw response body
    ///
    /// Falls back to the status' canonical reason when the body carries no
    /// usable `detail`.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = extract_detail(body).unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("request failed")
                .to_string()
        });
        Self::Backend { status, detail }
    }

    /// HTTP status, if the backend answered
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if the session is missing or no longer accepted
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthenticated) || self.status() == Some(401)
    }

    /// Text suitable for a transient notification
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        Value::Null | Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

/// Result type alias for backend calls
pub type ApiResult<T> = Result<T, ApiError>;
