//! Connection testing
//!
//! The console's "test connection" button goes through [`ConnectionTester`].
//! The built-in [`SimulatedConnectionTester`] reports success after a fixed
//! delay; a real check can be plugged in without touching the store.

use crate::state::IntegrationState;
use async_trait::async_trait;
use std::time::Duration;

/// Default delay of the simulated check
pub const DEFAULT_TEST_DELAY: Duration = Duration::from_millis(1500);

/// Result of a connection test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTestResult {
    /// Integration id
    pub id: String,
    /// Whether the check passed
    pub success: bool,
    /// Message shown to the user
    pub message: String,
}

impl ConnectionTestResult {
    /// Passed check
    #[must_use]
    pub fn success(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: true,
            message: message.into(),
        }
    }

    /// Failed check
    #[must_use]
    pub fn failure(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: false,
            message: message.into(),
        }
    }
}

/// Checks whether an integration's settings reach the remote service
#[async_trait]
pub trait ConnectionTester: Send + Sync {
    /// Run the check
    async fn test(&self, state: &IntegrationState) -> ConnectionTestResult;
}

/// Always succeeds after a fixed delay
#[derive(Debug, Clone, Copy)]
pub struct SimulatedConnectionTester {
    delay: Duration,
}

impl SimulatedConnectionTester {
    /// Create tester with `delay`
    #[inline]
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Configured delay
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedConnectionTester {
    fn default() -> Self {
        Self::new(DEFAULT_TEST_DELAY)
    }
}

#[async_trait]
impl ConnectionTester for SimulatedConnectionTester {
    async fn test(&self, state: &IntegrationState) -> ConnectionTestResult {
        tokio::time::sleep(self.delay).await;
        ConnectionTestResult::success(&state.id, "Connection test successful")
    }
}
