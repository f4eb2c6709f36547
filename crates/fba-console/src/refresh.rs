//! Periodic view refresh
//!
//! [`AutoRefresh`] re-runs a fetch on a fixed period while its handle is
//! alive. A tick that arrives while a fetch holds the [`RefreshGate`] is
//! skipped, so at most one refresh per view is ever in flight. Dropping the
//! handle aborts the task, including a fetch in progress.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default refresh period of data views
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Single-flight guard shared by automatic and manual refreshes
#[derive(Debug, Clone, Default)]
pub struct RefreshGate {
    busy: Arc<AtomicBool>,
}

impl RefreshGate {
    /// Create open gate
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate, `None` if a refresh is already running
    #[must_use]
    pub fn try_enter(&self) -> Option<RefreshPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Check if a refresh holds the gate
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the duration of one refresh; releases the gate on drop
#[derive(Debug)]
pub struct RefreshPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for RefreshPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Handle of a periodic refresh task
#[derive(Debug)]
pub struct AutoRefresh {
    handle: JoinHandle<()>,
    gate: RefreshGate,
    interval: Duration,
}

impl AutoRefresh {
    /// Spawn a task calling `refresh` every `interval`
    ///
    /// The first call happens one period after spawning; views load once on
    /// their own when mounted.
    ///
    /// # Panics
    /// Panics if `interval` is zero or no tokio runtime is running.
    pub fn spawn<F, Fut>(interval: Duration, refresh: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_gated(interval, RefreshGate::new(), refresh)
    }

    /// Like [`spawn`](Self::spawn), sharing an existing gate
    ///
    /// # Panics
    /// Panics if `interval` is zero or no tokio runtime is running.
    pub fn spawn_gated<F, Fut>(interval: Duration, gate: RefreshGate, mut refresh: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task_gate = gate.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(_permit) = task_gate.try_enter() else {
                    tracing::debug!("Skipping refresh, previous one still running");
                    continue;
                };
                refresh().await;
            }
        });

        tracing::debug!(interval_secs = interval.as_secs(), "Auto refresh started");
        Self {
            handle,
            gate,
            interval,
        }
    }

    /// Gate shared with manual refreshes
    #[inline]
    #[must_use]
    pub fn gate(&self) -> &RefreshGate {
        &self.gate
    }

    /// Refresh period
    #[inline]
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check if the task has stopped
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop refreshing
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
