//! View state and transient notifications
//!
//! A data view owns a [`ViewState`] per backend resource. Loading always ends
//! with `loading == false`; a failure keeps whatever data was shown before
//! and raises a notification instead of failing the view.

use crate::error::ConsoleError;
use std::collections::VecDeque;
use std::future::Future;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Operation completed
    Success,
    /// Neutral information
    Info,
    /// Operation failed
    Error,
}

/// Transient message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Text
    pub message: String,
}

impl Notification {
    /// Success message
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    /// Informational message
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    /// Error message
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Bounded queue of pending notifications; oldest dropped first
#[derive(Debug, Clone)]
pub struct Notifications {
    queue: VecDeque<Notification>,
    capacity: usize,
}

impl Notifications {
    /// Default queue bound
    pub const DEFAULT_CAPACITY: usize = 16;

    /// Create queue holding at most `capacity` messages
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Queue a message
    pub fn push(&mut self, notification: Notification) {
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(notification);
    }

    /// Take every pending message
    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    /// Most recent message
    #[must_use]
    pub fn latest(&self) -> Option<&Notification> {
        self.queue.back()
    }

    /// Number of pending messages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

/// Loading, data and last error of one backend resource
#[derive(Debug, Clone)]
pub struct ViewState<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
}

impl<T> ViewState<T> {
    /// Empty, idle state
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }

    /// Mark a fetch as started
    pub fn begin(&mut self) {
        self.loading = true;
    }

    /// Record a fetch outcome; returns whether it succeeded
    ///
    /// Clears `loading` in both cases. A failure keeps the previous data and
    /// pushes an error notification.
    pub fn finish<E>(&mut self, result: Result<T, E>, notifications: &mut Notifications) -> bool
    where
        E: Into<ConsoleError>,
    {
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                true
            }
            Err(e) => {
                let message = e.into().user_message();
                tracing::warn!(error = %message, "View load failed");
                notifications.push(Notification::error(message.clone()));
                self.error = Some(message);
                false
            }
        }
    }

    /// Run a fetch through [`begin`](Self::begin) and [`finish`](Self::finish)
    ///
    /// Dropping the returned future mid-fetch clears `loading` and leaves data,
    /// error and notifications untouched.
    pub async fn load<F, E>(&mut self, fetch: F, notifications: &mut Notifications) -> bool
    where
        F: Future<Output = Result<T, E>>,
        E: Into<ConsoleError>,
    {
        let mut in_flight = InFlight::start(self);
        let result = fetch.await;
        in_flight.view.finish(result, notifications)
    }

    /// Last loaded data
    #[inline]
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Check if a fetch is in flight
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed fetch, cleared by a success
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds a view in the loading state until dropped
struct InFlight<'a, T> {
    view: &'a mut ViewState<T>,
}

impl<'a, T> InFlight<'a, T> {
    fn start(view: &'a mut ViewState<T>) -> Self {
        view.begin();
        Self { view }
    }
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        self.view.loading = false;
    }
}
