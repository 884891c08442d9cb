//! Poller configuration.

use reactive_stores_runtime::retry::RetryPolicy;
use std::time::Duration;

/// Collection the dashboard polls by default
pub const DEFAULT_USERS_URL: &str = "https://jsonplaceholder.typicode.com/users";

/// How and what the dashboard polls
///
/// # Default Values
///
/// - `url`: [`DEFAULT_USERS_URL`]
/// - `interval`: 5 seconds
/// - `retry`: 3 retries, 1 second apart
#[derive(Debug, Clone, PartialEq)]
pub struct PollerConfig {
    /// Collection to fetch
    pub url: String,
    /// Time between timer ticks
    pub interval: Duration,
    /// Retries applied to every fetch
    pub retry: RetryPolicy,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_USERS_URL)
    }
}

impl PollerConfig {
    /// Poll `url` with the default interval and retry policy
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            interval: Duration::from_secs(5),
            retry: RetryPolicy::default(),
        }
    }

    /// Set the time between timer ticks
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
