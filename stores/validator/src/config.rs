//! Validator configuration.

use std::time::Duration;

/// Rule parameters and debounce window
///
/// # Default Values
///
/// - `min_password_length`: 6
/// - `debounce`: 300 ms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Shortest accepted password, in characters
    pub min_password_length: usize,
    /// Quiet period after the last edit before a field is evaluated
    pub debounce: Duration,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorConfig {
    /// Default rules
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_password_length: 6,
            debounce: Duration::from_millis(300),
        }
    }

    /// Set the shortest accepted password
    #[must_use]
    pub const fn with_min_password_length(mut self, min_password_length: usize) -> Self {
        self.min_password_length = min_password_length;
        self
    }

    /// Set the debounce window
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}
