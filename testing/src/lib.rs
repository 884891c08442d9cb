//! # Reactive Stores Testing
//!
//! Testing utilities and helpers for reactive widget stores.
//!
//! This crate provides:
//! - Deterministic clocks (`FixedClock`, `ManualClock`)
//! - `ScriptedFetch`, a programmable fetch collaborator
//! - `ReducerTest`, a Given-When-Then harness for pure reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use reactive_stores_testing::{ScriptedFetch, test_clock};
//!
//! #[tokio::test(start_paused = true)]
//! async fn loads_first_page() {
//!     let fetch = ScriptedFetch::new();
//!     fetch.respond(PAGE_1_URL, posts(10));
//!
//!     let feed = FeedPaginator::new(FeedConfig::default(), fetch.clone());
//!     feed.load_more().await;
//!
//!     assert_eq!(fetch.calls(PAGE_1_URL), 1);
//! }
//! ```

mod scripted_fetch;

pub use reducer_test::{assertions, ReducerTest};
pub use scripted_fetch::ScriptedFetch;

use chrono::{DateTime, Utc};
use reactive_stores_core::environment::Clock;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use reactive_stores_testing::mocks::FixedClock;
    /// use reactive_stores_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when told to
    ///
    /// Clones share the same time, so a test can keep one handle and
    /// advance it while the store's environment holds another.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Start the clock at `time`
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward by `by`
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }

        /// Jump to an absolute time
        pub fn set(&self, to: DateTime<Utc>) {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner) = to;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// The instant every test clock starts at: 2025-01-01 00:00:00 UTC
    #[must_use]
    pub fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default()
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(epoch())
    }

    /// Create a manual clock starting at 2025-01-01 00:00:00 UTC
    #[must_use]
    pub fn manual_clock() -> ManualClock {
        ManualClock::new(epoch())
    }
}

// Re-export commonly used items
pub use mocks::{epoch, manual_clock, test_clock, FixedClock, ManualClock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(time1.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_manual_clock_advances_all_clones() {
        let clock = manual_clock();
        let shared = clock.clone();

        clock.advance(chrono::Duration::seconds(5));
        assert_eq!(shared.now(), epoch() + chrono::Duration::seconds(5));

        shared.set(epoch());
        assert_eq!(clock.now(), epoch());
    }
}
