//! Core domain types for the dashboard poller.

use chrono::{DateTime, Utc};
use reactive_stores_macros::Action;
use serde::{Deserialize, Serialize};

/// Stats snapshot, replaced wholesale on every successful fetch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Registered users
    pub total_users: u64,
    /// Users considered active
    pub active_users: u64,
    /// Sales count
    pub total_sales: u64,
    /// Revenue so far today
    pub today_revenue: u64,
    /// When these figures were produced
    pub last_updated: DateTime<Utc>,
}

/// Which trigger started a fetch
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchSource {
    /// The recurring poll timer
    Timer,
    /// A manual refresh
    Manual,
}

/// Dashboard snapshot
///
/// `stats` and `error` may both be set: a failed fetch leaves the last
/// good stats in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    /// Latest stats, if any fetch has succeeded
    pub stats: Option<DashboardStats>,
    /// True exactly while a fetch is outstanding
    pub is_loading: bool,
    /// Timer ticks skip fetching while paused
    pub is_paused: bool,
    /// Message from the latest failed fetch
    pub error: Option<String>,
    /// Completion time of the latest successful fetch
    pub last_refresh: Option<DateTime<Utc>>,
    /// Whether the poll timer is running
    #[serde(skip)]
    pub(crate) polling: bool,
    #[serde(skip)]
    pub(crate) timer_fetch: bool,
    #[serde(skip)]
    pub(crate) manual_fetch: bool,
}

impl DashboardState {
    /// Creates the initial snapshot: no stats, not loading, not paused
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the poll timer is running (someone is subscribed)
    #[must_use]
    pub const fn is_polling(&self) -> bool {
        self.polling
    }

    pub(crate) fn set_fetching(&mut self, source: FetchSource, fetching: bool) {
        match source {
            FetchSource::Timer => self.timer_fetch = fetching,
            FetchSource::Manual => self.manual_fetch = fetching,
        }
        self.is_loading = self.timer_fetch || self.manual_fetch;
    }
}

/// Dashboard actions
#[derive(Action, Clone, Debug, PartialEq)]
pub enum DashboardAction {
    /// Start the poll timer (first subscriber arrived)
    #[command]
    Connect,

    /// Stop the poll timer and abandon its fetch (last subscriber left)
    #[command]
    Disconnect,

    /// Skip fetching on timer ticks
    #[command]
    Pause,

    /// Fetch on timer ticks again
    #[command]
    Resume,

    /// Flip between paused and running
    #[command]
    TogglePause,

    /// Fetch now, independently of the timer
    #[command]
    Refresh,

    /// The poll timer fired
    #[event]
    Tick,

    /// A fetch finished, after retries
    #[event]
    FetchCompleted {
        /// Trigger that started it
        source: FetchSource,
        /// Synthesized stats, or the final error message
        result: Result<DashboardStats, String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_tracks_both_sources() {
        let mut state = DashboardState::new();

        state.set_fetching(FetchSource::Timer, true);
        state.set_fetching(FetchSource::Manual, true);
        state.set_fetching(FetchSource::Timer, false);
        assert!(state.is_loading);

        state.set_fetching(FetchSource::Manual, false);
        assert!(!state.is_loading);
    }

    #[test]
    fn action_classification() {
        assert!(DashboardAction::Pause.is_command());
        assert!(DashboardAction::Tick.is_event());
        assert_eq!(DashboardAction::TogglePause.name(), "TogglePause");
    }
}
