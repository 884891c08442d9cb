//! Dashboard poller store.
//!
//! Stats are fetched on a recurring timer (first tick immediately) and on
//! demand. Timer fetches switch to the latest tick; a paused tick keeps the
//! last snapshot without fetching. Every fetch retries on failure, and a
//! failure that survives the retries becomes the `error` field while the
//! last good stats stay visible.
//!
//! # Example Usage
//!
//! ```no_run
//! use dashboard_poller::{DashboardPoller, PollerConfig};
//! use reactive_stores_core::environment::SystemClock;
//! # use reactive_stores_core::fetch::Fetch;
//! # use std::sync::Arc;
//!
//! # async fn example(http: Arc<dyn Fetch>) -> Result<(), reactive_stores_runtime::StoreError> {
//! let dashboard = DashboardPoller::new(PollerConfig::default(), http, Arc::new(SystemClock));
//!
//! // Observing starts polling; dropping the last view stops it
//! let mut stats = dashboard.stats();
//! let latest = stats.changed().await;
//!
//! dashboard.pause().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod poller;
pub mod reducer;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use config::{PollerConfig, DEFAULT_USERS_URL};
pub use poller::{DashboardPoller, DashboardRuntime};
pub use reducer::{DashboardEnvironment, DashboardReducer, MANUAL_FETCH, POLL_TIMER, TIMER_FETCH};
pub use stats::{HeuristicStats, StatsSynthesizer};
pub use types::{DashboardAction, DashboardState, DashboardStats, FetchSource};
