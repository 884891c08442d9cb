//! Dashboard poller facade.
//!
//! Polling runs only while someone observes the dashboard. Views and
//! subscriptions handed out here hold a lease on a reference-counted share
//! of the store's snapshots: the first lease starts the poll timer, the
//! last one to drop stops it, and every observer sees the same cached
//! snapshot instead of fetching on its own.

use crate::config::PollerConfig;
use crate::reducer::{DashboardEnvironment, DashboardReducer};
use crate::stats::{HeuristicStats, StatsSynthesizer};
use crate::types::{DashboardAction, DashboardState, DashboardStats};
use chrono::{DateTime, Utc};
use reactive_stores_core::environment::Clock;
use reactive_stores_core::fetch::Fetch;
use reactive_stores_runtime::share::{Lease, Shared, SharedSubscription};
use reactive_stores_runtime::view::DerivedView;
use reactive_stores_runtime::{Store, StoreError};
use std::sync::Arc;

/// Runtime store type behind [`DashboardPoller`]
pub type DashboardRuntime = Store<DashboardState, DashboardAction, DashboardEnvironment, DashboardReducer>;

/// Polling dashboard with pause/resume, manual refresh and shared caching
///
/// Must be created inside a Tokio runtime: connecting and disconnecting
/// go through the store's mailbox.
#[derive(Clone)]
pub struct DashboardPoller {
    store: DashboardRuntime,
    shared: Shared<DashboardState>,
}

impl DashboardPoller {
    /// Creates a poller using [`HeuristicStats`]
    pub fn new(config: PollerConfig, fetch: Arc<dyn Fetch>, clock: Arc<dyn Clock>) -> Self {
        Self::with_synthesizer(config, fetch, clock, Arc::new(HeuristicStats::new()))
    }

    /// Creates a poller with a custom stats synthesis
    pub fn with_synthesizer(
        config: PollerConfig,
        fetch: Arc<dyn Fetch>,
        clock: Arc<dyn Clock>,
        synthesizer: Arc<dyn StatsSynthesizer>,
    ) -> Self {
        let env = DashboardEnvironment::new(config, fetch, clock, synthesizer);
        let store = Store::new(DashboardState::new(), DashboardReducer::new(), env);

        let connect = store.clone();
        let disconnect = store.clone();
        let shared = Shared::new(
            store.subscribe(),
            move || notify(&connect, DashboardAction::Connect),
            move || notify(&disconnect, DashboardAction::Disconnect),
        );

        Self { store, shared }
    }

    /// Skip fetching on timer ticks; no-op when already paused
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the poller is disposed.
    pub async fn pause(&self) -> Result<(), StoreError> {
        self.store.send(DashboardAction::Pause).await.map(drop)
    }

    /// Fetch on timer ticks again; no-op when not paused
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the poller is disposed.
    pub async fn resume(&self) -> Result<(), StoreError> {
        self.store.send(DashboardAction::Resume).await.map(drop)
    }

    /// Flip between paused and running
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the poller is disposed.
    pub async fn toggle_pause(&self) -> Result<(), StoreError> {
        self.store.send(DashboardAction::TogglePause).await.map(drop)
    }

    /// Fetch now, even while paused or unobserved
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the poller is disposed.
    #[tracing::instrument(skip(self), name = "dashboard_refresh")]
    pub async fn refresh(&self) -> Result<(), StoreError> {
        self.store.send(DashboardAction::Refresh).await.map(drop)
    }

    /// Observe the whole snapshot, keeping polling alive while held
    #[must_use]
    pub fn subscribe(&self) -> SharedSubscription<DashboardState> {
        self.shared.subscribe()
    }

    /// Keep polling alive without observing anything
    #[must_use]
    pub fn lease(&self) -> Lease {
        self.shared.lease()
    }

    /// Latest stats
    #[must_use]
    pub fn stats(&self) -> DerivedView<DashboardState, Option<DashboardStats>> {
        self.shared.view(|state: &DashboardState| state.stats.clone())
    }

    /// Whether a fetch is outstanding
    #[must_use]
    pub fn is_loading(&self) -> DerivedView<DashboardState, bool> {
        self.shared.view(|state: &DashboardState| state.is_loading)
    }

    /// Whether polling is paused
    #[must_use]
    pub fn is_paused(&self) -> DerivedView<DashboardState, bool> {
        self.shared.view(|state: &DashboardState| state.is_paused)
    }

    /// Latest fetch error
    #[must_use]
    pub fn error(&self) -> DerivedView<DashboardState, Option<String>> {
        self.shared.view(|state: &DashboardState| state.error.clone())
    }

    /// Time of the latest successful fetch
    #[must_use]
    pub fn last_refresh(&self) -> DerivedView<DashboardState, Option<DateTime<Utc>>> {
        self.shared.view(|state: &DashboardState| state.last_refresh)
    }

    /// The latest snapshot, without subscribing
    #[must_use]
    pub fn current_state(&self) -> DashboardState {
        self.store.snapshot()
    }

    /// Number of live observers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscriber_count()
    }

    /// The underlying runtime store
    #[must_use]
    pub const fn store(&self) -> &DashboardRuntime {
        &self.store
    }

    /// Stop polling and abandon outstanding fetches
    pub fn dispose(&self) {
        tracing::info!("Disposing dashboard poller");
        self.store.dispose();
    }
}

fn notify(store: &DashboardRuntime, action: DashboardAction) {
    match store.dispatch(action.clone()) {
        Ok(()) => {},
        Err(error) if stopped_by_disposal(&error) => {
            tracing::debug!(action = action.name(), %error, "Dashboard lifecycle action not delivered");
        },
        Err(error) => {
            tracing::warn!(
                action = action.name(),
                %error,
                "Dashboard lifecycle action dropped, polling state unchanged"
            );
        },
    }
}

/// Failures that only mean the poller was already disposed
const fn stopped_by_disposal(error: &StoreError) -> bool {
    matches!(error, StoreError::ShutdownInProgress)
}

impl std::fmt::Debug for DashboardPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardPoller")
            .field("state", &self.store.snapshot())
            .field("subscribers", &self.shared.subscriber_count())
            .finish()
    }
}
