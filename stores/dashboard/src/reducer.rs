//! Dashboard reducer.
//!
//! Two triggers fetch stats: the poll timer and manual refresh. Each has
//! its own switch-to-latest scope, so a newer tick abandons an older tick's
//! fetch and a newer refresh abandons an older refresh, but a tick never
//! abandons a refresh. Both write through [`DashboardAction::FetchCompleted`].

use crate::config::PollerConfig;
use crate::stats::StatsSynthesizer;
use crate::types::{DashboardAction, DashboardState, FetchSource};
use reactive_stores_core::effect::{Effect, EffectId};
use reactive_stores_core::environment::Clock;
use reactive_stores_core::fetch::Fetch;
use reactive_stores_core::reducer::Reducer;
use reactive_stores_core::{async_effect, every, smallvec, SmallVec};
use reactive_stores_runtime::retry::retry_with_backoff;
use std::sync::Arc;

/// Recurring poll timer
pub const POLL_TIMER: EffectId = EffectId::new("dashboard.poll_timer");
/// Fetch started by a timer tick
pub const TIMER_FETCH: EffectId = EffectId::new("dashboard.timer_fetch");
/// Fetch started by a manual refresh
pub const MANUAL_FETCH: EffectId = EffectId::new("dashboard.manual_fetch");

/// Environment for the dashboard containing dependencies
#[derive(Clone)]
pub struct DashboardEnvironment {
    /// Fetch collaborator for the stats collection
    pub fetch: Arc<dyn Fetch>,
    /// Clock for refresh timestamps
    pub clock: Arc<dyn Clock>,
    /// Turns fetched records into stats
    pub synthesizer: Arc<dyn StatsSynthesizer>,
    /// What to poll and how often
    pub config: PollerConfig,
}

impl DashboardEnvironment {
    /// Creates a new dashboard environment
    pub fn new(
        config: PollerConfig,
        fetch: Arc<dyn Fetch>,
        clock: Arc<dyn Clock>,
        synthesizer: Arc<dyn StatsSynthesizer>,
    ) -> Self {
        Self {
            fetch,
            clock,
            synthesizer,
            config,
        }
    }
}

/// Reducer implementing the poll cycle: `Idle → Fetching → {Success | Failed}`
#[derive(Clone, Debug, Default)]
pub struct DashboardReducer;

impl DashboardReducer {
    /// Creates a new dashboard reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Fetch the collection with retries and synthesize stats from it
    fn fetch_stats(env: &DashboardEnvironment, source: FetchSource) -> Effect<DashboardAction> {
        let fetch = Arc::clone(&env.fetch);
        let clock = Arc::clone(&env.clock);
        let synthesizer = Arc::clone(&env.synthesizer);
        let url = env.config.url.clone();
        let policy = env.config.retry.clone();

        let effect = async_effect! {
            let result = retry_with_backoff(&policy, || fetch.fetch(&url))
                .await
                .map(|records| synthesizer.synthesize(&records, clock.now()))
                .map_err(|error| error.to_string());
            Some(DashboardAction::FetchCompleted { source, result })
        };

        match source {
            FetchSource::Timer => effect.replace_in_flight(TIMER_FETCH),
            FetchSource::Manual => effect.replace_in_flight(MANUAL_FETCH),
        }
    }

    fn pause(state: &mut DashboardState) {
        if !state.is_paused {
            tracing::info!("Polling paused");
            state.is_paused = true;
        }
    }

    fn resume(state: &mut DashboardState) {
        if state.is_paused {
            tracing::info!("Polling resumed");
            state.is_paused = false;
        }
    }
}

impl Reducer for DashboardReducer {
    type State = DashboardState;
    type Action = DashboardAction;
    type Environment = DashboardEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(action = action.name(), "Reducing dashboard action");

        match action {
            DashboardAction::Connect => {
                state.polling = true;
                tracing::info!(interval_ms = env.config.interval.as_millis(), "Polling started");
                smallvec![every! {
                    period: env.config.interval,
                    action: DashboardAction::Tick
                }
                .replace_in_flight(POLL_TIMER)]
            },

            DashboardAction::Disconnect => {
                state.polling = false;
                state.set_fetching(FetchSource::Timer, false);
                tracing::info!("Polling stopped");
                smallvec![Effect::Cancel(POLL_TIMER), Effect::Cancel(TIMER_FETCH)]
            },

            DashboardAction::Pause => {
                Self::pause(state);
                SmallVec::new()
            },

            DashboardAction::Resume => {
                Self::resume(state);
                SmallVec::new()
            },

            DashboardAction::TogglePause => {
                if state.is_paused {
                    Self::resume(state);
                } else {
                    Self::pause(state);
                }
                SmallVec::new()
            },

            DashboardAction::Refresh => {
                state.error = None;
                state.set_fetching(FetchSource::Manual, true);
                smallvec![Self::fetch_stats(env, FetchSource::Manual)]
            },

            DashboardAction::Tick if state.is_paused => {
                // Switching to the cached snapshot abandons the previous tick's fetch
                tracing::trace!("Tick while paused, keeping last snapshot");
                state.set_fetching(FetchSource::Timer, false);
                smallvec![Effect::Cancel(TIMER_FETCH)]
            },

            DashboardAction::Tick => {
                state.set_fetching(FetchSource::Timer, true);
                smallvec![Self::fetch_stats(env, FetchSource::Timer)]
            },

            DashboardAction::FetchCompleted { source, result } => {
                state.set_fetching(source, false);
                match result {
                    Ok(stats) => {
                        state.stats = Some(stats);
                        state.error = None;
                        state.last_refresh = Some(env.clock.now());
                    },
                    Err(error) => {
                        tracing::warn!(?source, %error, "Stats fetch failed");
                        state.error = Some(error);
                    },
                }
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::HeuristicStats;
    use crate::types::DashboardStats;
    use reactive_stores_core::effect::Concurrency;
    use reactive_stores_testing::{assertions, test_clock, ReducerTest, ScriptedFetch};

    fn env() -> DashboardEnvironment {
        DashboardEnvironment::new(
            PollerConfig::new("http://stats.test/users"),
            Arc::new(ScriptedFetch::new()),
            Arc::new(test_clock()),
            Arc::new(HeuristicStats::seeded(7)),
        )
    }

    fn test(
        given: DashboardState,
    ) -> ReducerTest<DashboardReducer, DashboardState, DashboardAction, DashboardEnvironment> {
        ReducerTest::new(DashboardReducer::new())
            .with_env(env())
            .given_state(given)
    }

    fn stats(total_users: u64) -> DashboardStats {
        DashboardStats {
            total_users,
            active_users: total_users * 7 / 10,
            total_sales: 5_000,
            today_revenue: 1_000,
            last_updated: reactive_stores_testing::epoch(),
        }
    }

    #[test]
    fn connect_starts_the_poll_timer() {
        test(DashboardState::new())
            .when_action(DashboardAction::Connect)
            .then_state(|state| assert!(state.is_polling()))
            .then_effects(|effects| {
                assertions::assert_scoped(effects, POLL_TIMER, Concurrency::Replace);
                assertions::assert_has_interval(effects);
            })
            .run();
    }

    #[test]
    fn disconnect_stops_timer_and_timer_fetch() {
        test(DashboardState::new())
            .when_actions([DashboardAction::Connect, DashboardAction::Tick, DashboardAction::Disconnect])
            .then_state(|state| {
                assert!(!state.is_polling());
                assert!(!state.is_loading);
            })
            .then_effects(|effects| {
                assertions::assert_cancels(effects, POLL_TIMER);
                assertions::assert_cancels(effects, TIMER_FETCH);
            })
            .run();
    }

    #[test]
    fn tick_fetches_with_switch_to_latest() {
        test(DashboardState::new())
            .when_action(DashboardAction::Tick)
            .then_state(|state| assert!(state.is_loading))
            .then_effects(|effects| {
                assertions::assert_scoped(effects, TIMER_FETCH, Concurrency::Replace);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn paused_tick_does_not_fetch() {
        test(DashboardState::new())
            .when_actions([DashboardAction::Pause, DashboardAction::Tick])
            .then_state(|state| assert!(!state.is_loading))
            .then_effects(|effects| {
                assertions::assert_cancels(effects, TIMER_FETCH);
                assert!(assertions::scopes(effects).is_empty());
            })
            .run();
    }

    #[test]
    fn pause_is_idempotent() {
        test(DashboardState::new())
            .when_actions([DashboardAction::Pause, DashboardAction::Pause])
            .then_state(|state| {
                assert!(state.is_paused);
                assert_eq!(
                    *state,
                    DashboardState {
                        is_paused: true,
                        ..DashboardState::new()
                    }
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn toggle_twice_restores_pause_flag() {
        test(DashboardState::new())
            .when_actions([DashboardAction::TogglePause, DashboardAction::TogglePause])
            .then_state(|state| assert!(!state.is_paused))
            .run();
    }

    #[test]
    fn refresh_clears_error_and_fetches_manually() {
        test(DashboardState {
            error: Some("boom".to_string()),
            ..DashboardState::new()
        })
        .when_action(DashboardAction::Refresh)
        .then_state(|state| {
            assert!(state.error.is_none());
            assert!(state.is_loading);
        })
        .then_effects(|effects| {
            assertions::assert_scoped(effects, MANUAL_FETCH, Concurrency::Replace);
        })
        .run();
    }

    #[test]
    fn success_replaces_stats_and_stamps_refresh() {
        test(DashboardState::new())
            .when_actions([
                DashboardAction::Tick,
                DashboardAction::FetchCompleted {
                    source: FetchSource::Timer,
                    result: Ok(stats(10)),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.stats, Some(stats(10)));
                assert_eq!(state.last_refresh, Some(reactive_stores_testing::epoch()));
                assert!(state.error.is_none());
                assert!(!state.is_loading);
            })
            .run();
    }

    #[test]
    fn failure_keeps_stale_stats() {
        test(DashboardState {
            stats: Some(stats(10)),
            ..DashboardState::new()
        })
        .when_actions([
            DashboardAction::Refresh,
            DashboardAction::FetchCompleted {
                source: FetchSource::Manual,
                result: Err("Request failed".to_string()),
            },
        ])
        .then_state(|state| {
            assert_eq!(state.stats, Some(stats(10)));
            assert_eq!(state.error.as_deref(), Some("Request failed"));
            assert!(state.last_refresh.is_none());
            assert!(!state.is_loading);
        })
        .run();
    }

    #[test]
    fn loading_stays_on_while_the_other_trigger_fetches() {
        test(DashboardState::new())
            .when_actions([
                DashboardAction::Tick,
                DashboardAction::Refresh,
                DashboardAction::FetchCompleted {
                    source: FetchSource::Timer,
                    result: Ok(stats(3)),
                },
            ])
            .then_state(|state| assert!(state.is_loading))
            .run();
    }
}
