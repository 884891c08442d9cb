//! Feed reducer.
//!
//! Page fetches are exhaust-gated on [`PAGE_FETCH`]: while one is in
//! flight, further `LoadMore` triggers are dropped, not queued. The
//! reducer also checks `is_loading`/`has_more` first, so triggers after
//! the feed is exhausted cost nothing.

use crate::types::{FeedAction, FeedConfig, PaginationState, Post};
use reactive_stores_core::effect::{Effect, EffectId};
use reactive_stores_core::fetch::{Fetch, Records};
use reactive_stores_core::reducer::Reducer;
use reactive_stores_core::{async_effect, smallvec, SmallVec};
use std::sync::Arc;

/// In-flight page fetch
pub const PAGE_FETCH: EffectId = EffectId::new("feed.page_fetch");

/// Environment for the feed containing dependencies
#[derive(Clone)]
pub struct FeedEnvironment {
    /// Fetch collaborator for the posts collection
    pub fetch: Arc<dyn Fetch>,
    /// Page URLs and size
    pub config: FeedConfig,
}

impl FeedEnvironment {
    /// Creates a new feed environment
    pub fn new(config: FeedConfig, fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch, config }
    }
}

/// Reducer implementing incremental page loading
#[derive(Clone, Debug, Default)]
pub struct FeedReducer;

impl FeedReducer {
    /// Creates a new feed reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn fetch_page(env: &FeedEnvironment, page: u32) -> Effect<FeedAction> {
        let fetch = Arc::clone(&env.fetch);
        let url = env.config.page_url(page);

        let effect = async_effect! {
            tracing::debug!(page, %url, "Fetching page");
            let action = match fetch.fetch(&url).await {
                Ok(records) => match decode_posts(records) {
                    Ok(posts) => FeedAction::PageLoaded { page, posts },
                    Err(error) => FeedAction::PageFailed { page, error },
                },
                Err(error) => FeedAction::PageFailed {
                    page,
                    error: error.to_string(),
                },
            };
            Some(action)
        };
        effect.drop_while_busy(PAGE_FETCH)
    }

    fn load_more(state: &mut PaginationState, env: &FeedEnvironment) -> SmallVec<[Effect<FeedAction>; 4]> {
        if !state.can_load_more() {
            tracing::debug!(
                is_loading = state.is_loading,
                has_more = state.has_more,
                "Skipping load"
            );
            return SmallVec::new();
        }

        state.is_loading = true;
        state.error = None;
        smallvec![Self::fetch_page(env, state.current_page + 1)]
    }
}

/// Decode every record as a [`Post`]; one bad record fails the page
fn decode_posts(records: Records) -> Result<Vec<Post>, String> {
    records
        .into_iter()
        .map(serde_json::from_value::<Post>)
        .collect::<Result<_, _>>()
        .map_err(|error| format!("Failed to decode posts: {error}"))
}

impl Reducer for FeedReducer {
    type State = PaginationState;
    type Action = FeedAction;
    type Environment = FeedEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(action = action.name(), page = state.current_page, "Reducing feed action");

        match action {
            FeedAction::LoadMore => Self::load_more(state, env),

            FeedAction::Reset => {
                *state = PaginationState::new();
                let mut effects: SmallVec<[Effect<FeedAction>; 4]> =
                    smallvec![Effect::Cancel(PAGE_FETCH)];
                effects.extend(Self::load_more(state, env));
                effects
            },

            FeedAction::PageLoaded { page, posts } => {
                if page != state.current_page + 1 {
                    tracing::debug!(page, "Ignoring page that does not follow the feed");
                    return SmallVec::new();
                }
                tracing::info!(page, count = posts.len(), "Page loaded");
                state.has_more = posts.len() == env.config.page_size;
                state.posts.extend(posts);
                state.current_page = page;
                state.is_loading = false;
                state.error = None;
                SmallVec::new()
            },

            FeedAction::PageFailed { page, error } => {
                tracing::warn!(page, %error, "Page fetch failed");
                state.is_loading = false;
                state.error = Some(error);
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use reactive_stores_core::effect::Concurrency;
    use reactive_stores_testing::{assertions, ReducerTest, ScriptedFetch};

    fn env() -> FeedEnvironment {
        FeedEnvironment::new(
            FeedConfig::new("http://feed.test/posts"),
            Arc::new(ScriptedFetch::new()),
        )
    }

    fn test(given: PaginationState) -> ReducerTest<FeedReducer, PaginationState, FeedAction, FeedEnvironment> {
        ReducerTest::new(FeedReducer::new()).with_env(env()).given_state(given)
    }

    fn posts(from: u64, count: u64) -> Vec<Post> {
        (from..from + count)
            .map(|id| Post {
                id,
                title: format!("Post {id}"),
                body: String::new(),
                user_id: 1,
            })
            .collect()
    }

    #[test]
    fn load_more_starts_exhaust_gated_fetch() {
        test(PaginationState::new())
            .when_action(FeedAction::LoadMore)
            .then_state(|state| {
                assert!(state.is_loading);
                assert!(state.error.is_none());
            })
            .then_effects(|effects| {
                assertions::assert_scoped(effects, PAGE_FETCH, Concurrency::Exhaust);
            })
            .run();
    }

    #[test]
    fn load_more_while_loading_is_a_no_op() {
        test(PaginationState::new())
            .when_actions([FeedAction::LoadMore, FeedAction::LoadMore])
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn full_page_appends_and_advances() {
        test(PaginationState::new())
            .when_actions([
                FeedAction::LoadMore,
                FeedAction::PageLoaded {
                    page: 1,
                    posts: posts(1, 10),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.posts.len(), 10);
                assert_eq!(state.current_page, 1);
                assert!(state.has_more);
                assert!(!state.is_loading);
            })
            .run();
    }

    #[test]
    fn short_page_ends_the_feed() {
        test(PaginationState::new())
            .when_actions([
                FeedAction::LoadMore,
                FeedAction::PageLoaded {
                    page: 1,
                    posts: posts(1, 7),
                },
                FeedAction::LoadMore,
            ])
            .then_state(|state| {
                assert!(!state.has_more);
                assert!(!state.is_loading);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn failure_keeps_page_and_posts() {
        test(PaginationState {
            posts: posts(1, 10),
            current_page: 1,
            ..PaginationState::new()
        })
        .when_actions([
            FeedAction::LoadMore,
            FeedAction::PageFailed {
                page: 2,
                error: "Request failed".to_string(),
            },
        ])
        .then_state(|state| {
            assert_eq!(state.current_page, 1);
            assert_eq!(state.posts.len(), 10);
            assert!(state.has_more);
            assert_eq!(state.error.as_deref(), Some("Request failed"));
        })
        .run();
    }

    #[test]
    fn retry_after_failure_clears_error() {
        test(PaginationState {
            error: Some("Request failed".to_string()),
            ..PaginationState::new()
        })
        .when_action(FeedAction::LoadMore)
        .then_state(|state| assert!(state.error.is_none()))
        .run();
    }

    #[test]
    fn reset_cancels_then_loads_first_page() {
        test(PaginationState {
            posts: posts(1, 7),
            current_page: 1,
            has_more: false,
            is_loading: false,
            error: Some("old".to_string()),
        })
        .when_action(FeedAction::Reset)
        .then_state(|state| {
            assert!(state.posts.is_empty());
            assert_eq!(state.current_page, 0);
            assert!(state.has_more);
            assert!(state.is_loading);
            assert!(state.error.is_none());
        })
        .then_effects(|effects| {
            assert!(matches!(effects[0], Effect::Cancel(PAGE_FETCH)));
            assertions::assert_scoped(effects, PAGE_FETCH, Concurrency::Exhaust);
        })
        .run();
    }

    #[test]
    fn out_of_order_page_is_ignored() {
        test(PaginationState::new())
            .when_actions([
                FeedAction::LoadMore,
                FeedAction::PageLoaded {
                    page: 3,
                    posts: posts(21, 10),
                },
            ])
            .then_state(|state| {
                assert!(state.posts.is_empty());
                assert!(state.is_loading);
            })
            .run();
    }

    #[test]
    fn malformed_records_fail_the_page() {
        let error = decode_posts(vec![serde_json::json!({"id": "x"})]).unwrap_err();
        assert!(error.starts_with("Failed to decode posts"));
    }
}
