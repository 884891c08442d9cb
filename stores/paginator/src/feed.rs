//! Feed paginator facade.

use crate::reducer::{FeedEnvironment, FeedReducer};
use crate::types::{FeedAction, FeedConfig, PaginationState, Post};
use reactive_stores_core::fetch::Fetch;
use reactive_stores_runtime::view::DerivedView;
use reactive_stores_runtime::{EffectHandle, Store, StoreError};
use std::sync::Arc;

/// Runtime store type behind [`FeedPaginator`]
pub type FeedRuntime = Store<PaginationState, FeedAction, FeedEnvironment, FeedReducer>;

/// Infinite-scroll feed
///
/// `load_more` may be called as often as the consumer likes (for example on
/// every scroll event); at most one page fetch is ever outstanding.
#[derive(Clone)]
pub struct FeedPaginator {
    store: FeedRuntime,
}

impl FeedPaginator {
    /// Creates an empty feed; nothing is fetched until `load_more` or `reset`
    pub fn new(config: FeedConfig, fetch: Arc<dyn Fetch>) -> Self {
        Self {
            store: Store::new(
                PaginationState::new(),
                FeedReducer::new(),
                FeedEnvironment::new(config, fetch),
            ),
        }
    }

    /// Fetch the next page unless one is loading or the feed is exhausted
    ///
    /// The returned handle resolves once the page (if one was requested)
    /// has been appended or has failed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the feed is disposed.
    pub async fn load_more(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(FeedAction::LoadMore).await
    }

    /// Drop every post and load the first page again
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the feed is disposed.
    pub async fn reset(&self) -> Result<EffectHandle, StoreError> {
        tracing::info!("Resetting feed");
        self.store.send(FeedAction::Reset).await
    }

    /// Loaded posts in order
    #[must_use]
    pub fn posts(&self) -> DerivedView<PaginationState, Vec<Post>> {
        self.store.view(|state: &PaginationState| state.posts.clone())
    }

    /// Whether a page fetch is outstanding
    #[must_use]
    pub fn is_loading(&self) -> DerivedView<PaginationState, bool> {
        self.store.view(|state: &PaginationState| state.is_loading)
    }

    /// Whether more pages may exist
    #[must_use]
    pub fn has_more(&self) -> DerivedView<PaginationState, bool> {
        self.store.view(|state: &PaginationState| state.has_more)
    }

    /// Latest page error
    #[must_use]
    pub fn error(&self) -> DerivedView<PaginationState, Option<String>> {
        self.store.view(|state: &PaginationState| state.error.clone())
    }

    /// The latest snapshot
    #[must_use]
    pub fn current_state(&self) -> PaginationState {
        self.store.snapshot()
    }

    /// The underlying runtime store
    #[must_use]
    pub const fn store(&self) -> &FeedRuntime {
        &self.store
    }

    /// Abandon any outstanding fetch and stop accepting commands
    pub fn dispose(&self) {
        tracing::info!("Disposing feed");
        self.store.dispose();
    }
}

impl std::fmt::Debug for FeedPaginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.store.snapshot();
        f.debug_struct("FeedPaginator")
            .field("posts", &state.posts.len())
            .field("current_page", &state.current_page)
            .field("is_loading", &state.is_loading)
            .field("has_more", &state.has_more)
            .finish()
    }
}
