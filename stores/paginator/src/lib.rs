//! Infinite-scroll feed store.
//!
//! Pages are loaded one at a time and appended to the feed. Rapid repeated
//! `load_more` calls are coalesced with an exhaust discipline: while a page
//! is in flight, new triggers are dropped, and progress resumes as soon as
//! the page resolves. A page shorter than the page size ends the feed until
//! `reset`.
//!
//! # Example Usage
//!
//! ```no_run
//! use feed_paginator::{FeedConfig, FeedPaginator};
//! # use reactive_stores_core::fetch::Fetch;
//! # use std::sync::Arc;
//!
//! # async fn example(http: Arc<dyn Fetch>) -> Result<(), reactive_stores_runtime::StoreError> {
//! let feed = FeedPaginator::new(FeedConfig::default(), http);
//! let posts = feed.posts();
//!
//! let mut page = feed.load_more().await?;
//! feed.load_more().await?; // dropped: page 1 is still loading
//! page.wait().await;
//!
//! assert_eq!(posts.get().len(), 10);
//! # Ok(())
//! # }
//! ```

pub mod feed;
pub mod reducer;
pub mod types;

// Re-export commonly used types
pub use feed::{FeedPaginator, FeedRuntime};
pub use reducer::{FeedEnvironment, FeedReducer, PAGE_FETCH};
pub use types::{FeedAction, FeedConfig, PaginationState, Post, DEFAULT_POSTS_URL};
