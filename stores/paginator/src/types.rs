//! Core domain types for the feed.

use reactive_stores_macros::Action;
use serde::{Deserialize, Serialize};

/// Collection the feed pages through by default
pub const DEFAULT_POSTS_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// A feed entry; identity is `id`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Post identifier
    pub id: u64,
    /// Headline
    pub title: String,
    /// Text
    pub body: String,
    /// Author
    pub user_id: u64,
}

/// Feed snapshot
///
/// `posts` only ever grows (until reset), in fetch order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    /// Every loaded post, oldest page first
    pub posts: Vec<Post>,
    /// Number of pages loaded
    pub current_page: u32,
    /// True while a page fetch is outstanding
    pub is_loading: bool,
    /// False once a page came back short
    pub has_more: bool,
    /// Message from the latest failed fetch
    pub error: Option<String>,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginationState {
    /// The empty feed: no posts, page 0, more to load
    #[must_use]
    pub const fn new() -> Self {
        Self {
            posts: Vec::new(),
            current_page: 0,
            is_loading: false,
            has_more: true,
            error: None,
        }
    }

    /// Whether `load_more` would start a fetch
    #[must_use]
    pub const fn can_load_more(&self) -> bool {
        !self.is_loading && self.has_more
    }
}

/// Where and how big pages are
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Collection URL without query
    pub base_url: String,
    /// Posts per page, at least 1
    pub page_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POSTS_URL)
    }
}

impl FeedConfig {
    /// Page through `base_url`, 10 posts at a time
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            page_size: 10,
        }
    }

    /// Set the page size (clamped to at least 1)
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// URL of one-based `page`
    ///
    /// ```
    /// use feed_paginator::FeedConfig;
    ///
    /// let config = FeedConfig::new("https://example.test/posts");
    /// assert_eq!(config.page_url(3), "https://example.test/posts?_start=20&_limit=10");
    /// ```
    #[must_use]
    pub fn page_url(&self, page: u32) -> String {
        let preceding = usize::try_from(page.saturating_sub(1)).unwrap_or(usize::MAX);
        let start = preceding.saturating_mul(self.page_size);
        format!("{}?_start={start}&_limit={}", self.base_url, self.page_size)
    }
}

/// Feed actions
#[derive(Action, Clone, Debug, PartialEq)]
pub enum FeedAction {
    /// Fetch the next page, unless busy or exhausted
    #[command]
    LoadMore,

    /// Back to the empty feed, then load the first page
    #[command]
    Reset,

    /// A page arrived
    #[event]
    PageLoaded {
        /// One-based page number
        page: u32,
        /// The page's posts
        posts: Vec<Post>,
    },

    /// A page could not be fetched or decoded
    #[event]
    PageFailed {
        /// One-based page number
        page: u32,
        /// What went wrong
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_starts_at_zero() {
        let config = FeedConfig::new("http://feed.test/posts").with_page_size(5);
        assert_eq!(config.page_url(1), "http://feed.test/posts?_start=0&_limit=5");
        assert_eq!(config.page_url(2), "http://feed.test/posts?_start=5&_limit=5");
    }

    #[test]
    fn page_size_is_at_least_one() {
        assert_eq!(FeedConfig::default().with_page_size(0).page_size, 1);
    }

    #[test]
    fn initial_state_can_load() {
        let state = PaginationState::new();
        assert!(state.can_load_more());
        assert!(state.posts.is_empty());
        assert_eq!(state.current_page, 0);
    }

    #[test]
    fn post_uses_camel_case_author_field() {
        let post: Post = serde_json::from_value(serde_json::json!({
            "id": 1, "title": "t", "body": "b", "userId": 7
        }))
        .unwrap_or_else(|error| unreachable!("valid post: {error}"));
        assert_eq!(post.user_id, 7);
    }
}
