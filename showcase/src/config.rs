//! Configuration loaded from environment variables.

use dashboard_poller::DEFAULT_USERS_URL;
use feed_paginator::DEFAULT_POSTS_URL;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("{name}={value:?} is not a valid {expected}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
        /// What the value should have been
        expected: &'static str,
    },
}

/// Showcase configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowcaseConfig {
    /// Collection polled by the dashboard
    pub users_url: String,
    /// Collection paged by the feed
    pub posts_url: String,
    /// Product catalog searched by the cart demo; skipped when unset
    pub products_url: Option<String>,
    /// Dashboard poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Posts per feed page
    pub page_size: usize,
    /// Shortest accepted password
    pub min_password_length: usize,
    /// Log filter directives
    pub log_filter: String,
}

impl ShowcaseConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a numeric variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            users_url: lookup("SHOWCASE_USERS_URL").unwrap_or_else(|| DEFAULT_USERS_URL.to_string()),
            posts_url: lookup("SHOWCASE_POSTS_URL").unwrap_or_else(|| DEFAULT_POSTS_URL.to_string()),
            products_url: lookup("SHOWCASE_PRODUCTS_URL"),
            poll_interval_ms: parse(&lookup, "SHOWCASE_POLL_INTERVAL_MS", "number of milliseconds", 5_000)?,
            page_size: parse(&lookup, "SHOWCASE_PAGE_SIZE", "page size", 10)?,
            min_password_length: parse(&lookup, "SHOWCASE_MIN_PASSWORD_LENGTH", "length", 6)?,
            log_filter: lookup("RUST_LOG")
                .unwrap_or_else(|| "showcase=info,reactive_stores_runtime=info".to_string()),
        })
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, expected: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
            expected,
        }),
    }
}
