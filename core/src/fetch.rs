//! Fetch collaborator.
//!
//! Stores that talk to a remote JSON endpoint receive an implementation of
//! [`Fetch`] through their environment. Production code wraps an HTTP
//! client; tests script responses per URL.
//!
//! # Design
//!
//! The trait returns a boxed future instead of using `async fn` so that it
//! stays dyn-compatible and can be shared as `Arc<dyn Fetch>`.

use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Records returned by a successful fetch: the elements of a JSON array
pub type Records = Vec<Value>;

/// Boxed future returned by [`Fetch::fetch`]
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Records, FetchError>> + Send + 'a>>;

/// Errors that can occur when fetching records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response
    #[error("Request to {url} failed: {message}")]
    Transport {
        /// Requested URL
        url: String,
        /// Underlying transport error
        message: String,
    },

    /// The server answered with a non-success status
    #[error("Request to {url} returned status {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The body was not a JSON array
    #[error("Response from {url} could not be decoded: {message}")]
    Decode {
        /// Requested URL
        url: String,
        /// Decoder error
        message: String,
    },
}

/// Fetch a JSON array from a URL
///
/// # Example
///
/// ```ignore
/// let records = fetcher.fetch("https://jsonplaceholder.typicode.com/users").await?;
/// ```
pub trait Fetch: Send + Sync {
    /// Issue one request and return the decoded records
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, non-success status, or
    /// a body that is not a JSON array.
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a>;
}

impl<F: Fetch + ?Sized> Fetch for Arc<F> {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        (**self).fetch(url)
    }
}

/// Interpret a decoded JSON body as a list of records
///
/// # Errors
///
/// Returns [`FetchError::Decode`] when `body` is not an array.
pub fn into_records(url: &str, body: Value) -> Result<Records, FetchError> {
    match body {
        Value::Array(records) => Ok(records),
        other => Err(FetchError::Decode {
            url: url.to_string(),
            message: format!("expected a JSON array, got {}", json_kind(&other)),
        }),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
