//! HTTP fetch collaborator backed by reqwest.

use reactive_stores_core::fetch::{into_records, Fetch, FetchError, FetchFuture};
use reqwest::Client;
use std::time::Duration;

/// Fetches JSON arrays over HTTP
#[derive(Clone, Debug)]
pub struct HttpFetch {
    client: Client,
}

impl HttpFetch {
    /// Client with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetch {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            tracing::debug!(%url, "GET");
            let response = self.client.get(url).send().await.map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let body = response.json::<serde_json::Value>().await.map_err(|e| FetchError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            into_records(url, body)
        })
    }
}
