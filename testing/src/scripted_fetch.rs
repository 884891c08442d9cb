//! Programmable fetch collaborator for store tests.

use reactive_stores_core::fetch::{Fetch, FetchError, FetchFuture, Records};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

type Outcome = Result<Records, FetchError>;

#[derive(Default)]
struct UrlScript {
    /// One-shot outcomes, consumed before `standing`
    queue: VecDeque<Outcome>,
    /// Outcome for every call once `queue` is empty
    standing: Option<Outcome>,
    calls: usize,
}

#[derive(Default)]
struct Script {
    urls: HashMap<String, UrlScript>,
    requests: Vec<String>,
    latency: Duration,
}

/// Fetch collaborator whose answers are scripted per URL
///
/// Every call is counted. Answers come from the URL's one-shot queue first
/// (`enqueue`, `fail_times`), then from its standing answer (`respond`,
/// `fail`). A URL with no script answers with status 404.
///
/// Calls can be held open with [`hold`](Self::hold) until
/// [`release`](Self::release), which is how tests observe a fetch that is
/// still outstanding. A fixed [`latency`](Self::with_latency) works with
/// paused Tokio time.
///
/// Clones share the same script.
#[derive(Clone)]
pub struct ScriptedFetch {
    script: Arc<Mutex<Script>>,
    gate: watch::Sender<bool>,
}

impl Default for ScriptedFetch {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedFetch {
    /// Create a collaborator with nothing scripted and the gate open
    #[must_use]
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            gate,
        }
    }

    /// Delay every answer by `latency`
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = latency;
        self
    }

    /// Answer every call to `url` with `records`
    pub fn respond(&self, url: &str, records: Records) {
        self.lock().urls.entry(url.to_string()).or_default().standing = Some(Ok(records));
    }

    /// Fail every call to `url` with a transport error
    pub fn fail(&self, url: &str, message: &str) {
        let error = transport(url, message);
        self.lock().urls.entry(url.to_string()).or_default().standing = Some(Err(error));
    }

    /// Answer the next call to `url` with `outcome`
    pub fn enqueue(&self, url: &str, outcome: Result<Records, FetchError>) {
        self.lock()
            .urls
            .entry(url.to_string())
            .or_default()
            .queue
            .push_back(outcome);
    }

    /// Fail the next `times` calls to `url` with a transport error
    pub fn fail_times(&self, url: &str, times: usize, message: &str) {
        for _ in 0..times {
            self.enqueue(url, Err(transport(url, message)));
        }
    }

    /// Number of calls made to `url`
    #[must_use]
    pub fn calls(&self, url: &str) -> usize {
        self.lock().urls.get(url).map_or(0, |script| script.calls)
    }

    /// Number of calls made to any URL
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.lock().requests.len()
    }

    /// Every requested URL, in call order
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    /// Hold every call (new and outstanding) until [`release`](Self::release)
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// Let held calls answer
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and pick its outcome
    fn answer(&self, url: &str) -> (Outcome, Duration) {
        let mut script = self.lock();
        script.requests.push(url.to_string());
        let latency = script.latency;
        let entry = script.urls.entry(url.to_string()).or_default();
        entry.calls += 1;

        let outcome = entry
            .queue
            .pop_front()
            .or_else(|| entry.standing.clone())
            .unwrap_or_else(|| {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            });
        (outcome, latency)
    }
}

impl Fetch for ScriptedFetch {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        let (outcome, latency) = self.answer(url);
        let mut gate = self.gate.subscribe();

        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            // A dropped sender cannot happen while `self` is borrowed
            let _ = gate.wait_for(|open| *open).await;
            outcome
        })
    }
}

fn transport(url: &str, message: &str) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    const USERS: &str = "https://example.test/users";

    #[tokio::test]
    async fn unscripted_url_is_not_found() {
        let fetch = ScriptedFetch::new();

        let result = fetch.fetch(USERS).await;

        assert_eq!(
            result,
            Err(FetchError::Status {
                url: USERS.to_string(),
                status: 404
            })
        );
        assert_eq!(fetch.calls(USERS), 1);
    }

    #[tokio::test]
    async fn queued_outcomes_come_before_the_standing_answer() {
        let fetch = ScriptedFetch::new();
        fetch.respond(USERS, vec![json!({"id": 1})]);
        fetch.fail_times(USERS, 2, "connection reset");

        assert!(fetch.fetch(USERS).await.is_err());
        assert!(fetch.fetch(USERS).await.is_err());
        assert_eq!(fetch.fetch(USERS).await.unwrap().len(), 1);
        assert_eq!(fetch.fetch(USERS).await.unwrap().len(), 1);
        assert_eq!(fetch.calls(USERS), 4);
        assert_eq!(fetch.total_calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn held_calls_wait_for_release() {
        let fetch = ScriptedFetch::new();
        fetch.respond(USERS, Vec::new());
        fetch.hold();

        let clone = fetch.clone();
        let pending = tokio::spawn(async move { clone.fetch(USERS).await });
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!pending.is_finished());
        assert_eq!(fetch.calls(USERS), 1);

        fetch.release();
        assert_eq!(pending.await.unwrap(), Ok(Vec::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_the_answer() {
        let fetch = ScriptedFetch::new().with_latency(Duration::from_millis(200));
        fetch.respond(USERS, Vec::new());

        let start = tokio::time::Instant::now();
        fetch.fetch(USERS).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
