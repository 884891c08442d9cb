//! Reference-counted sharing of a store's snapshots.
//!
//! A [`Shared`] wraps a snapshot receiver together with two hooks. The
//! first subscriber runs `on_connect` (for example, starting a poll timer);
//! when the last subscriber goes away `on_disconnect` runs (stopping it).
//! The next subscriber after that starts a fresh cycle. Every subscriber
//! sees the same latest snapshot, so late subscribers get the cached value
//! instead of triggering work of their own.
//!
//! Hooks run while the subscriber count lock is held, so connect and
//! disconnect always alternate. They must not block.

use crate::view::DerivedView;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

type Hook = Box<dyn Fn() + Send + Sync>;

struct Counter {
    subscribers: Mutex<usize>,
    on_connect: Hook,
    on_disconnect: Hook,
}

/// Keeps a [`Shared`] connected while alive
///
/// Cloning a lease adds a subscriber; dropping one removes it.
pub struct Lease {
    counter: Arc<Counter>,
}

impl Lease {
    fn acquire(counter: &Arc<Counter>) -> Self {
        let mut subscribers = counter
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *subscribers == 0 {
            tracing::debug!("First subscriber, connecting");
            (counter.on_connect)();
        }
        *subscribers += 1;

        Self {
            counter: Arc::clone(counter),
        }
    }
}

impl Clone for Lease {
    fn clone(&self) -> Self {
        Self::acquire(&self.counter)
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        let mut subscribers = self
            .counter
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *subscribers = subscribers.saturating_sub(1);
        if *subscribers == 0 {
            tracing::debug!("Last subscriber left, disconnecting");
            (self.counter.on_disconnect)();
        }
    }
}

impl std::fmt::Debug for Lease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lease").finish_non_exhaustive()
    }
}

/// Reference-counted, replay-latest share of a snapshot receiver
pub struct Shared<S> {
    source: watch::Receiver<S>,
    counter: Arc<Counter>,
}

impl<S> Shared<S> {
    /// Share `source`, running the hooks on the first subscribe and the last drop
    pub fn new<C, D>(source: watch::Receiver<S>, on_connect: C, on_disconnect: D) -> Self
    where
        C: Fn() + Send + Sync + 'static,
        D: Fn() + Send + Sync + 'static,
    {
        Self {
            source,
            counter: Arc::new(Counter {
                subscribers: Mutex::new(0),
                on_connect: Box::new(on_connect),
                on_disconnect: Box::new(on_disconnect),
            }),
        }
    }

    /// Add a subscriber without a receiver
    #[must_use]
    pub fn lease(&self) -> Lease {
        Lease::acquire(&self.counter)
    }

    /// Add a subscriber
    #[must_use]
    pub fn subscribe(&self) -> SharedSubscription<S> {
        SharedSubscription {
            receiver: self.source.clone(),
            _lease: self.lease(),
        }
    }

    /// Add a subscriber observing a projection of the snapshots
    #[must_use]
    pub fn view<T, F>(&self, project: F) -> DerivedView<S, T>
    where
        F: Fn(&S) -> T + Send + Sync + 'static,
        T: Clone + PartialEq,
    {
        DerivedView::new(self.source.clone(), project).with_lease(self.lease())
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        *self
            .counter
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> Clone for Shared<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            counter: Arc::clone(&self.counter),
        }
    }
}

/// One subscriber of a [`Shared`]
///
/// Dropping it unsubscribes.
pub struct SharedSubscription<S> {
    receiver: watch::Receiver<S>,
    _lease: Lease,
}

impl<S: Clone> SharedSubscription<S> {
    /// The latest snapshot
    #[must_use]
    pub fn get(&self) -> S {
        self.receiver.borrow().clone()
    }

    /// Wait for the next published snapshot
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<S> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}
