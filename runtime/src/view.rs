//! Derived views: read-only projections of store snapshots.
//!
//! A view never stores its value; it recomputes the projection from the
//! latest snapshot whenever it is read. Change notifications are
//! distinct-until-changed: a snapshot that projects to the same value as
//! the last one observed through the view is skipped.

use crate::share::Lease;
use futures::stream::{self, Stream};
use std::sync::Arc;
use tokio::sync::watch;

/// Read-only projection of a store's snapshots
///
/// # Example
///
/// ```ignore
/// let mut total = store.view(CartState::total_price);
/// assert_eq!(total.get(), 0.0);
///
/// store.send(CartAction::Add(product)).await?;
/// assert_eq!(total.changed().await, Some(9.99));
/// ```
pub struct DerivedView<S, T> {
    source: watch::Receiver<S>,
    project: Arc<dyn Fn(&S) -> T + Send + Sync>,
    last_seen: T,
    lease: Option<Lease>,
}

impl<S, T> DerivedView<S, T>
where
    T: Clone + PartialEq,
{
    /// Project snapshots from `source` through `project`
    pub fn new<F>(source: watch::Receiver<S>, project: F) -> Self
    where
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        let last_seen = project(&source.borrow());
        Self {
            source,
            project: Arc::new(project),
            last_seen,
            lease: None,
        }
    }

    /// Keep `lease` alive for as long as this view exists
    #[must_use]
    pub fn with_lease(mut self, lease: Lease) -> Self {
        self.lease = Some(lease);
        self
    }

    /// Current value of the projection
    #[must_use]
    pub fn get(&self) -> T {
        (self.project)(&self.source.borrow())
    }

    /// Wait until the projection differs from the last value seen through this view
    ///
    /// # Returns
    ///
    /// The new value, or `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<T> {
        loop {
            self.source.changed().await.ok()?;
            let value = (self.project)(&self.source.borrow_and_update());
            if value != self.last_seen {
                self.last_seen = value.clone();
                return Some(value);
            }
        }
    }

    /// Stream the current value followed by every distinct change
    pub fn into_stream(mut self) -> impl Stream<Item = T> {
        let current = (self.project)(&self.source.borrow_and_update());
        self.last_seen = current.clone();

        stream::unfold((self, Some(current)), |(mut view, first)| async move {
            match first {
                Some(value) => Some((value, (view, None))),
                None => view.changed().await.map(|value| (value, (view, None))),
            }
        })
    }
}

impl<S, T> std::fmt::Debug for DerivedView<S, T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedView")
            .field("last_seen", &self.last_seen)
            .field("leased", &self.lease.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::DerivedView;
    use futures::StreamExt;
    use tokio::sync::watch;

    #[tokio::test]
    async fn get_recomputes_from_latest_snapshot() {
        let (tx, rx) = watch::channel(vec![1, 2]);
        let view = DerivedView::new(rx, |items: &Vec<i32>| items.iter().sum::<i32>());

        assert_eq!(view.get(), 3);
        tx.send_replace(vec![1, 2, 3]);
        assert_eq!(view.get(), 6);
    }

    #[tokio::test]
    async fn changed_skips_snapshots_with_equal_projection() {
        let (tx, rx) = watch::channel((0, "a"));
        let mut view = DerivedView::new(rx, |(n, _): &(i32, &str)| *n);

        tx.send_replace((0, "b"));
        tx.send_replace((5, "b"));

        assert_eq!(view.changed().await, Some(5));
    }

    #[tokio::test]
    async fn changed_ends_when_source_is_dropped() {
        let (tx, rx) = watch::channel(1);
        let mut view = DerivedView::new(rx, |n: &i32| *n);

        drop(tx);
        assert_eq!(view.changed().await, None);
    }

    #[tokio::test]
    async fn stream_starts_with_current_value() {
        let (tx, rx) = watch::channel(1);
        let view = DerivedView::new(rx, |n: &i32| n * 10);
        let mut values = Box::pin(view.into_stream());

        assert_eq!(values.next().await, Some(10));
        tx.send_replace(2);
        assert_eq!(values.next().await, Some(20));
        drop(tx);
        assert_eq!(values.next().await, None);
    }
}
