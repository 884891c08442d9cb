//! # Reactive Stores Runtime
//!
//! Runtime for reactive widget stores.
//!
//! This crate provides the [`Store`] that owns a state snapshot, reduces
//! actions one at a time, executes the effects reducers describe, and
//! publishes every new snapshot to observers.
//!
//! ## Core Components
//!
//! - **Store**: Ordered reduction, effect execution, snapshot publishing
//! - **In-flight registry**: Scoped effects keyed by [`EffectId`] for
//!   switch-latest, exhaust and cancellation
//! - **Mailbox**: [`Store::dispatch`] for callers that cannot await
//! - **Views**: [`view::DerivedView`] projections and [`share::Shared`]
//!   reference-counted subscriptions
//!
//! ## Example
//!
//! ```ignore
//! use reactive_stores_runtime::Store;
//!
//! let store = Store::new(CartState::default(), CartReducer, ());
//!
//! // Send an action
//! store.send(CartAction::Clear).await?;
//!
//! // Read state
//! let total = store.state(|s| s.total_price()).await;
//!
//! // Observe snapshots
//! let mut snapshots = store.subscribe();
//! snapshots.changed().await?;
//! ```

use reactive_stores_core::effect::{Concurrency, Effect, EffectId};
use reactive_stores_core::reducer::Reducer;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Retry logic for fetch effects
pub mod retry;

/// Prometheus metrics for observability
pub mod metrics;

/// Projections of store snapshots
pub mod view;

/// Reference-counted subscriptions with connect/disconnect hooks
pub mod share;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// Fetch failures are never reported here: reducers turn them into
    /// state fields.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down or disposed and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for an action or for effects
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast or mailbox channel closed
        #[error("Action channel closed")]
        ChannelClosed,

        /// `dispatch` was called outside a Tokio runtime
        #[error("No Tokio runtime is available to drive the store")]
        RuntimeUnavailable,
    }
}

pub use error::StoreError;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects started by
/// that action, including the reduction of the actions they feed back.
/// Long-lived effects (intervals) are not tracked.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(FeedAction::LoadMore).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // The page has been fetched and reduced
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle and the tracking context effects carry
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    ///
    /// Returned when an action is discarded before reduction.
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of tracked effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all tracked effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all tracked effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires first.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements effect counter on drop
///
/// Runs when the effect finishes, panics, or is aborted.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Internal: scoped effects currently running, keyed by id
#[derive(Default)]
struct InFlight {
    next_ticket: u64,
    slots: HashMap<EffectId, Slot>,
}

/// Internal: one running scoped effect
///
/// The ticket distinguishes successive occupants of the same id.
struct Slot {
    ticket: u64,
    abort: AbortHandle,
}

/// Internal: where an action entering the reducer came from
#[derive(Debug, Clone, Copy)]
enum Origin {
    /// A caller of `send` or `dispatch`
    Consumer,
    /// Feedback from an unscoped effect
    Effect,
    /// Feedback from a scoped effect; dropped unless `ticket` still owns `id`
    Scope {
        id: EffectId,
        ticket: u64,
        /// Whether this is the final result and frees the slot
        settles: bool,
    },
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        AbortHandle, Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, Concurrency,
        DecrementGuard, Duration, Effect, EffectHandle, EffectId, EffectTracking, InFlight,
        Mutex, MutexGuard, Ordering, Origin, PoisonError, Reducer, RwLock, Slot, StoreError,
    };
    use crate::view::DerivedView;
    use std::future::Future;
    use std::pin::Pin;
    use tokio::sync::{broadcast, mpsc, watch};
    use tokio::time::MissedTickBehavior;

    /// Capacity of the feedback action broadcast
    const ACTION_BROADCAST_CAPACITY: usize = 64;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; every reduction holds the write lock)
    /// 2. Reducer (pure logic) and Environment (injected collaborators)
    /// 3. Effect execution, including the in-flight registry for scoped effects
    /// 4. Snapshot publishing (a `watch` channel replaying the latest state)
    ///
    /// Effects returned by the reducer are started before the write lock is
    /// released, so cancellation and switch-latest decisions are atomic with
    /// the reduction that requested them.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        snapshots: watch::Sender<S>,
        in_flight: Arc<Mutex<InFlight>>,
        shutdown: Arc<AtomicBool>,
        disposed: watch::Sender<bool>,
        pending_effects: Arc<AtomicUsize>,
        /// Actions produced by effects, for observers such as `send_and_wait_for`.
        action_broadcast: broadcast::Sender<A>,
        mailbox: Arc<Mutex<Option<mpsc::UnboundedSender<A>>>>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Clone + Send + std::fmt::Debug + 'static,
        S: Clone + Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The initial state is published immediately, so subscribers see it
        /// before the first action.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (snapshots, _) = watch::channel(initial_state.clone());
            let (disposed, _) = watch::channel(false);
            let (action_broadcast, _) = broadcast::channel(ACTION_BROADCAST_CAPACITY);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                snapshots,
                in_flight: Arc::new(Mutex::new(InFlight::default())),
                shutdown: Arc::new(AtomicBool::new(false)),
                disposed,
                pending_effects: Arc::new(AtomicUsize::new(0)),
                action_broadcast,
                mailbox: Arc::new(Mutex::new(None)),
            }
        }

        /// The injected environment
        #[must_use]
        pub fn environment(&self) -> &E {
            &self.environment
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer with (state, action, environment)
        /// 3. Publishes the new snapshot
        /// 4. Starts the returned effects, then releases the lock
        ///
        /// # Returns
        ///
        /// An [`EffectHandle`] that can be used to wait for effect completion.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down
        /// or disposed.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic propagates to the caller.
        /// Reducers are pure functions that do not panic.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            self.send_internal(action, Origin::Consumer).await
        }

        /// Build an action from the current state and reduce it in one step
        ///
        /// `build` runs under the same write lock as the reduction, so no
        /// other action can be reduced between reading the state and
        /// applying the action built from it. Returns `None` when `build`
        /// declines to produce an action.
        ///
        /// ```ignore
        /// store.send_from(|s| Some(Action::Set(s.count + 1))).await?;
        /// ```
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down
        /// or disposed.
        #[tracing::instrument(skip(self, build), name = "store_send_from")]
        pub async fn send_from<F>(&self, build: F) -> Result<Option<EffectHandle>, StoreError>
        where
            F: FnOnce(&S) -> Option<A>,
        {
            if self.is_closed_to(Origin::Consumer) {
                return Err(StoreError::ShutdownInProgress);
            }

            let mut state = self.state.write().await;
            if self.is_closed_to(Origin::Consumer) {
                return Err(StoreError::ShutdownInProgress);
            }

            Ok(build(&*state).map(|action| self.reduce_locked(&mut state, action, Origin::Consumer)))
        }

        /// Send an action and read the state it produced under the same lock
        ///
        /// `read` sees exactly the state this action's reduction left behind,
        /// before any other action can be reduced.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down
        /// or disposed.
        #[tracing::instrument(skip(self, action, read), name = "store_send_and_read")]
        pub async fn send_and_read<F, T>(&self, action: A, read: F) -> Result<(EffectHandle, T), StoreError>
        where
            F: FnOnce(&S) -> T,
        {
            if self.is_closed_to(Origin::Consumer) {
                return Err(StoreError::ShutdownInProgress);
            }

            let mut state = self.state.write().await;
            if self.is_closed_to(Origin::Consumer) {
                return Err(StoreError::ShutdownInProgress);
            }

            let handle = self.reduce_locked(&mut state, action, Origin::Consumer);
            Ok((handle, read(&*state)))
        }

        /// Queue an action without awaiting
        ///
        /// Actions dispatched from one thread are reduced in dispatch order.
        /// The mailbox task is spawned on the current Tokio runtime by the
        /// first call and lives until [`dispose`](Self::dispose).
        ///
        /// # Errors
        ///
        /// - [`StoreError::ShutdownInProgress`]: the store is shutting down
        /// - [`StoreError::RuntimeUnavailable`]: first call made outside a runtime
        /// - [`StoreError::ChannelClosed`]: the mailbox task has stopped
        pub fn dispatch(&self, action: A) -> Result<(), StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                return Err(StoreError::ShutdownInProgress);
            }

            let mut mailbox = self.mailbox.lock().unwrap_or_else(PoisonError::into_inner);
            if mailbox.is_none() {
                let runtime = tokio::runtime::Handle::try_current()
                    .map_err(|_| StoreError::RuntimeUnavailable)?;
                let (tx, mut rx) = mpsc::unbounded_channel::<A>();
                let store = self.clone();

                runtime.spawn(async move {
                    while let Some(action) = rx.recv().await {
                        if let Err(error) = store.send(action).await {
                            tracing::debug!(%error, "Mailbox action rejected");
                        }
                    }
                    tracing::trace!("Mailbox closed");
                });
                *mailbox = Some(tx);
            }

            match mailbox.as_ref() {
                Some(tx) => tx.send(action).map_err(|_| StoreError::ChannelClosed),
                None => Err(StoreError::ChannelClosed),
            }
        }

        /// Send an action and wait for a matching action produced by its effects
        ///
        /// Subscribes to the feedback broadcast before sending, so a result
        /// produced immediately is not missed. Matching actions are observed
        /// after they have been reduced.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: Timeout expired before a matching action
        /// - [`StoreError::ChannelClosed`]: The broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: Store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();
            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to actions produced by effects
        ///
        /// Consumer actions passed to `send`/`dispatch` are not broadcast.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.items.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// The most recently published snapshot
        #[must_use]
        pub fn snapshot(&self) -> S {
            self.snapshots.borrow().clone()
        }

        /// Subscribe to published snapshots
        ///
        /// The receiver starts at the latest snapshot and is notified after
        /// every reduction, including ones that leave the state unchanged.
        #[must_use]
        pub fn subscribe(&self) -> watch::Receiver<S> {
            self.snapshots.subscribe()
        }

        /// Project snapshots through `project`
        #[must_use]
        pub fn view<T, F>(&self, project: F) -> DerivedView<S, T>
        where
            F: Fn(&S) -> T + Send + Sync + 'static,
            T: Clone + PartialEq,
        {
            DerivedView::new(self.subscribe(), project)
        }

        /// Whether a scoped effect is registered under `id`
        #[must_use]
        pub fn is_in_flight(&self, id: EffectId) -> bool {
            self.registry().slots.contains_key(&id)
        }

        /// Abort the scoped effect registered under `id`
        ///
        /// Its pending result, if any, is never reduced.
        ///
        /// # Returns
        ///
        /// `true` if an effect was running
        pub fn cancel(&self, id: EffectId) -> bool {
            let slot = self.registry().slots.remove(&id);
            match slot {
                Some(slot) => {
                    slot.abort.abort();
                    metrics::counter!("store.effects.cancelled").increment(1);
                    tracing::debug!(effect_id = %id, "Cancelled in-flight effect");
                    true
                },
                None => false,
            }
        }

        /// Stop the store immediately
        ///
        /// Rejects further actions, aborts every scoped and unscoped effect
        /// (timers, delays, in-flight fetches) and closes the mailbox.
        /// Published snapshots remain readable. Calling it again is a no-op.
        pub fn dispose(&self) {
            self.shutdown.store(true, Ordering::Release);
            if self.disposed.send_replace(true) {
                return;
            }

            let slots: Vec<Slot> = self.registry().slots.drain().map(|(_, slot)| slot).collect();
            for slot in &slots {
                slot.abort.abort();
            }
            metrics::counter!("store.effects.cancelled").increment(slots.len() as u64);

            self.mailbox
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();

            tracing::debug!(aborted = slots.len(), "Store disposed");
        }

        /// Whether [`dispose`](Self::dispose) has run
        #[must_use]
        pub fn is_disposed(&self) -> bool {
            *self.disposed.borrow()
        }

        /// Initiate graceful shutdown of the store
        ///
        /// This method:
        /// 1. Sets the shutdown flag (rejecting new consumer actions)
        /// 2. Waits for tracked effects to complete and their results to be
        ///    reduced (with timeout)
        /// 3. Disposes the store, stopping timers and anything still running
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// tracked effects complete. The store is disposed either way.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            self.shutdown.store(true, Ordering::Release);

            let start = tokio::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            let result = loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    break Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending_effects = pending, "Shutdown timeout: {pending} effects still running");
                    break Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            };

            self.dispose();
            result
        }

        /// Internal send implementation
        ///
        /// Scoped feedback is reduced only while its ticket still owns the
        /// scope; a settling result frees the scope under the write lock.
        async fn send_internal(&self, action: A, origin: Origin) -> Result<EffectHandle, StoreError> {
            if self.is_closed_to(origin) {
                tracing::debug!(?action, "Rejected action: store is shutting down");
                return Err(StoreError::ShutdownInProgress);
            }

            let mut state = self.state.write().await;
            tracing::trace!("Acquired write lock on state");

            // Shutdown may have started while waiting for the lock
            if self.is_closed_to(origin) {
                return Err(StoreError::ShutdownInProgress);
            }

            Ok(self.reduce_locked(&mut state, action, origin))
        }

        /// Reduce `action` against state the caller holds the write lock on
        fn reduce_locked(&self, state: &mut S, action: A, origin: Origin) -> EffectHandle {
            if let Origin::Scope {
                id,
                ticket,
                settles,
            } = origin
            {
                if !self.settle(id, ticket, settles) {
                    tracing::debug!(effect_id = %id, ?action, "Discarding result of superseded effect");
                    metrics::counter!("store.effects.stale").increment(1);
                    return EffectHandle::completed();
                }
            }

            tracing::debug!(?action, ?origin, "Reducing action");
            metrics::counter!("store.actions.total").increment(1);

            let feedback = (!matches!(origin, Origin::Consumer)).then(|| action.clone());
            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            self.snapshots.send_replace(state.clone());

            for effect in effects {
                self.execute_effect(effect, &tracking);
            }

            if let Some(action) = feedback {
                // No observers is fine
                let _ = self.action_broadcast.send(action);
            }

            handle
        }

        /// Consumers are refused once shutdown starts; effect feedback only after disposal
        fn is_closed_to(&self, origin: Origin) -> bool {
            match origin {
                Origin::Consumer => self.shutdown.load(Ordering::Acquire),
                Origin::Effect | Origin::Scope { .. } => self.is_disposed(),
            }
        }

        /// Confirm `ticket` still owns `id`, releasing the slot if `settles`
        fn settle(&self, id: EffectId, ticket: u64, settles: bool) -> bool {
            let mut in_flight = self.registry();
            match in_flight.slots.get(&id) {
                Some(slot) if slot.ticket == ticket => {
                    if settles {
                        in_flight.slots.remove(&id);
                    }
                    true
                },
                _ => false,
            }
        }

        /// Release `id` if `ticket` still owns it
        fn release(&self, id: EffectId, ticket: u64) {
            let _ = self.settle(id, ticket, true);
        }

        fn registry(&self) -> MutexGuard<'_, InFlight> {
            self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Execute an effect returned by the reducer
        ///
        /// Called with the state write lock held; only spawns work.
        ///
        /// # Effect Types
        ///
        /// - `None`: No-op
        /// - `Future`/`Delay`: Spawned; the resulting action is fed back
        /// - `Parallel`: Each child executed independently
        /// - `Sequential`: One task running children in order
        /// - `Interval`: Untracked task ticking until disposal
        /// - `Scoped`: Registered in the in-flight registry
        /// - `Cancel`: Aborts a registered effect
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            metrics::counter!("store.effects.executed", "type" => effect.kind()).increment(1);

            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    let store = self.clone();
                    self.spawn_tracked(tracking, async move {
                        if let Some(action) = fut.await {
                            let _ = store.send_internal(action, Origin::Effect).await;
                        }
                    });
                },
                Effect::Delay { duration, action } => {
                    tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                    let store = self.clone();
                    self.spawn_tracked(tracking, async move {
                        tokio::time::sleep(duration).await;
                        let _ = store.send_internal(*action, Origin::Effect).await;
                    });
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    for effect in effects {
                        self.execute_effect(effect, tracking);
                    }
                },
                Effect::Sequential(effects) => {
                    tracing::trace!("Executing Effect::Sequential with {} effects", effects.len());
                    let long_lived = effects.iter().any(Effect::is_long_lived);
                    let store = self.clone();
                    let chain = async move {
                        for effect in effects {
                            store.run_inline(effect, Origin::Effect).await;
                        }
                    };
                    if long_lived {
                        self.spawn(chain);
                    } else {
                        self.spawn_tracked(tracking, chain);
                    }
                },
                interval @ Effect::Interval { .. } => {
                    tracing::trace!("Executing unscoped Effect::Interval");
                    let store = self.clone();
                    self.spawn(async move { store.run_inline(interval, Origin::Effect).await });
                },
                Effect::Scoped {
                    id,
                    concurrency,
                    effect,
                } => {
                    self.start_scoped(id, concurrency, *effect, Some(tracking));
                },
                Effect::Cancel(id) => {
                    self.cancel(id);
                },
            }
        }

        /// Register and start a scoped effect
        ///
        /// The registry lock is held from the spawn until the slot is
        /// inserted, so the task cannot observe its own scope as vacant.
        fn start_scoped(
            &self,
            id: EffectId,
            concurrency: Concurrency,
            effect: Effect<A>,
            tracking: Option<&EffectTracking>,
        ) {
            let mut in_flight = self.registry();

            if in_flight.slots.contains_key(&id) {
                match concurrency {
                    Concurrency::Exhaust => {
                        tracing::debug!(effect_id = %id, "Scope busy, dropping effect");
                        metrics::counter!("store.effects.dropped").increment(1);
                        return;
                    },
                    Concurrency::Replace => {
                        if let Some(previous) = in_flight.slots.remove(&id) {
                            previous.abort.abort();
                            tracing::debug!(effect_id = %id, "Replacing in-flight effect");
                            metrics::counter!("store.effects.cancelled").increment(1);
                        }
                    },
                }
            }

            in_flight.next_ticket += 1;
            let ticket = in_flight.next_ticket;
            let long_lived = effect.is_long_lived();
            tracing::trace!(effect_id = %id, ticket, long_lived, "Starting scoped effect");

            let store = self.clone();
            let task = async move { store.run_scoped(id, ticket, effect).await };
            let abort = match tracking {
                Some(tracking) if !long_lived => self.spawn_tracked(tracking, task),
                _ => self.spawn(task),
            };

            in_flight.slots.insert(id, Slot { ticket, abort });
        }

        /// Body of a scoped effect task
        async fn run_scoped(self, id: EffectId, ticket: u64, effect: Effect<A>) {
            let settle = Origin::Scope {
                id,
                ticket,
                settles: true,
            };

            match effect {
                Effect::Future(fut) => match fut.await {
                    Some(action) => {
                        let _ = self.send_internal(action, settle).await;
                    },
                    None => self.release(id, ticket),
                },
                Effect::Delay { duration, action } => {
                    tokio::time::sleep(duration).await;
                    let _ = self.send_internal(*action, settle).await;
                },
                other => {
                    let origin = Origin::Scope {
                        id,
                        ticket,
                        settles: false,
                    };
                    self.run_inline(other, origin).await;
                    self.release(id, ticket);
                },
            }
        }

        /// Run an effect to completion inside the current task
        fn run_inline(
            &self,
            effect: Effect<A>,
            origin: Origin,
        ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
            Box::pin(async move {
                match effect {
                    Effect::None => {},
                    Effect::Future(fut) => {
                        if let Some(action) = fut.await {
                            let _ = self.send_internal(action, origin).await;
                        }
                    },
                    Effect::Delay { duration, action } => {
                        tokio::time::sleep(duration).await;
                        let _ = self.send_internal(*action, origin).await;
                    },
                    Effect::Interval { period, action } => {
                        let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
                        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                        loop {
                            ticker.tick().await;
                            if self.send_internal((*action).clone(), origin).await.is_err() {
                                break;
                            }
                        }
                    },
                    Effect::Parallel(effects) => {
                        futures::future::join_all(
                            effects.into_iter().map(|effect| self.run_inline(effect, origin)),
                        )
                        .await;
                    },
                    Effect::Sequential(effects) => {
                        for effect in effects {
                            self.run_inline(effect, origin).await;
                        }
                    },
                    Effect::Scoped {
                        id,
                        concurrency,
                        effect,
                    } => self.start_scoped(id, concurrency, *effect, None),
                    Effect::Cancel(id) => {
                        self.cancel(id);
                    },
                }
            })
        }

        /// Spawn a task counted by `tracking` and by shutdown
        fn spawn_tracked<F>(&self, tracking: &EffectTracking, fut: F) -> AbortHandle
        where
            F: Future<Output = ()> + Send + 'static,
        {
            tracking.increment();
            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            let guards = (
                DecrementGuard(tracking.clone()),
                AtomicCounterGuard(Arc::clone(&self.pending_effects)),
            );

            self.spawn(async move {
                let _guards = guards;
                fut.await;
            })
        }

        /// Spawn a task that stops when the store is disposed
        fn spawn<F>(&self, fut: F) -> AbortHandle
        where
            F: Future<Output = ()> + Send + 'static,
        {
            let mut disposed = self.disposed.subscribe();
            tokio::spawn(async move {
                tokio::select! {
                    () = fut => {},
                    _ = disposed.wait_for(|disposed| *disposed) => {},
                }
            })
            .abort_handle()
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                snapshots: self.snapshots.clone(),
                in_flight: Arc::clone(&self.in_flight),
                shutdown: Arc::clone(&self.shutdown),
                disposed: self.disposed.clone(),
                pending_effects: Arc::clone(&self.pending_effects),
                action_broadcast: self.action_broadcast.clone(),
                mailbox: Arc::clone(&self.mailbox),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
