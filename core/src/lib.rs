//! # Reactive Stores Core
//!
//! Core traits and types for building reactive widget stores.
//!
//! Every store in this workspace has the same shape:
//! **action stream → transformation/gating → reducer → published snapshot → derived views**.
//! This crate provides the pieces that shape is made of.
//!
//! ## Core Concepts
//!
//! - **State**: The snapshot a store owns exclusively
//! - **Action**: Every input to a reducer (consumer commands and effect feedback)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (timers, fetches, debounces, cancellation)
//! - **Environment**: Injected collaborators (`Clock`, `Fetch`)
//!
//! ## Example
//!
//! ```
//! use reactive_stores_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Declarative macros for building effects
pub mod effect_macros;

/// Fetch collaborator abstraction
pub mod fetch;

/// Join-latest-values accumulator
pub mod join;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They never suspend and never fail; anything asynchronous is described as an
/// [`Effect`](crate::effect::Effect) and executed by the runtime.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for store logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The snapshot this reducer folds actions into
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected collaborators this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for CartReducer {
    ///     type State = CartState;
    ///     type Action = CartAction;
    ///     type Environment = CartEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut CartState,
    ///         action: CartAction,
    ///         env: &CartEnvironment,
    ///     ) -> SmallVec<[Effect<CartAction>; 4]> {
    ///         match action {
    ///             CartAction::Clear => state.items.clear(),
    ///             _ => {}
    ///         }
    ///         SmallVec::new()
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Updates state in place
        /// 2. Returns effect descriptions to be executed
        ///
        /// Effects are started in the order they are returned.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution), composable, and cancellable through
/// [`EffectId`](crate::effect::EffectId) scopes.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Identifies a family of in-flight effects for cancellation and gating.
    ///
    /// Two scoped effects with the same id compete for the same slot in the
    /// runtime's in-flight registry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EffectId(&'static str);

    impl EffectId {
        /// Create an effect id from a static name
        #[must_use]
        pub const fn new(name: &'static str) -> Self {
            Self(name)
        }

        /// The name this id was created with
        #[must_use]
        pub const fn as_str(&self) -> &'static str {
            self.0
        }
    }

    impl std::fmt::Display for EffectId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    /// How a scoped effect treats an in-flight effect with the same id
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Concurrency {
        /// Abort the in-flight effect and run the new one (switch to latest)
        Replace,

        /// Drop the new effect while one is in flight (exhaust)
        Exhaust,
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (debounce windows, retries)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Recurring timer: dispatches `action` immediately, then every `period`
        ///
        /// Never completes on its own; wrap it in a [`Effect::Scoped`] so it can
        /// be cancelled.
        Interval {
            /// Time between ticks
            period: Duration,
            /// Action to dispatch on every tick
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Effect registered under an id in the runtime's in-flight registry
        Scoped {
            /// Registry slot this effect occupies while running
            id: EffectId,
            /// What happens when the slot is already occupied
            concurrency: Concurrency,
            /// The effect to run
            effect: Box<Effect<Action>>,
        },

        /// Abort the in-flight effect registered under this id
        Cancel(EffectId),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Interval { period, action } => f
                    .debug_struct("Effect::Interval")
                    .field("period", period)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Scoped {
                    id,
                    concurrency,
                    effect,
                } => f
                    .debug_struct("Effect::Scoped")
                    .field("id", id)
                    .field("concurrency", concurrency)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Register this effect under `id`, replacing whatever is in flight there
        #[must_use]
        pub fn replace_in_flight(self, id: EffectId) -> Effect<Action> {
            Effect::Scoped {
                id,
                concurrency: Concurrency::Replace,
                effect: Box::new(self),
            }
        }

        /// Register this effect under `id`, dropping it if `id` is already busy
        #[must_use]
        pub fn drop_while_busy(self, id: EffectId) -> Effect<Action> {
            Effect::Scoped {
                id,
                concurrency: Concurrency::Exhaust,
                effect: Box::new(self),
            }
        }

        /// Dispatch `action` once `window` has elapsed without another debounce on `id`
        #[must_use]
        pub fn debounce(id: EffectId, window: Duration, action: Action) -> Effect<Action> {
            Effect::Delay {
                duration: window,
                action: Box::new(action),
            }
            .replace_in_flight(id)
        }

        /// Whether this effect runs until it is cancelled
        #[must_use]
        pub fn is_long_lived(&self) -> bool {
            match self {
                Effect::Interval { .. } => true,
                Effect::Scoped { effect, .. } => effect.is_long_lived(),
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    effects.iter().any(Effect::is_long_lived)
                },
                _ => false,
            }
        }

        /// Short label used in logs and metrics
        #[must_use]
        pub const fn kind(&self) -> &'static str {
            match self {
                Effect::None => "none",
                Effect::Parallel(_) => "parallel",
                Effect::Sequential(_) => "sequential",
                Effect::Delay { .. } => "delay",
                Effect::Interval { .. } => "interval",
                Effect::Future(_) => "future",
                Effect::Scoped { .. } => "scoped",
                Effect::Cancel(_) => "cancel",
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter. The fetch collaborator lives in
/// [`fetch`](crate::fetch).
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts wall-clock time for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
        fn now(&self) -> DateTime<Utc> {
            (**self).now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::{Concurrency, Effect, EffectId};
    use std::time::Duration;

    const SEARCH: EffectId = EffectId::new("search");

    #[test]
    fn debounce_is_a_replacing_delay() {
        let effect = Effect::debounce(SEARCH, Duration::from_millis(300), 7_u8);

        match effect {
            Effect::Scoped {
                id,
                concurrency,
                effect,
            } => {
                assert_eq!(id, SEARCH);
                assert_eq!(concurrency, Concurrency::Replace);
                assert!(matches!(*effect, Effect::Delay { action, .. } if *action == 7));
            },
            other => unreachable!("expected scoped effect, got {other:?}"),
        }
    }

    #[test]
    fn interval_is_long_lived_even_when_nested() {
        let interval = Effect::Interval {
            period: Duration::from_secs(5),
            action: Box::new(()),
        };
        let nested = Effect::merge(vec![Effect::None, interval.replace_in_flight(SEARCH)]);

        assert!(nested.is_long_lived());
        assert!(!Effect::<()>::Cancel(SEARCH).is_long_lived());
    }

    #[test]
    fn effect_id_displays_its_name() {
        assert_eq!(SEARCH.to_string(), "search");
        assert_eq!(SEARCH.as_str(), "search");
    }
}
