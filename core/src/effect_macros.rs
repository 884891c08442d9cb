//! Declarative macros for building effects in reducers.
//!
//! These keep reducer bodies short; each expands to a plain
//! [`Effect`](crate::effect::Effect) value.

/// Create an `Effect::Future` from an async block
///
/// The block must evaluate to `Option<Action>`.
///
/// # Example
///
/// ```rust,ignore
/// use reactive_stores_core::async_effect;
///
/// async_effect! {
///     let result = fetcher.fetch(&url).await;
///     Some(FeedAction::PageLoaded { page, result })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use reactive_stores_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_millis(300),
///     action: FormAction::Evaluate(Field::Email)
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Create an `Effect::Interval` that ticks immediately and then every `period`
///
/// # Example
///
/// ```rust,ignore
/// use reactive_stores_core::every;
/// use std::time::Duration;
///
/// every! {
///     period: Duration::from_secs(5),
///     action: DashboardAction::Tick
/// }
/// ```
#[macro_export]
macro_rules! every {
    (
        period: $period:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Interval {
            period: $period,
            action: ::std::boxed::Box::new($action),
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::Effect;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Loaded { value: i32 },
        Evaluate,
        Tick,
    }

    #[tokio::test]
    async fn async_effect_resolves_to_its_action() {
        let effect = async_effect! {
            Some(TestAction::Loaded { value: 42 })
        };

        match effect {
            Effect::Future(future) => {
                assert_eq!(future.await, Some(TestAction::Loaded { value: 42 }));
            },
            other => unreachable!("expected future effect, got {other:?}"),
        }
    }

    #[test]
    fn delay_keeps_duration_and_action() {
        let effect = delay! {
            duration: Duration::from_millis(300),
            action: TestAction::Evaluate
        };

        assert!(matches!(
            effect,
            Effect::Delay { duration, action }
                if duration == Duration::from_millis(300) && *action == TestAction::Evaluate
        ));
    }

    #[test]
    fn every_builds_an_interval() {
        let effect = every! {
            period: Duration::from_secs(5),
            action: TestAction::Tick
        };

        assert!(matches!(effect, Effect::Interval { .. }));
        assert!(effect.is_long_lived());
    }
}
