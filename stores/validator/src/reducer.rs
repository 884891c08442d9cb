//! Form validator reducer.
//!
//! Every field has its own debounce scope ([`Field::check_id`]). An edit
//! restarts the field's window; when it elapses the field is evaluated and
//! its error published. The confirmation depends on the password too, so a
//! password edit also restarts the confirmation's window: both inputs are
//! combined first, then debounced.
//!
//! Submit and reset publish every field immediately and abandon pending
//! windows.

use crate::config::ValidatorConfig;
use crate::rules;
use crate::types::{Field, FieldState, SubmitOutcome, ValidatorAction, ValidatorState};
use reactive_stores_core::effect::Effect;
use reactive_stores_core::reducer::Reducer;
use reactive_stores_core::{smallvec, SmallVec};

/// Environment for the validator containing dependencies
#[derive(Clone, Debug, Default)]
pub struct ValidatorEnvironment {
    /// Rule parameters and debounce window
    pub config: ValidatorConfig,
}

impl ValidatorEnvironment {
    /// Creates a new validator environment
    #[must_use]
    pub const fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }
}

/// Reducer implementing debounced, touch-gated field validation
#[derive(Clone, Debug, Default)]
pub struct ValidatorReducer;

impl ValidatorReducer {
    /// Creates a new validator reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// What `field`'s rules say about the current values, ignoring `touched`
    #[must_use]
    pub fn check(state: &ValidatorState, field: Field, config: &ValidatorConfig) -> Option<String> {
        match field {
            Field::Email => rules::email_error(&state.email.value),
            Field::Password => rules::password_error(&state.password.value, config.min_password_length),
            Field::ConfirmPassword => {
                rules::confirm_password_error(&state.password.value, &state.confirm_password.value)
            },
        }
    }

    /// Whether every rule passes for the current values
    #[must_use]
    pub fn is_valid_now(state: &ValidatorState, config: &ValidatorConfig) -> bool {
        Field::ALL
            .into_iter()
            .all(|field| Self::check(state, field, config).is_none())
    }

    /// Evaluate `field` and publish the result; untouched fields publish `None`
    fn publish(state: &mut ValidatorState, field: Field, config: &ValidatorConfig) {
        let error = if state.field(field).touched {
            Self::check(state, field, config)
        } else {
            None
        };
        tracing::trace!(%field, ?error, "Publishing field error");
        state.errors.set(field.index(), error);
    }

    fn schedule(field: Field, config: &ValidatorConfig) -> Effect<ValidatorAction> {
        Effect::debounce(field.check_id(), config.debounce, ValidatorAction::Evaluate { field })
    }

    /// Fields whose evaluation depends on `field`'s value
    fn dependents(field: Field) -> &'static [Field] {
        match field {
            Field::Email => &[Field::Email],
            Field::Password => &[Field::Password, Field::ConfirmPassword],
            Field::ConfirmPassword => &[Field::ConfirmPassword],
        }
    }

    /// Publish every field now and drop pending windows
    fn publish_all(state: &mut ValidatorState, config: &ValidatorConfig) -> SmallVec<[Effect<ValidatorAction>; 4]> {
        Field::ALL
            .into_iter()
            .map(|field| {
                Self::publish(state, field, config);
                Effect::Cancel(field.check_id())
            })
            .collect()
    }

    fn clear_fields(state: &mut ValidatorState) {
        for field in Field::ALL {
            *state.field_mut(field) = FieldState::default();
        }
    }

    fn submit(state: &mut ValidatorState, config: &ValidatorConfig) -> SmallVec<[Effect<ValidatorAction>; 4]> {
        for field in Field::ALL {
            state.field_mut(field).touched = true;
        }

        let outcome = if Self::is_valid_now(state, config) {
            let outcome = SubmitOutcome::Accepted {
                email: state.email.value.clone(),
                password: state.password.value.clone(),
            };
            tracing::info!(email = %state.email.value, "Form submitted");
            Self::clear_fields(state);
            outcome
        } else {
            tracing::info!("Form rejected");
            SubmitOutcome::Rejected
        };
        state.last_submission = Some(outcome);

        Self::publish_all(state, config)
    }
}

impl Reducer for ValidatorReducer {
    type State = ValidatorState;
    type Action = ValidatorAction;
    type Environment = ValidatorEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(action = action.name(), "Reducing validator action");
        let config = &env.config;

        match action {
            ValidatorAction::Initialize => Field::ALL
                .into_iter()
                .map(|field| Self::schedule(field, config))
                .collect(),

            ValidatorAction::SetValue { field, value } => {
                state.field_mut(field).value = value;
                Self::dependents(field)
                    .iter()
                    .map(|dependent| Self::schedule(*dependent, config))
                    .collect()
            },

            ValidatorAction::Blur { field } => {
                state.field_mut(field).touched = true;
                smallvec![Self::schedule(field, config)]
            },

            ValidatorAction::Submit => Self::submit(state, config),

            ValidatorAction::Reset => {
                Self::clear_fields(state);
                state.last_submission = None;
                Self::publish_all(state, config)
            },

            ValidatorAction::Evaluate { field } => {
                Self::publish(state, field, config);
                SmallVec::new()
            },
        }
    }
}
