//! Form validator facade.

use crate::config::ValidatorConfig;
use crate::reducer::{ValidatorEnvironment, ValidatorReducer};
use crate::types::{Field, FieldState, SubmitOutcome, ValidationError, ValidatorAction, ValidatorState};
use reactive_stores_runtime::view::DerivedView;
use reactive_stores_runtime::{Store, StoreError};

/// Runtime store type behind [`FormValidator`]
pub type ValidatorRuntime = Store<ValidatorState, ValidatorAction, ValidatorEnvironment, ValidatorReducer>;

/// Email/password/confirmation form with debounced validation
///
/// Error views stay `None` until their field has been touched (blurred or
/// submitted). `is_form_valid` is `None` until every field has published
/// once, which happens one debounce window after [`FormValidator::start`].
#[derive(Clone)]
pub struct FormValidator {
    store: ValidatorRuntime,
}

impl FormValidator {
    /// Creates a blank form and schedules evaluation of the initial values
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the initial evaluation cannot be scheduled.
    pub async fn start(config: ValidatorConfig) -> Result<Self, StoreError> {
        tracing::info!(
            min_password_length = config.min_password_length,
            debounce_ms = config.debounce.as_millis(),
            "Starting form validator"
        );
        let store = Store::new(
            ValidatorState::new(),
            ValidatorReducer::new(),
            ValidatorEnvironment::new(config),
        );
        store.send(ValidatorAction::Initialize).await?;
        Ok(Self { store })
    }

    /// Replace the input of `field`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the form is disposed.
    pub async fn set_value(&self, field: Field, value: impl Into<String>) -> Result<(), StoreError> {
        let value = value.into();
        self.store
            .send(ValidatorAction::SetValue { field, value })
            .await
            .map(drop)
    }

    /// Replace the email input
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the form is disposed.
    pub async fn set_email(&self, value: impl Into<String>) -> Result<(), StoreError> {
        self.set_value(Field::Email, value).await
    }

    /// Replace the password input
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the form is disposed.
    pub async fn set_password(&self, value: impl Into<String>) -> Result<(), StoreError> {
        self.set_value(Field::Password, value).await
    }

    /// Replace the confirmation input
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the form is disposed.
    pub async fn set_confirm_password(&self, value: impl Into<String>) -> Result<(), StoreError> {
        self.set_value(Field::ConfirmPassword, value).await
    }

    /// Mark `field` as touched; its error shows after the next window
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the form is disposed.
    pub async fn blur(&self, field: Field) -> Result<(), StoreError> {
        self.store.send(ValidatorAction::Blur { field }).await.map(drop)
    }

    /// Touch every field and submit if the current values pass every rule
    ///
    /// Validity is checked against the current values, not the debounced
    /// errors. An accepted submission clears the form.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the form is disposed.
    #[tracing::instrument(skip(self), name = "form_submit")]
    pub async fn submit(&self) -> Result<SubmitOutcome, StoreError> {
        let (_, outcome) = self
            .store
            .send_and_read(ValidatorAction::Submit, |state| state.last_submission.clone())
            .await?;
        Ok(outcome.unwrap_or(SubmitOutcome::Rejected))
    }

    /// Blank, untouched form
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the form is disposed.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.store.send(ValidatorAction::Reset).await.map(drop)
    }

    /// Published error of `field`
    #[must_use]
    pub fn error(&self, field: Field) -> DerivedView<ValidatorState, Option<String>> {
        self.store.view(move |state: &ValidatorState| state.error(field))
    }

    /// Published email error
    #[must_use]
    pub fn email_error(&self) -> DerivedView<ValidatorState, Option<String>> {
        self.error(Field::Email)
    }

    /// Published password error
    #[must_use]
    pub fn password_error(&self) -> DerivedView<ValidatorState, Option<String>> {
        self.error(Field::Password)
    }

    /// Published confirmation error
    #[must_use]
    pub fn confirm_password_error(&self) -> DerivedView<ValidatorState, Option<String>> {
        self.error(Field::ConfirmPassword)
    }

    /// `None` until every field has published, then whether none has an error
    #[must_use]
    pub fn is_form_valid(&self) -> DerivedView<ValidatorState, Option<bool>> {
        self.store.view(ValidatorState::is_form_valid)
    }

    /// Published errors of every field that has published
    #[must_use]
    pub fn validation_errors(&self) -> DerivedView<ValidatorState, Vec<ValidationError>> {
        self.store.view(ValidatorState::validation_errors)
    }

    /// Value and touched flag of `field`
    #[must_use]
    pub fn field(&self, field: Field) -> DerivedView<ValidatorState, FieldState> {
        self.store.view(move |state: &ValidatorState| state.field(field).clone())
    }

    /// The latest snapshot
    #[must_use]
    pub fn current_state(&self) -> ValidatorState {
        self.store.snapshot()
    }

    /// The underlying runtime store
    #[must_use]
    pub const fn store(&self) -> &ValidatorRuntime {
        &self.store
    }

    /// Abandon pending evaluations and stop accepting input
    pub fn dispose(&self) {
        tracing::info!("Disposing form validator");
        self.store.dispose();
    }
}

impl std::fmt::Debug for FormValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.store.snapshot();
        f.debug_struct("FormValidator")
            .field("email", &state.email.value)
            .field("touched", &Field::ALL.map(|field| state.field(field).touched))
            .field("is_form_valid", &state.is_form_valid())
            .finish()
    }
}
