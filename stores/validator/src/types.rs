//! Core domain types for the form validator.

use reactive_stores_core::effect::EffectId;
use reactive_stores_core::join::JoinLatest;
use reactive_stores_macros::Action;
use serde::{Deserialize, Serialize};

/// One of the three validated form fields
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Account email
    Email,
    /// Chosen password
    Password,
    /// Password typed a second time
    ConfirmPassword,
}

impl Field {
    /// Every field, in error-slot order
    pub const ALL: [Self; 3] = [Self::Email, Self::Password, Self::ConfirmPassword];

    /// Slot of this field's error in [`ValidatorState::errors`]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Email => 0,
            Self::Password => 1,
            Self::ConfirmPassword => 2,
        }
    }

    /// Debounce scope of this field's evaluation
    #[must_use]
    pub const fn check_id(self) -> EffectId {
        match self {
            Self::Email => EffectId::new("validator.email_check"),
            Self::Password => EffectId::new("validator.password_check"),
            Self::ConfirmPassword => EffectId::new("validator.confirm_password_check"),
        }
    }

    /// Form control name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Value and interaction flag of one field
///
/// `touched` only goes from false to true, except when the form is reset
/// or accepted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    /// Current input
    pub value: String,
    /// Whether the user has left the field at least once
    pub touched: bool,
}

/// Latest published error of one field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field the message belongs to
    pub field: Field,
    /// Message, `None` when the field is valid or untouched
    pub message: Option<String>,
}

/// Result of a submit attempt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SubmitOutcome {
    /// The form was valid; these values were submitted and the form cleared
    Accepted {
        /// Submitted email
        email: String,
        /// Submitted password
        password: String,
    },
    /// The form was invalid; every field is now touched
    Rejected,
}

impl SubmitOutcome {
    /// Whether the submission went through
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Form snapshot
///
/// `errors` holds the latest *published* error per field. Values change
/// immediately; errors only after the debounce window, so the two can
/// disagree while the user is typing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidatorState {
    /// Email field
    pub email: FieldState,
    /// Password field
    pub password: FieldState,
    /// Confirm-password field
    pub confirm_password: FieldState,
    /// Latest published error per field
    pub errors: JoinLatest<Option<String>, 3>,
    /// Outcome of the latest submit
    pub last_submission: Option<SubmitOutcome>,
}

impl ValidatorState {
    /// Blank, untouched form with nothing published yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State of `field`
    #[must_use]
    pub const fn field(&self, field: Field) -> &FieldState {
        match field {
            Field::Email => &self.email,
            Field::Password => &self.password,
            Field::ConfirmPassword => &self.confirm_password,
        }
    }

    /// Mutable state of `field`
    pub fn field_mut(&mut self, field: Field) -> &mut FieldState {
        match field {
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
            Field::ConfirmPassword => &mut self.confirm_password,
        }
    }

    /// Latest published message for `field`
    ///
    /// `None` both before the first evaluation and when the field is valid.
    #[must_use]
    pub fn error(&self, field: Field) -> Option<String> {
        self.errors.get(field.index()).cloned().flatten()
    }

    /// Whether `field` has published at least once
    #[must_use]
    pub fn has_published(&self, field: Field) -> bool {
        self.errors.get(field.index()).is_some()
    }

    /// Overall validity from the published errors
    ///
    /// `None` until all three fields have published, then whether every
    /// latest error is `None`.
    #[must_use]
    pub fn is_form_valid(&self) -> Option<bool> {
        self.errors.all(Option::is_none)
    }

    /// Published errors of every field that has published
    #[must_use]
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        Field::ALL
            .into_iter()
            .filter(|field| self.has_published(*field))
            .map(|field| ValidationError {
                field,
                message: self.error(field),
            })
            .collect()
    }
}

/// Form validator actions
#[derive(Action, Clone, Debug, PartialEq)]
pub enum ValidatorAction {
    /// Evaluate the initial (blank) values once the first window elapses
    #[command]
    Initialize,

    /// The user edited a field
    #[command]
    SetValue {
        /// Edited field
        field: Field,
        /// New input
        value: String,
    },

    /// The user left a field
    #[command]
    Blur {
        /// Field that lost focus
        field: Field,
    },

    /// Touch every field, then accept or reject the form
    #[command]
    Submit,

    /// Blank, untouched form
    #[command]
    Reset,

    /// A field's debounce window elapsed
    #[event]
    Evaluate {
        /// Field to evaluate
        field: Field,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_is_valid_before_every_field_publishes() {
        let mut state = ValidatorState::new();
        assert_eq!(state.is_form_valid(), None);

        state.errors.set(Field::Email.index(), None);
        state.errors.set(Field::Password.index(), None);
        assert_eq!(state.is_form_valid(), None);

        state.errors.set(Field::ConfirmPassword.index(), None);
        assert_eq!(state.is_form_valid(), Some(true));
    }

    #[test]
    fn any_message_invalidates_the_form() {
        let mut state = ValidatorState::new();
        for field in Field::ALL {
            state.errors.set(field.index(), None);
        }
        state
            .errors
            .set(Field::Password.index(), Some("Password is required".to_string()));

        assert_eq!(state.is_form_valid(), Some(false));
        assert_eq!(state.error(Field::Password).as_deref(), Some("Password is required"));
        assert_eq!(state.error(Field::Email), None);
    }

    #[test]
    fn validation_errors_list_published_fields_only() {
        let mut state = ValidatorState::new();
        state.errors.set(Field::ConfirmPassword.index(), None);

        assert_eq!(
            state.validation_errors(),
            vec![ValidationError {
                field: Field::ConfirmPassword,
                message: None,
            }]
        );
    }

    #[test]
    fn field_names_match_form_controls() {
        let names: Vec<_> = Field::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["email", "password", "confirmPassword"]);
    }

    #[test]
    fn submit_outcome_is_tagged() {
        let accepted = SubmitOutcome::Accepted {
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
        };
        let json = serde_json::to_value(&accepted).unwrap_or_default();

        assert_eq!(json["outcome"], "accepted");
        assert_eq!(json["email"], "ada@example.com");
        assert!(accepted.is_accepted());
        assert!(!SubmitOutcome::Rejected.is_accepted());
    }

    #[test]
    fn check_scopes_are_distinct() {
        assert_ne!(Field::Email.check_id(), Field::Password.check_id());
        assert_ne!(Field::Password.check_id(), Field::ConfirmPassword.check_id());
    }
}
