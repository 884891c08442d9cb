//! Form validator store.
//!
//! Validates an email/password/confirmation form as the user types. Each
//! field is evaluated once input settles for the debounce window; the
//! confirmation is re-evaluated whenever either password input changes.
//! Errors stay hidden until a field is touched. Overall validity joins the
//! latest error of every field.
//!
//! # Example Usage
//!
//! ```no_run
//! use form_validator::{Field, FormValidator, SubmitOutcome, ValidatorConfig};
//!
//! # async fn example() -> Result<(), reactive_stores_runtime::StoreError> {
//! let form = FormValidator::start(ValidatorConfig::default()).await?;
//! let mut email_error = form.email_error();
//!
//! form.set_email("not-an-email").await?;
//! form.blur(Field::Email).await?;
//! assert_eq!(
//!     email_error.changed().await.flatten().as_deref(),
//!     Some("Please enter a valid email")
//! );
//!
//! if let SubmitOutcome::Rejected = form.submit().await? {
//!     // every error is visible now
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod form;
pub mod reducer;
pub mod rules;
pub mod types;

// Re-export commonly used types
pub use config::ValidatorConfig;
pub use form::{FormValidator, ValidatorRuntime};
pub use reducer::{ValidatorEnvironment, ValidatorReducer};
pub use types::{Field, FieldState, SubmitOutcome, ValidationError, ValidatorAction, ValidatorState};
