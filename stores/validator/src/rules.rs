//! Field rules and their messages.
//!
//! Each check returns the first failing rule's message, or `None`. An
//! empty value only ever fails the "required" rule.

/// Empty email
pub const EMAIL_REQUIRED: &str = "Email is required";
/// Email that is not a syntactically valid address
pub const EMAIL_INVALID: &str = "Please enter a valid email";
/// Empty password
pub const PASSWORD_REQUIRED: &str = "Password is required";
/// Empty confirmation
pub const CONFIRM_REQUIRED: &str = "Confirm password is required";
/// Confirmation that differs from the password
pub const PASSWORDS_MISMATCH: &str = "Passwords do not match";

const MAX_ADDRESS_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;
const MAX_LABEL_LEN: usize = 63;

/// Email rules: required, then well-formed
#[must_use]
pub fn email_error(value: &str) -> Option<String> {
    if value.is_empty() {
        return Some(EMAIL_REQUIRED.to_string());
    }
    if !is_valid_email(value) {
        return Some(EMAIL_INVALID.to_string());
    }
    None
}

/// Password rules: required, then at least `min_length` characters
#[must_use]
pub fn password_error(value: &str, min_length: usize) -> Option<String> {
    if value.is_empty() {
        return Some(PASSWORD_REQUIRED.to_string());
    }
    if value.chars().count() < min_length {
        return Some(format!("Password must be at least {min_length} characters"));
    }
    None
}

/// Confirmation rules: required, then equal to `password`
#[must_use]
pub fn confirm_password_error(password: &str, confirm: &str) -> Option<String> {
    if confirm.is_empty() {
        return Some(CONFIRM_REQUIRED.to_string());
    }
    if password != confirm {
        return Some(PASSWORDS_MISMATCH.to_string());
    }
    None
}

/// Address syntax accepted by HTML email inputs
///
/// ```
/// use form_validator::rules::is_valid_email;
///
/// assert!(is_valid_email("ada@example.com"));
/// assert!(is_valid_email("ada@localhost"));
/// assert!(!is_valid_email("ada@@example.com"));
/// ```
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    if !value.is_ascii() || value.len() > MAX_ADDRESS_LEN {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    local.len() <= MAX_LOCAL_LEN
        && !local.is_empty()
        && local.split('.').all(is_local_atom)
        && domain.split('.').all(is_domain_label)
}

fn is_local_atom(atom: &str) -> bool {
    !atom.is_empty()
        && atom
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+/=?^_`{|}~-".contains(&b))
}

fn is_domain_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_addresses() {
        for address in [
            "user@example.com",
            "first.last@sub.example.co",
            "o'brien+tag@example.org",
            "x@y",
            "a-b@my-host.example",
        ] {
            assert!(is_valid_email(address), "{address} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for address in [
            "plainaddress",
            "@example.com",
            "user@",
            "user@@example.com",
            "user@exa mple.com",
            ".user@example.com",
            "user.@example.com",
            "us..er@example.com",
            "user@-example.com",
            "user@example-.com",
            "user@example..com",
            "user@example.com.",
            "üser@example.com",
        ] {
            assert!(!is_valid_email(address), "{address} should be invalid");
        }
    }

    #[test]
    fn enforces_length_limits() {
        let local = "a".repeat(MAX_LOCAL_LEN);
        assert!(is_valid_email(&format!("{local}@example.com")));
        assert!(!is_valid_email(&format!("{local}a@example.com")));

        let label = "b".repeat(MAX_LABEL_LEN + 1);
        assert!(!is_valid_email(&format!("user@{label}.com")));

        let long_domain = vec!["c".repeat(60); 5].join(".");
        assert!(!is_valid_email(&format!("user@{long_domain}")));
    }

    #[test]
    fn empty_email_is_only_required() {
        assert_eq!(email_error("").as_deref(), Some(EMAIL_REQUIRED));
        assert_eq!(email_error("nope").as_deref(), Some(EMAIL_INVALID));
        assert_eq!(email_error("ok@example.com"), None);
    }

    #[test]
    fn password_message_states_configured_minimum() {
        assert_eq!(password_error("", 8).as_deref(), Some(PASSWORD_REQUIRED));
        assert_eq!(
            password_error("short", 8).as_deref(),
            Some("Password must be at least 8 characters")
        );
        assert_eq!(password_error("longenough", 8), None);
    }

    #[test]
    fn confirmation_must_match() {
        assert_eq!(confirm_password_error("secret", "").as_deref(), Some(CONFIRM_REQUIRED));
        assert_eq!(
            confirm_password_error("secret", "secreT").as_deref(),
            Some(PASSWORDS_MISMATCH)
        );
        assert_eq!(confirm_password_error("secret", "secret"), None);
    }
}
