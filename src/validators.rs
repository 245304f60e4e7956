/// Input validators
///
/// Format and length checks for registration/login input. Presence of
/// required fields is the handlers' concern; these functions assume a
/// non-blank value and enforce shape:
/// - Email: RFC 5322 simplified format, length-capped
/// - Name: length-capped, no control characters
/// - Password: length-capped only (the API accepts short passwords; the
///   hash cost, not a strength policy, is the protection here)

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_NAME_LENGTH: usize = 256;
const MAX_PASSWORD_LENGTH: usize = 128;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validates an email address, returning the trimmed value on success.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    Ok(trimmed.to_string())
}

/// Validates a display name, returning the trimmed value on success.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("name", MAX_NAME_LENGTH));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidFormat("name"));
    }

    Ok(trimmed.to_string())
}

/// Validates a password. Not trimmed: whitespace is significant in
/// passwords. The cap guards the hashing path against oversized input.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password", MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_email_shapes() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("test.email@domain.co.uk").is_ok());
        assert!(validate_email("user+tag@example.com").is_ok());
        // Shortest shape the API contract exercises
        assert!(validate_email("a@x.com").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@@example.com").is_err());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(
            validate_email("  user@example.com  ").unwrap(),
            "user@example.com"
        );
        assert_eq!(validate_name("  Alice  ").unwrap(), "Alice");
    }

    #[test]
    fn rejects_overlong_email() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&too_long).is_err());
    }

    #[test]
    fn accepts_ordinary_names() {
        assert!(validate_name("John Doe").is_ok());
        assert!(validate_name("Jean-Pierre").is_ok());
        assert!(validate_name("O'Brien").is_ok());
    }

    #[test]
    fn rejects_control_characters_in_name() {
        assert!(validate_name("Name\0with\0null").is_err());
        assert!(validate_name("line\nbreak").is_err());
    }

    #[test]
    fn rejects_overlong_name() {
        assert!(validate_name(&"a".repeat(257)).is_err());
    }

    #[test]
    fn accepts_short_passwords() {
        // No strength policy: the contract registers users with "pw123".
        assert!(validate_password("pw123").is_ok());
    }

    #[test]
    fn rejects_oversized_password() {
        assert!(validate_password(&"a".repeat(129)).is_err());
    }
}
