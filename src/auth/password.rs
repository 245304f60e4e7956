/// Password Hashing and Verification
///
/// bcrypt with the library's default cost. Passwords are only ever stored
/// as their hash; verification returns a plain bool so callers can fold a
/// mismatch into the same error as an unknown email.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

/// Hash a password with a fresh salt.
///
/// # Errors
/// Returns `AppError::Internal` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored hash.
///
/// # Errors
/// Returns `AppError::Internal` if the stored hash is unparseable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("pw123").expect("hashing failed");

        assert_ne!(hash, "pw123");
        assert!(hash.starts_with("$2"));
        assert!(verify_password("pw123", &hash).unwrap());
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hash = hash_password("pw123").expect("hashing failed");
        assert!(!verify_password("pw124", &hash).unwrap());
    }

    #[test]
    fn salting_makes_hashes_differ() {
        let first = hash_password("pw123").unwrap();
        let second = hash_password("pw123").unwrap();
        assert_ne!(first, second);
    }
}
