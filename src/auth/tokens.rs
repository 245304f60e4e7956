/// Token Issuer
///
/// Creates and verifies the two token kinds. Access and refresh tokens are
/// signed with distinct secrets and distinct lifetimes; each issuance is a
/// single signing operation. Verification reports `TokenExpired` separately
/// from `TokenInvalid` (bad signature, malformed, wrong purpose) because
/// callers react differently to the two.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ACCESS_TOKEN_SUBJECT, REFRESH_TOKEN_SUBJECT};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, TokenKind};

/// Contents of a successfully verified token.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub user_id: Uuid,
    /// Expiration time (Unix timestamp), as claimed by the token itself.
    pub expires_at: i64,
}

/// Signs and verifies access/refresh tokens. Cheap to clone; key material
/// is derived once from the settings at startup.
#[derive(Clone)]
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_expiry_secs: i64,
    refresh_expiry_secs: i64,
}

impl TokenIssuer {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(settings.access_token_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(settings.access_token_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(settings.refresh_token_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(settings.refresh_token_secret.as_bytes()),
            access_expiry_secs: settings.access_token_expiry,
            refresh_expiry_secs: settings.refresh_token_expiry,
        }
    }

    /// Mint a signed access token for a user.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if signing fails.
    pub fn issue_access(&self, user_id: Uuid) -> Result<String, AppError> {
        let claims = Claims::access(user_id, self.access_expiry_secs);
        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| AppError::Internal(format!("Access token signing failed: {}", e)))
    }

    /// Mint a signed refresh token for a user.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if signing fails.
    pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, AppError> {
        let claims = Claims::refresh(user_id, self.refresh_expiry_secs);
        encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| AppError::Internal(format!("Refresh token signing failed: {}", e)))
    }

    /// Verify an access token's signature, expiry, and purpose.
    pub fn verify_access(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        verify(token, &self.access_decoding, ACCESS_TOKEN_SUBJECT, TokenKind::Access)
    }

    /// Verify a refresh token's signature, expiry, and purpose.
    pub fn verify_refresh(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        verify(token, &self.refresh_decoding, REFRESH_TOKEN_SUBJECT, TokenKind::Refresh)
    }
}

fn verify(
    token: &str,
    key: &DecodingKey,
    subject: &str,
    kind: TokenKind,
) -> Result<VerifiedToken, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.sub = Some(subject.to_string());

    let data = decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired(kind),
        _ => AuthError::TokenInvalid(kind),
    })?;

    // A token we signed always carries a well-formed id; anything else did
    // not come from this issuer.
    let user_id = data
        .claims
        .user_id()
        .map_err(|_| AuthError::TokenInvalid(kind))?;

    Ok(VerifiedToken {
        user_id,
        expires_at: data.claims.exp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> JwtSettings {
        JwtSettings {
            access_token_secret: "access-test-secret-0123456789abcdef".to_string(),
            refresh_token_secret: "refresh-test-secret-0123456789abcdef".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
        }
    }

    #[test]
    fn issues_and_verifies_an_access_token() {
        let issuer = TokenIssuer::new(&test_settings());
        let user_id = Uuid::new_v4();

        let token = issuer.issue_access(user_id).expect("signing failed");
        let verified = issuer.verify_access(&token).expect("verification failed");

        assert_eq!(verified.user_id, user_id);
        assert!(verified.expires_at > chrono::Utc::now().timestamp());
    }

    #[test]
    fn issues_and_verifies_a_refresh_token() {
        let issuer = TokenIssuer::new(&test_settings());
        let user_id = Uuid::new_v4();

        let token = issuer.issue_refresh(user_id).expect("signing failed");
        let verified = issuer.verify_refresh(&token).expect("verification failed");

        assert_eq!(verified.user_id, user_id);
    }

    #[test]
    fn rejects_a_tampered_signature() {
        let issuer = TokenIssuer::new(&test_settings());
        let token = issuer.issue_access(Uuid::new_v4()).unwrap();

        let tampered = format!("{}X", token);
        assert_eq!(
            issuer.verify_access(&tampered).unwrap_err(),
            AuthError::TokenInvalid(TokenKind::Access)
        );
    }

    #[test]
    fn rejects_garbage() {
        let issuer = TokenIssuer::new(&test_settings());
        assert_eq!(
            issuer.verify_access("not.a.token").unwrap_err(),
            AuthError::TokenInvalid(TokenKind::Access)
        );
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        // Distinct secrets already reject cross-use via the signature; the
        // purpose claim must reject it even with identical secrets.
        let mut settings = test_settings();
        settings.refresh_token_secret = settings.access_token_secret.clone();
        let issuer = TokenIssuer::new(&settings);

        let refresh = issuer.issue_refresh(Uuid::new_v4()).unwrap();
        assert_eq!(
            issuer.verify_access(&refresh).unwrap_err(),
            AuthError::TokenInvalid(TokenKind::Access)
        );

        let access = issuer.issue_access(Uuid::new_v4()).unwrap();
        assert_eq!(
            issuer.verify_refresh(&access).unwrap_err(),
            AuthError::TokenInvalid(TokenKind::Refresh)
        );
    }

    #[test]
    fn access_token_does_not_verify_under_the_refresh_secret() {
        let issuer = TokenIssuer::new(&test_settings());
        let access = issuer.issue_access(Uuid::new_v4()).unwrap();

        assert!(issuer.verify_refresh(&access).is_err());
    }

    #[test]
    fn expired_tokens_are_reported_as_expired() {
        let mut settings = test_settings();
        // Beyond the verifier's default leeway
        settings.access_token_expiry = -120;
        let issuer = TokenIssuer::new(&settings);

        let token = issuer.issue_access(Uuid::new_v4()).unwrap();
        assert_eq!(
            issuer.verify_access(&token).unwrap_err(),
            AuthError::TokenExpired(TokenKind::Access)
        );
    }
}
