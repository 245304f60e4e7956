/// JWT Claims structure
///
/// Payload shared by both token kinds. The `sub` claim carries the token's
/// purpose (`accessApi` or `refreshToken`) and verification pins it, so a
/// refresh token can never pass as an access token even if the signing
/// secrets were ever configured equal. `userId` is camelCase on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `sub` value for access tokens.
pub const ACCESS_TOKEN_SUBJECT: &str = "accessApi";
/// `sub` value for refresh tokens.
pub const REFRESH_TOKEN_SUBJECT: &str = "refreshToken";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Token purpose (subject claim).
    pub sub: String,
    /// Owning user's id as a UUID string.
    pub user_id: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Unique token id. Timestamps have second granularity, so without this
    /// two logins in the same second would mint byte-identical tokens and
    /// collide in the refresh ledger.
    pub jti: String,
}

impl Claims {
    fn new(subject: &str, user_id: Uuid, expiry_secs: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: subject.to_string(),
            user_id: user_id.to_string(),
            iat: now,
            exp: now + expiry_secs,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Claims for a short-lived access token.
    pub fn access(user_id: Uuid, expiry_secs: i64) -> Self {
        Self::new(ACCESS_TOKEN_SUBJECT, user_id, expiry_secs)
    }

    /// Claims for a long-lived refresh token.
    pub fn refresh(user_id: Uuid, expiry_secs: i64) -> Self {
        Self::new(REFRESH_TOKEN_SUBJECT, user_id, expiry_secs)
    }

    /// Parse the owning user's id.
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.user_id)
    }
}
