/// Authentication Routes
///
/// Registration, login, refresh-token rotation, and logout.

use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::TokenIssuer;
use crate::error::{AppError, AuthError, TokenKind, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::store::{RefreshTokenLedger, RevocationLedger, Role, User, UserStore};
use crate::validators::{validate_email, validate_name, validate_password};

/// User registration request. Fields are optional so absent JSON keys reach
/// the presence check and produce the 422 contract instead of a serde 400.
#[derive(Deserialize, Default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub id: Uuid,
}

/// User login request
#[derive(Deserialize, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Token rotation request
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}

/// POST /api/auth/register
///
/// # Errors
/// - 422: missing/malformed fields, unknown role
/// - 409: email already registered
/// - 500: store or hashing failure
pub async fn register(
    body: Option<web::Json<RegisterRequest>>,
    users: web::Data<UserStore>,
) -> Result<HttpResponse, AppError> {
    // An absent or undecodable body is just "all fields missing".
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    let (name, email, password) = match (
        present(&body.name),
        present(&body.email),
        present(&body.password),
    ) {
        (Some(name), Some(email), Some(password)) => (name, email, password),
        _ => {
            return Err(ValidationError::MissingFields("name, email, and password").into());
        }
    };

    let name = validate_name(name)?;
    let email = validate_email(email)?;
    validate_password(password)?;
    let role = match &body.role {
        Some(role) => role.parse::<Role>()?,
        None => Role::default(),
    };

    let user = User {
        id: Uuid::new_v4(),
        name,
        email,
        password_hash: hash_password(password)?,
        role,
    };
    users.create(&user)?;

    tracing::info!(user_id = %user.id, "User registered successfully");

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully",
        id: user.id,
    }))
}

/// POST /api/auth/login
///
/// Issues an access/refresh token pair and records the refresh token in the
/// ledger. An unknown email and a wrong password produce the identical 401
/// to prevent user enumeration.
pub async fn login(
    body: Option<web::Json<LoginRequest>>,
    users: web::Data<UserStore>,
    refresh_tokens: web::Data<RefreshTokenLedger>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, AppError> {
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    let (email, password) = match (present(&body.email), present(&body.password)) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            return Err(ValidationError::MissingFields("email and password").into());
        }
    };

    let user = users
        .find_by_email(email.trim())?
        .ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let access_token = issuer.issue_access(user.id)?;
    let refresh_token = issuer.issue_refresh(user.id)?;
    refresh_tokens.insert(&refresh_token, user.id)?;

    tracing::info!(user_id = %user.id, "User logged in successfully");

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        access_token,
        refresh_token,
    }))
}

/// POST /api/auth/refresh-token
///
/// Single-use rotation: the presented token is consumed and a fresh pair is
/// minted. A reused, forged, or expired token all produce the same 401 so
/// the response never reveals which check failed.
pub async fn refresh_token(
    body: Option<web::Json<RefreshRequest>>,
    refresh_tokens: web::Data<RefreshTokenLedger>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, AppError> {
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    let token = present(&body.refresh_token)
        .ok_or(AuthError::MissingToken(TokenKind::Refresh))?;

    let verified = issuer.verify_refresh(token)?;

    // `consume` is the linearization point: when two rotations race on the
    // same token value, at most one of them sees the record.
    let record = refresh_tokens
        .consume(token)?
        .filter(|record| record.user_id == verified.user_id)
        .ok_or(AuthError::TokenInvalid(TokenKind::Refresh))?;

    let access_token = issuer.issue_access(record.user_id)?;
    let new_refresh_token = issuer.issue_refresh(record.user_id)?;
    refresh_tokens.insert(&new_refresh_token, record.user_id)?;

    tracing::debug!(user_id = %record.user_id, "Refresh token rotated");

    Ok(HttpResponse::Ok().json(TokenPairResponse {
        access_token,
        refresh_token: new_refresh_token,
    }))
}

/// GET /api/auth/logout
///
/// Ends every outstanding refresh session for the user and revokes the
/// presented access token until its natural expiry. Requires the access
/// token gate.
pub async fn logout(
    req: HttpRequest,
    refresh_tokens: web::Data<RefreshTokenLedger>,
    revoked_tokens: web::Data<RevocationLedger>,
) -> Result<HttpResponse, AppError> {
    let principal = req
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or(AuthError::MissingToken(TokenKind::Access))?;

    refresh_tokens.remove_all_for_user(principal.user_id)?;
    revoked_tokens.revoke(&principal.token, principal.user_id, principal.expires_at)?;

    tracing::info!(user_id = %principal.user_id, "User logged out");

    Ok(HttpResponse::NoContent().finish())
}
