/// User Routes

use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AuthError, TokenKind};
use crate::middleware::AuthenticatedUser;
use crate::store::UserStore;

#[derive(Serialize)]
pub struct CurrentUserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// POST /api/users/current
///
/// Returns the authenticated user's profile. A valid token for a user that
/// no longer exists is rejected like any other bad token.
pub async fn current_user(
    req: HttpRequest,
    users: web::Data<UserStore>,
) -> Result<HttpResponse, AppError> {
    let principal = req
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or(AuthError::MissingToken(TokenKind::Access))?;

    let user = users
        .find_by_id(principal.user_id)?
        .ok_or(AuthError::TokenInvalid(TokenKind::Access))?;

    Ok(HttpResponse::Ok().json(CurrentUserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
    }))
}
