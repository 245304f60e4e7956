mod admin;
mod auth;
mod health_check;
mod users;

pub use admin::{admin_area, moderator_area};
pub use auth::{login, logout, refresh_token, register};
pub use health_check::health_check;
pub use users::current_user;

use actix_web::Responder;

pub async fn index() -> impl Responder {
    "REST API Authentication and Authorization"
}
