/// Role-Gated Routes
///
/// The interesting work happens in the middleware pipeline; by the time a
/// request reaches these handlers it is authenticated and authorized.

use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// GET /api/admin — requires the admin role.
pub async fn admin_area() -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse {
        message: "Only admins can access this route!",
    })
}

/// GET /api/moderator — requires the admin or moderator role.
pub async fn moderator_area() -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse {
        message: "Only admins and moderators can access this route!",
    })
}
