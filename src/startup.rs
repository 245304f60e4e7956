use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::TokenIssuer;
use crate::middleware::{AuthGate, RequestLogger, RequireRole};
use crate::routes::{
    admin_area, current_user, health_check, index, login, logout, moderator_area, refresh_token,
    register,
};
use crate::store::Stores;

pub fn run(
    listener: TcpListener,
    stores: Stores,
    issuer: TokenIssuer,
) -> Result<Server, std::io::Error> {
    let users = web::Data::new(stores.users.clone());
    let refresh_tokens = web::Data::new(stores.refresh_tokens.clone());
    let revoked_tokens = web::Data::new(stores.revoked_tokens.clone());
    let issuer_data = web::Data::new(issuer.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            // Shared state
            .app_data(users.clone())
            .app_data(refresh_tokens.clone())
            .app_data(revoked_tokens.clone())
            .app_data(issuer_data.clone())
            // Public routes (no authentication required)
            .route("/", web::get().to(index))
            .route("/health_check", web::get().to(health_check))
            .route("/api/auth/register", web::post().to(register))
            .route("/api/auth/login", web::post().to(login))
            .route("/api/auth/refresh-token", web::post().to(refresh_token))
            // Protected routes (access token gate)
            .service(
                web::scope("/api/auth/logout")
                    .wrap(AuthGate::new(issuer.clone(), stores.revoked_tokens.clone()))
                    .route("", web::get().to(logout)),
            )
            .service(
                web::scope("/api/users")
                    .wrap(AuthGate::new(issuer.clone(), stores.revoked_tokens.clone()))
                    .route("/current", web::post().to(current_user)),
            )
            // Role-gated routes (gate runs first, then the role check)
            .service(
                web::scope("/api/admin")
                    .wrap(RequireRole::admins(stores.users.clone()))
                    .wrap(AuthGate::new(issuer.clone(), stores.revoked_tokens.clone()))
                    .route("", web::get().to(admin_area)),
            )
            .service(
                web::scope("/api/moderator")
                    .wrap(RequireRole::moderators(stores.users.clone()))
                    .wrap(AuthGate::new(issuer.clone(), stores.revoked_tokens.clone()))
                    .route("", web::get().to(moderator_area)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
