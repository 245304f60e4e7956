/// Access Token Gate
///
/// Checks the raw `Authorization` header, consults the revocation ledger,
/// verifies the signature, and injects an `AuthenticatedUser` into request
/// extensions for downstream handlers. The ledger is consulted before the
/// signature so a revoked token keeps answering "revoked" even after it
/// expires.
///
/// Must be applied to every route that requires authentication.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::TokenIssuer;
use crate::error::{AppError, AuthError, TokenKind};
use crate::store::RevocationLedger;

/// Identity attached to a request once its access token has been accepted.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    /// The exact token the request carried, kept for revocation on logout.
    pub token: String,
    pub expires_at: i64,
}

pub struct AuthGate {
    issuer: TokenIssuer,
    revoked: RevocationLedger,
}

impl AuthGate {
    pub fn new(issuer: TokenIssuer, revoked: RevocationLedger) -> Self {
        Self { issuer, revoked }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthGateService {
            service: Rc::new(service),
            issuer: self.issuer.clone(),
            revoked: self.revoked.clone(),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
    issuer: TokenIssuer,
    revoked: RevocationLedger,
}

/// The header value is the token itself; there is no `Bearer` prefix.
fn extract_token(req: &ServiceRequest) -> Result<String, AuthError> {
    let value = req
        .headers()
        .get("Authorization")
        .ok_or(AuthError::MissingToken(TokenKind::Access))?;
    let token = value
        .to_str()
        .map_err(|_| AuthError::TokenInvalid(TokenKind::Access))?;
    if token.is_empty() {
        return Err(AuthError::MissingToken(TokenKind::Access));
    }
    Ok(token.to_string())
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = match extract_token(&req) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(path = %req.path(), "{}", e);
                return Box::pin(async move { Err(AppError::from(e).into()) });
            }
        };

        // Ledger before signature: revoked wins over expired.
        match self.revoked.is_revoked(&token) {
            Ok(false) => {}
            Ok(true) => {
                tracing::warn!(path = %req.path(), "Rejected a revoked access token");
                return Box::pin(async move {
                    Err(AppError::from(AuthError::TokenRevoked).into())
                });
            }
            Err(e) => {
                return Box::pin(async move { Err(AppError::from(e).into()) });
            }
        }

        match self.issuer.verify_access(&token) {
            Ok(verified) => {
                req.extensions_mut().insert(AuthenticatedUser {
                    user_id: verified.user_id,
                    token,
                    expires_at: verified.expires_at,
                });

                tracing::debug!(user_id = %verified.user_id, "Access token accepted");

                let service = Rc::clone(&self.service);
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), "{}", e);
                Box::pin(async move { Err(AppError::from(e).into()) })
            }
        }
    }
}
