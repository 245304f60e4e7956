/// Role Gate
///
/// Looks up the authenticated user's current role and rejects the request
/// with 403 unless it is in the allowed set. Reads the principal the access
/// token gate injected, so it must be wrapped inside that gate.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::error::{AppError, AuthError, TokenKind};
use crate::middleware::AuthenticatedUser;
use crate::store::{Role, UserStore};

pub struct RequireRole {
    allowed: Vec<Role>,
    users: UserStore,
}

impl RequireRole {
    pub fn new(allowed: Vec<Role>, users: UserStore) -> Self {
        Self { allowed, users }
    }

    pub fn admins(users: UserStore) -> Self {
        Self::new(vec![Role::Admin], users)
    }

    pub fn moderators(users: UserStore) -> Self {
        Self::new(vec![Role::Admin, Role::Moderator], users)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequireRoleService {
            service: Rc::new(service),
            allowed: self.allowed.clone(),
            users: self.users.clone(),
        }))
    }
}

pub struct RequireRoleService<S> {
    service: Rc<S>,
    allowed: Vec<Role>,
    users: UserStore,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
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
        let principal = match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(principal) => principal,
            // Reachable only when this gate is mounted without the token gate.
            None => {
                return Box::pin(async {
                    Err(AppError::from(AuthError::MissingToken(TokenKind::Access)).into())
                });
            }
        };

        let user = match self.users.find_by_id(principal.user_id) {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::warn!(
                    user_id = %principal.user_id,
                    "Valid token for a user that no longer exists"
                );
                return Box::pin(async { Err(AppError::from(AuthError::Forbidden).into()) });
            }
            Err(e) => {
                return Box::pin(async move { Err(AppError::from(e).into()) });
            }
        };

        if !self.allowed.contains(&user.role) {
            tracing::warn!(user_id = %user.id, role = %user.role, path = %req.path(), "Role not allowed");
            return Box::pin(async { Err(AppError::from(AuthError::Forbidden).into()) });
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move { service.call(req).await })
    }
}
