//! Access-token middleware for the storefront server.
//!
//! Wrap the `/api` scope with this middleware. For every request it looks for the `sfs_access_token` header;
//! if one is present it must carry a validly signed, unexpired token, and the decoded [`UserClaims`] are placed
//! into the request extensions for the handlers (and the ACL middleware) to pick up. A request *without* a
//! token is passed through unauthenticated: public routes serve it, and any route that requires a user answers
//! 401 from its claims extractor instead.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorInternalServerError,
    web,
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::{debug, trace, warn};

use crate::{
    auth::{TokenVerifier, ACCESS_TOKEN_HEADER},
    errors::{AuthError, ServerError},
};

#[derive(Default)]
pub struct AuthTokenMiddlewareFactory;

impl AuthTokenMiddlewareFactory {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthTokenMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AuthTokenMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthTokenMiddlewareService { service: Rc::new(service) }))
    }
}

pub struct AuthTokenMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthTokenMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let Some(header) = req.headers().get(ACCESS_TOKEN_HEADER) else {
                trace!("🔐️ No access token on request. Continuing unauthenticated.");
                return service.call(req).await;
            };
            let verifier = req.app_data::<web::Data<TokenVerifier>>().cloned().ok_or_else(|| {
                warn!("🔐️ No token verifier found in application data. This is a server configuration bug.");
                ErrorInternalServerError("Token verifier is not configured")
            })?;
            let token = header.to_str().map_err(|e| {
                debug!("🔐️ Could not read access token header. {e}");
                ServerError::AuthenticationError(AuthError::PoorlyFormattedToken(e.to_string()))
            })?;
            let claims = verifier.validate(token).map_err(|e| {
                debug!("🔐️ Access token failed validation. {e}");
                ServerError::AuthenticationError(e)
            })?;
            trace!("🔐️ Access token validated for {}", claims.user_id);
            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}
