//! Access control list middleware for the storefront server.
//! This middleware can be placed on any route or service.
//!
//! It checks the [`UserClaims`] that the auth-token middleware placed into the request extensions against the
//! required roles for the route. A request without claims has no token and is turned away with 401; a request
//! whose claims lack a required role gets 403.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorForbidden, ErrorUnauthorized},
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use storefront_engine::db_types::Role;

use crate::auth::UserClaims;

pub struct AclMiddlewareFactory {
    required_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AclMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: self.required_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let claims = req.extensions().get::<UserClaims>().cloned().ok_or_else(|| {
                log::debug!("🔐️ Denying unauthenticated request to a role-guarded route");
                ErrorUnauthorized("No access token supplied.")
            })?;
            if required_roles.iter().all(|role| claims.has_role(*role)) {
                service.call(req).await
            } else {
                Err(ErrorForbidden("Insufficient permissions."))
            }
        })
    }
}
