mod acl;
mod auth_token;

pub use acl::{AclMiddlewareFactory, AclMiddlewareService};
pub use auth_token::{AuthTokenMiddlewareFactory, AuthTokenMiddlewareService};
