use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::Duration;
use log::debug;
use sfs_common::Secret;
use storefront_engine::db_types::Role;

use crate::{
    auth::{TokenIssuer, TokenVerifier, ACCESS_TOKEN_HEADER},
    config::AuthConfig,
    middleware::AuthTokenMiddlewareFactory,
};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig { hmac_secret: Secret::new("endpoint-test-signing-secret".to_string()), token_expiry: Duration::hours(24) }
}

pub fn issue_token(user_id: &str, roles: Vec<Role>) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token(user_id.into(), roles, None).expect("Failed to sign token")
}

pub fn user_token(user_id: &str) -> String {
    issue_token(user_id, vec![Role::User])
}

pub fn admin_token() -> String {
    issue_token("admin-1", vec![Role::User, Role::Admin])
}

async fn send_request(
    mut req: TestRequest,
    auth_header: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    if !auth_header.is_empty() {
        req = req.insert_header((ACCESS_TOKEN_HEADER, auth_header));
    }
    let req = req.to_request();
    let verifier = TokenVerifier::new(&get_auth_config());
    let app = App::new().wrap(AuthTokenMiddlewareFactory::new()).app_data(web::Data::new(verifier)).configure(configure);

    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

pub async fn get_request(
    auth_header: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(TestRequest::get().uri(path), auth_header, configure).await
}

pub async fn post_request(
    auth_header: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(TestRequest::post().uri(path).set_json(&body), auth_header, configure).await
}

pub async fn put_request(
    auth_header: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(TestRequest::put().uri(path).set_json(&body), auth_header, configure).await
}

pub async fn delete_request(
    auth_header: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(TestRequest::delete().uri(path), auth_header, configure).await
}
