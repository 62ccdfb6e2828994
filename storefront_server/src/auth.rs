//! Access-token handling.
//!
//! Authentication itself (login, registration, credential storage) is an external collaborator. What this
//! module owns is the boundary: tokens are `base64(payload).base64(signature)` where the payload is the JSON
//! claims and the signature is an HMAC-SHA256 over the encoded payload, keyed with the server's auth secret.
//! The server trusts any claims carried by a validly signed, unexpired token; it performs no independent
//! verification of the identity inside.

use std::{
    future::{ready, Ready},
    time::Duration,
};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sfs_common::Secret;
use sha2::Sha256;
use storefront_engine::db_types::{Role, UserId};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

/// The header access tokens are carried in.
pub const ACCESS_TOKEN_HEADER: &str = "sfs_access_token";

type HmacSha256 = Hmac<Sha256>;

/// The claims carried by an access token: who the caller is and what they may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub user_id: UserId,
    pub roles: Vec<Role>,
    /// Expiry as a unix timestamp, in seconds.
    pub exp: i64,
}

impl UserClaims {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// Claims are placed into the request extensions by the auth middleware; handlers receive them through this
/// extractor. A route that requires a user but got no token answers 401 here.
impl FromRequest for UserClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<UserClaims>().cloned();
        ready(claims.ok_or(ServerError::AuthenticationError(AuthError::MissingToken)))
    }
}

fn calculate_hmac(secret: &str, data: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take a key of any size");
    mac.update(data);
    base64::encode_config(mac.finalize().into_bytes(), base64::URL_SAFE_NO_PAD)
}

/// Issues signed access tokens. Exposed for the external login service and for tests; the server itself only
/// ever verifies.
pub struct TokenIssuer {
    secret: Secret<String>,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { secret: config.hmac_secret.clone() }
    }

    /// Issue a new access token for the given identity and roles.
    /// This method DOES NOT verify that the identity is legitimate. That must happen before calling it.
    pub fn issue_token(&self, user_id: UserId, roles: Vec<Role>, duration: Option<Duration>) -> Result<String, AuthError> {
        let duration = duration.unwrap_or_else(|| Duration::from_secs(60 * 60 * 24));
        let exp = Utc::now().timestamp() + duration.as_secs() as i64;
        let claims = UserClaims { user_id, roles, exp };
        let payload = serde_json::to_vec(&claims).map_err(|e| AuthError::ValidationError(e.to_string()))?;
        let payload_b64 = base64::encode_config(&payload, base64::URL_SAFE_NO_PAD);
        let signature = calculate_hmac(self.secret.reveal(), payload_b64.as_bytes());
        Ok(format!("{payload_b64}.{signature}"))
    }
}

/// Verifies access tokens. One instance lives in the application data and is consulted by the auth middleware
/// on every request that carries a token.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: Secret<String>,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self { secret: config.hmac_secret.clone() }
    }

    pub fn validate(&self, token: &str) -> Result<UserClaims, AuthError> {
        let (payload_b64, signature) = token
            .split_once('.')
            .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected <payload>.<signature>".into()))?;
        let mut mac =
            HmacSha256::new_from_slice(self.secret.reveal().as_bytes()).expect("HMAC can take a key of any size");
        mac.update(payload_b64.as_bytes());
        let signature = base64::decode_config(signature, base64::URL_SAFE_NO_PAD)
            .map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        mac.verify_slice(&signature).map_err(|_| AuthError::ValidationError("Signature mismatch".into()))?;
        let payload = base64::decode_config(payload_b64, base64::URL_SAFE_NO_PAD)
            .map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        let claims: UserClaims =
            serde_json::from_slice(&payload).map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        if claims.exp < Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }
}
