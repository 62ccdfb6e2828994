use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use storefront_engine::traits::{CartApiError, CatalogApiError, CheckoutApiError, OrderApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    NoRecordFound(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token supplied.")]
    MissingToken,
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Access token signature is invalid. {0}")]
    ValidationError(String),
    #[error("Access token has expired.")]
    TokenExpired,
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl From<CartApiError> for ServerError {
    fn from(e: CartApiError) -> Self {
        match e {
            CartApiError::ProductNotFound | CartApiError::CartNotFound | CartApiError::LineNotFound => {
                Self::NoRecordFound(e.to_string())
            },
            CartApiError::InvalidQuantity(_) => Self::InvalidRequest(e.to_string()),
            CartApiError::DatabaseError(msg) => Self::BackendError(format!("Database error: {msg}")),
        }
    }
}

impl From<CheckoutApiError> for ServerError {
    fn from(e: CheckoutApiError) -> Self {
        match e {
            CheckoutApiError::EmptyCart => Self::InvalidRequest(e.to_string()),
            CheckoutApiError::DatabaseError(msg) => Self::BackendError(format!("Database error: {msg}")),
        }
    }
}

impl From<OrderApiError> for ServerError {
    fn from(e: OrderApiError) -> Self {
        match e {
            OrderApiError::OrderNotFound => Self::NoRecordFound(e.to_string()),
            OrderApiError::InvalidTransition { .. } => Self::InvalidRequest(e.to_string()),
            OrderApiError::DatabaseError(msg) => Self::BackendError(format!("Database error: {msg}")),
        }
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::ProductNotFound => Self::NoRecordFound(e.to_string()),
            CatalogApiError::ValidationError(_) => Self::InvalidRequest(e.to_string()),
            CatalogApiError::DatabaseError(msg) => Self::BackendError(format!("Database error: {msg}")),
        }
    }
}
