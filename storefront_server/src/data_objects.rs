use std::fmt::Display;

use serde::{Deserialize, Serialize};
use storefront_engine::db_types::{CustomerInfo, OrderStatusType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: i64,
    /// Defaults to 1 when omitted (or zero).
    #[serde(default)]
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer: CustomerInfo,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatusType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}
