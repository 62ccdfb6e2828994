use thiserror::Error;

use crate::db_types::{Order, OrderItem, OrderStatusType, UserId};

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order not found")]
    OrderNotFound,
    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatusType, to: OrderStatusType },
}

impl From<sqlx::Error> for OrderApiError {
    fn from(e: sqlx::Error) -> Self {
        OrderApiError::DatabaseError(e.to_string())
    }
}

/// The `OrderManagement` trait defines behaviour for querying orders and advancing their fulfilment status.
///
/// Orders are immutable after creation except for `status` and the `delivered_at` stamp; there is deliberately
/// no general update method.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Fetches the order with the given id, if it exists.
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderApiError>;

    /// Fetches the snapshot line items of the order.
    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderApiError>;

    /// Fetches all orders belonging to the user, newest first.
    async fn fetch_orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderApiError>;

    /// Fetches every order in the store, newest first.
    async fn fetch_all_orders(&self) -> Result<Vec<Order>, OrderApiError>;

    /// Writes the new status. When the new status is `delivered`, `delivered_at` is stamped with the current
    /// time as part of the same statement. Transition legality is the caller's concern (see the
    /// `strict_transitions` policy in the order flow API).
    async fn set_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, OrderApiError>;
}
