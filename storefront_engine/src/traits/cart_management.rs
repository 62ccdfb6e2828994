use thiserror::Error;

use crate::db_types::{Cart, ResolvedCartLine, UserId};

#[derive(Debug, Clone, Error)]
pub enum CartApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product not found")]
    ProductNotFound,
    #[error("Cart not found")]
    CartNotFound,
    #[error("Item not found in cart")]
    LineNotFound,
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),
}

impl From<sqlx::Error> for CartApiError {
    fn from(e: sqlx::Error) -> Self {
        CartApiError::DatabaseError(e.to_string())
    }
}

/// The `CartManagement` trait defines behaviour for the per-user shopping cart.
///
/// A user has at most one cart (unique on user id). The cart record itself is long-lived; the line collection
/// is what mutates. Implementations must make each mutation atomic at the storage layer so that concurrent
/// calls for the same user cannot interleave a read-modify-write (the additive `upsert_line` in particular).
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// Fetches the user's cart, if one exists.
    async fn fetch_cart(&self, user_id: &UserId) -> Result<Option<Cart>, CartApiError>;

    /// Fetches the user's cart, creating an empty one if absent.
    async fn fetch_or_create_cart(&self, user_id: &UserId) -> Result<Cart, CartApiError>;

    /// Fetches the cart's lines joined to the live catalog record of each product.
    async fn fetch_resolved_lines(&self, cart_id: i64) -> Result<Vec<ResolvedCartLine>, CartApiError>;

    /// Adds `quantity` of the product to the cart. If a line for the product already exists, the quantity is
    /// added to it; otherwise a new line is created. Single atomic upsert.
    async fn upsert_line(&self, cart_id: i64, product_id: i64, quantity: i64) -> Result<(), CartApiError>;

    /// Replaces the quantity of an existing line. Returns `false` if no line for the product exists.
    async fn set_line_quantity(&self, cart_id: i64, product_id: i64, quantity: i64) -> Result<bool, CartApiError>;

    /// Removes the line for the product. Returns the number of lines removed; removing an absent line is not
    /// an error.
    async fn remove_line(&self, cart_id: i64, product_id: i64) -> Result<u64, CartApiError>;

    /// Empties the cart's line collection. The cart record itself is kept.
    async fn clear_lines(&self, cart_id: i64) -> Result<(), CartApiError>;
}
