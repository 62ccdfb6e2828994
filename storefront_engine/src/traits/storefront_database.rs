use thiserror::Error;

use crate::{
    db_types::{CustomerInfo, Order, OrderItem, UserId},
    pricing::TaxRate,
    traits::{CartManagement, CatalogManagement, OrderManagement},
};

#[derive(Debug, Clone, Error)]
pub enum CheckoutApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Cart is empty")]
    EmptyCart,
}

impl From<sqlx::Error> for CheckoutApiError {
    fn from(e: sqlx::Error) -> Self {
        CheckoutApiError::DatabaseError(e.to_string())
    }
}

/// This trait defines the highest level of behaviour for backends supporting the storefront engine.
///
/// Most of the surface is inherited from the per-concern traits; what this trait adds is the checkout
/// transaction, the one place in the system where two aggregates (cart and order) change together and the
/// storage layer must guarantee all-or-nothing semantics.
#[allow(async_fn_in_trait)]
pub trait StorefrontDatabase: Clone + CatalogManagement + CartManagement + OrderManagement {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Converts the user's cart into an order, in a single atomic transaction:
    ///
    /// 1. Resolve the cart lines against the live catalog.
    /// 2. Refuse with [`CheckoutApiError::EmptyCart`] if there is no cart or no lines.
    /// 3. Snapshot each resolved line into an order item (title, price, discount, image, quantity).
    /// 4. Compute subtotal/tax/total with the pricing engine over the same resolved lines.
    /// 5. Insert the order and its items; status starts as `pending`.
    /// 6. If `decrement_stock` is set, reduce each product's stock by the purchased quantity (floored at zero).
    /// 7. Clear the cart lines.
    ///
    /// If anything fails the transaction rolls back and the cart is untouched. The cart record itself always
    /// survives; only its lines are consumed.
    async fn place_order(
        &self,
        user_id: &UserId,
        customer: CustomerInfo,
        tax_rate: TaxRate,
        decrement_stock: bool,
    ) -> Result<(Order, Vec<OrderItem>), CheckoutApiError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), CheckoutApiError> {
        Ok(())
    }
}
