use std::fmt::Debug;

use log::*;

use crate::{
    api::cart_objects::CartView,
    db_types::UserId,
    pricing,
    pricing::TaxRate,
    traits::{CartApiError, CartManagement, CatalogApiError, CatalogManagement},
};

/// `CartApi` is the single entry point for everything that touches a user's cart.
///
/// Every operation, read or write, answers with the same [`CartView`] built by one shared constructor, so the
/// `{items, subtotal, tax, total}` shape cannot drift between endpoints.
pub struct CartApi<B> {
    db: B,
    tax_rate: TaxRate,
}

impl<B> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi")
    }
}

impl<B> CartApi<B>
where B: CartManagement + CatalogManagement
{
    pub fn new(db: B, tax_rate: TaxRate) -> Self {
        Self { db, tax_rate }
    }

    /// The user's cart, created lazily on first access.
    pub async fn view(&self, user_id: &UserId) -> Result<CartView, CartApiError> {
        let cart = self.db.fetch_or_create_cart(user_id).await?;
        self.view_of(cart.id).await
    }

    /// Adds the product to the cart, merging quantity into an existing line if there is one.
    ///
    /// A missing or zero quantity defaults to 1; negative quantities are rejected. The product must exist in
    /// the catalog.
    pub async fn add_item(&self, user_id: &UserId, product_id: i64, quantity: Option<i64>) -> Result<CartView, CartApiError> {
        let quantity = match quantity {
            None | Some(0) => 1,
            Some(q) if q < 0 => return Err(CartApiError::InvalidQuantity(q)),
            Some(q) => q,
        };
        self.db.fetch_product(product_id).await.map_err(cart_error)?.ok_or(CartApiError::ProductNotFound)?;
        let cart = self.db.fetch_or_create_cart(user_id).await?;
        self.db.upsert_line(cart.id, product_id, quantity).await?;
        trace!("🛒️ Added {quantity} x product {product_id} to cart #{} for {user_id}", cart.id);
        self.view_of(cart.id).await
    }

    /// Replaces the quantity of an existing line. A quantity of zero or less removes the line entirely.
    /// Fails if the user has no cart or the cart has no line for the product.
    pub async fn update_item(&self, user_id: &UserId, product_id: i64, quantity: i64) -> Result<CartView, CartApiError> {
        let cart = self.db.fetch_cart(user_id).await?.ok_or(CartApiError::CartNotFound)?;
        let found = if quantity <= 0 {
            self.db.remove_line(cart.id, product_id).await? > 0
        } else {
            self.db.set_line_quantity(cart.id, product_id, quantity).await?
        };
        if !found {
            return Err(CartApiError::LineNotFound);
        }
        self.view_of(cart.id).await
    }

    /// Removes the line for the product. Removing an absent line is not an error; a missing cart is.
    pub async fn remove_item(&self, user_id: &UserId, product_id: i64) -> Result<CartView, CartApiError> {
        let cart = self.db.fetch_cart(user_id).await?.ok_or(CartApiError::CartNotFound)?;
        let removed = self.db.remove_line(cart.id, product_id).await?;
        trace!("🛒️ Removed {removed} line(s) for product {product_id} from cart #{}", cart.id);
        self.view_of(cart.id).await
    }

    /// Empties the cart's line collection. The cart itself stays around for reuse.
    pub async fn clear(&self, user_id: &UserId) -> Result<CartView, CartApiError> {
        let cart = self.db.fetch_cart(user_id).await?.ok_or(CartApiError::CartNotFound)?;
        self.db.clear_lines(cart.id).await?;
        debug!("🛒️ Cleared cart #{} for {user_id}", cart.id);
        self.view_of(cart.id).await
    }

    /// The shared `CartView` constructor: resolve the lines against the live catalog, run the pricing engine
    /// over them, return both.
    async fn view_of(&self, cart_id: i64) -> Result<CartView, CartApiError> {
        let items = self.db.fetch_resolved_lines(cart_id).await?;
        let totals =
            pricing::cart_totals(items.iter().map(|l| (l.product.price, l.product.discount, l.quantity)), self.tax_rate);
        Ok(CartView::new(items, totals))
    }
}

fn cart_error(e: CatalogApiError) -> CartApiError {
    match e {
        CatalogApiError::ProductNotFound => CartApiError::ProductNotFound,
        other => CartApiError::DatabaseError(other.to_string()),
    }
}
