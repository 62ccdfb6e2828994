use thiserror::Error;

use crate::db_types::{NewProduct, Product, ProductUpdate};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product not found")]
    ProductNotFound,
    #[error("Invalid product data: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}

/// The `CatalogManagement` trait defines behaviour for reading and administering the product catalog.
///
/// The cart and checkout flows only consume the read path (`fetch_product`); the write path is the
/// administrative workflow for managing products.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Fetches the product with the given id. If no product exists, `None` is returned.
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogApiError>;

    /// Fetches the complete product list, newest first.
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError>;

    /// Inserts a new product and returns the stored record.
    async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogApiError>;

    /// Applies a partial update to the product. Returns the updated record, or `None` if the product does not
    /// exist. An empty update is a no-op that still returns the current record.
    async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Option<Product>, CatalogApiError>;

    /// Deletes the product. Returns `true` if a record was removed.
    async fn delete_product(&self, product_id: i64) -> Result<bool, CatalogApiError>;
}
