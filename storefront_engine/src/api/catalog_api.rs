use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewProduct, Product, ProductUpdate},
    traits::{CatalogApiError, CatalogManagement},
};

/// `CatalogApi` fronts the product catalog: the public read path plus the administrative CRUD surface.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn products(&self) -> Result<Vec<Product>, CatalogApiError> {
        self.db.fetch_products().await
    }

    pub async fn product_by_id(&self, product_id: i64) -> Result<Option<Product>, CatalogApiError> {
        self.db.fetch_product(product_id).await
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        validate_new_product(&product)?;
        let product = self.db.create_product(product).await?;
        info!("🏷️ New product #{} \"{}\" added to the catalog", product.id, product.title);
        Ok(product)
    }

    pub async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Option<Product>, CatalogApiError> {
        validate_update(&update)?;
        self.db.update_product(product_id, update).await
    }

    pub async fn delete_product(&self, product_id: i64) -> Result<bool, CatalogApiError> {
        self.db.delete_product(product_id).await
    }
}

fn validate_new_product(product: &NewProduct) -> Result<(), CatalogApiError> {
    if product.title.trim().is_empty() {
        return Err(CatalogApiError::ValidationError("Please add a product title".into()));
    }
    if product.price.is_negative() {
        return Err(CatalogApiError::ValidationError("Price must not be negative".into()));
    }
    check_discount(product.discount)?;
    if product.stock < 0 {
        return Err(CatalogApiError::ValidationError("Stock must not be negative".into()));
    }
    Ok(())
}

fn validate_update(update: &ProductUpdate) -> Result<(), CatalogApiError> {
    if let Some(title) = &update.title {
        if title.trim().is_empty() {
            return Err(CatalogApiError::ValidationError("Please add a product title".into()));
        }
    }
    if update.price.is_some_and(|p| p.is_negative()) {
        return Err(CatalogApiError::ValidationError("Price must not be negative".into()));
    }
    if let Some(discount) = update.discount {
        check_discount(discount)?;
    }
    if update.stock.is_some_and(|s| s < 0) {
        return Err(CatalogApiError::ValidationError("Stock must not be negative".into()));
    }
    Ok(())
}

fn check_discount(discount: i64) -> Result<(), CatalogApiError> {
    if !(0..=100).contains(&discount) {
        return Err(CatalogApiError::ValidationError(format!("Discount must be between 0 and 100, got {discount}")));
    }
    Ok(())
}
