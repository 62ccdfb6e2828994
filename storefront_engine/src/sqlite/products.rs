use log::debug;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::db_types::{NewProduct, Product, ProductUpdate};

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product: Product = sqlx::query_as(
        r#"
            INSERT INTO products (title, description, category, price, discount, image, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(product.title)
    .bind(product.description)
    .bind(product.category)
    .bind(product.price.cents())
    .bind(product.discount)
    .bind(product.image)
    .bind(product.stock)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Product \"{}\" inserted with id {}", product.title, product.id);
    Ok(product)
}

pub async fn product_by_id(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await
}

/// Fetches the full catalog, newest first.
pub async fn all_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products ORDER BY created_at DESC, id DESC").fetch_all(conn).await
}

/// Applies the set fields of `update` to the product. An empty update degenerates to a plain fetch.
pub async fn update_product(
    product_id: i64,
    update: ProductUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    if update.is_empty() {
        debug!("🗃️ No fields to update for product {product_id}. Update request skipped.");
        return product_by_id(product_id, conn).await;
    }
    let mut builder = QueryBuilder::new("UPDATE products SET updated_at = CURRENT_TIMESTAMP");
    if let Some(title) = update.title {
        builder.push(", title = ");
        builder.push_bind(title);
    }
    if let Some(description) = update.description {
        builder.push(", description = ");
        builder.push_bind(description);
    }
    if let Some(category) = update.category {
        builder.push(", category = ");
        builder.push_bind(category);
    }
    if let Some(price) = update.price {
        builder.push(", price = ");
        builder.push_bind(price.cents());
    }
    if let Some(discount) = update.discount {
        builder.push(", discount = ");
        builder.push_bind(discount);
    }
    if let Some(image) = update.image {
        builder.push(", image = ");
        builder.push_bind(image);
    }
    if let Some(stock) = update.stock {
        builder.push(", stock = ");
        builder.push_bind(stock);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(product_id);
    builder.push(" RETURNING *");
    builder.build_query_as::<Product>().fetch_optional(conn).await
}

pub async fn delete_product(product_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(product_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

/// Reduces the product's stock by the purchased quantity, flooring at zero. The order flow never refuses a
/// purchase for stock; this is bookkeeping, not reservation.
pub async fn decrement_stock(product_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE products SET stock = MAX(stock - $2, 0), updated_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(product_id)
        .bind(quantity)
        .execute(conn)
        .await?;
    Ok(())
}
