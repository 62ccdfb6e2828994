use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Cart, ResolvedCartLine, UserId};

pub async fn cart_for_user(user_id: &UserId, conn: &mut SqliteConnection) -> Result<Option<Cart>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM carts WHERE user_id = $1").bind(user_id.as_str()).fetch_optional(conn).await
}

/// Fetches the user's cart, creating an empty one if it does not exist yet.
///
/// The insert is an `ON CONFLICT DO NOTHING` upsert against the unique user id, so two concurrent first
/// accesses cannot create two carts.
pub async fn fetch_or_create_cart(user_id: &UserId, conn: &mut SqliteConnection) -> Result<Cart, sqlx::Error> {
    let inserted = sqlx::query("INSERT INTO carts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id.as_str())
        .execute(&mut *conn)
        .await?;
    if inserted.rows_affected() > 0 {
        debug!("🛒️ Created a new cart for user {user_id}");
    }
    sqlx::query_as("SELECT * FROM carts WHERE user_id = $1").bind(user_id.as_str()).fetch_one(conn).await
}

/// Fetches the cart's lines joined against the live catalog. Prices reflect the catalog as it is *now*, not as
/// it was when the line was added.
pub async fn resolved_lines(cart_id: i64, conn: &mut SqliteConnection) -> Result<Vec<ResolvedCartLine>, sqlx::Error> {
    sqlx::query_as(
        r#"
            SELECT p.*, l.quantity
            FROM cart_lines l
            INNER JOIN products p ON p.id = l.product_id
            WHERE l.cart_id = $1
            ORDER BY l.id;
        "#,
    )
    .bind(cart_id)
    .fetch_all(conn)
    .await
}

/// Adds `quantity` to the line for the product, creating the line if needed. A single atomic statement, so
/// concurrent adds for the same product merge instead of racing.
pub async fn upsert_line(
    cart_id: i64,
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO cart_lines (cart_id, product_id, quantity) VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = quantity + excluded.quantity;
        "#,
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity)
    .execute(conn)
    .await?;
    Ok(())
}

/// Replaces the quantity of an existing line. Returns `false` when the cart holds no line for the product.
pub async fn set_line_quantity(
    cart_id: i64,
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE cart_lines SET quantity = $3 WHERE cart_id = $1 AND product_id = $2")
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn remove_line(cart_id: i64, product_id: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1 AND product_id = $2")
        .bind(cart_id)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn clear_lines(cart_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1").bind(cart_id).execute(conn).await?;
    Ok(())
}
