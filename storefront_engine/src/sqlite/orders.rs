use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{CustomerInfo, Order, OrderItem, OrderStatusType, ResolvedCartLine, UserId},
    pricing::CartTotals,
};

/// Inserts a new order shell with its computed totals. This is not atomic on its own; the checkout flow embeds
/// it in a transaction together with the item snapshots and the cart clearing.
pub async fn insert_order(
    user_id: &UserId,
    customer: &CustomerInfo,
    totals: &CartTotals,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                user_id,
                name, email, phone,
                address1, address2, city, state, zip, country,
                subtotal, tax, total
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *;
        "#,
    )
    .bind(user_id.as_str())
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(&customer.phone)
    .bind(&customer.address1)
    .bind(&customer.address2)
    .bind(&customer.city)
    .bind(&customer.state)
    .bind(&customer.zip)
    .bind(&customer.country)
    .bind(totals.subtotal.cents())
    .bind(totals.tax.cents())
    .bind(totals.total.cents())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order #{} inserted for user {user_id}", order.id);
    Ok(order)
}

/// Freezes one resolved cart line into an order item. The copied title/price/discount/image are never touched
/// again, whatever happens to the product afterwards.
pub async fn insert_order_item(
    order_id: i64,
    line: &ResolvedCartLine,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, product_id, title, price, discount, image, quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(line.product.id)
    .bind(&line.product.title)
    .bind(line.product.price.cents())
    .bind(line.product.discount)
    .bind(&line.product.image)
    .bind(line.quantity)
    .fetch_one(conn)
    .await
}

pub async fn order_by_id(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await
}

pub async fn items_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id").bind(order_id).fetch_all(conn).await
}

/// All orders for a user, newest first.
pub async fn orders_for_user(user_id: &UserId, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(user_id.as_str())
        .fetch_all(conn)
        .await
}

/// Every order in the store, newest first.
pub async fn all_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC, id DESC").fetch_all(conn).await
}

/// Writes the new status. A transition into `delivered` stamps `delivered_at` in the same statement; re-setting
/// `delivered` re-stamps it.
pub async fn update_status(
    order_id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let query = if status == OrderStatusType::Delivered {
        r#"
            UPDATE orders
            SET status = $1, delivered_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING *;
        "#
    } else {
        r#"
            UPDATE orders
            SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING *;
        "#
    };
    sqlx::query_as(query).bind(status.to_string()).bind(order_id).fetch_optional(conn).await
}
