use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use crate::{
    db_types::{Cart, CustomerInfo, NewProduct, Order, OrderItem, OrderStatusType, Product, ProductUpdate, ResolvedCartLine, UserId},
    pricing,
    pricing::TaxRate,
    sqlite::{carts, new_pool, orders, products},
    traits::{
        CartApiError,
        CartManagement,
        CatalogApiError,
        CatalogManagement,
        CheckoutApiError,
        OrderApiError,
        OrderManagement,
        StorefrontDatabase,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date using the embedded migration scripts.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::product_by_id(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = products::all_products(&mut conn).await?;
        Ok(result)
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, &mut conn).await?;
        Ok(product)
    }

    async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::update_product(product_id, update, &mut conn).await?;
        Ok(product)
    }

    async fn delete_product(&self, product_id: i64) -> Result<bool, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = products::delete_product(product_id, &mut conn).await?;
        if deleted {
            debug!("🗃️ Product {product_id} deleted");
        }
        Ok(deleted)
    }
}

impl CartManagement for SqliteDatabase {
    async fn fetch_cart(&self, user_id: &UserId) -> Result<Option<Cart>, CartApiError> {
        let mut conn = self.pool.acquire().await?;
        let cart = carts::cart_for_user(user_id, &mut conn).await?;
        Ok(cart)
    }

    async fn fetch_or_create_cart(&self, user_id: &UserId) -> Result<Cart, CartApiError> {
        let mut conn = self.pool.acquire().await?;
        let cart = carts::fetch_or_create_cart(user_id, &mut conn).await?;
        Ok(cart)
    }

    async fn fetch_resolved_lines(&self, cart_id: i64) -> Result<Vec<ResolvedCartLine>, CartApiError> {
        let mut conn = self.pool.acquire().await?;
        let lines = carts::resolved_lines(cart_id, &mut conn).await?;
        Ok(lines)
    }

    async fn upsert_line(&self, cart_id: i64, product_id: i64, quantity: i64) -> Result<(), CartApiError> {
        let mut conn = self.pool.acquire().await?;
        carts::upsert_line(cart_id, product_id, quantity, &mut conn).await?;
        Ok(())
    }

    async fn set_line_quantity(&self, cart_id: i64, product_id: i64, quantity: i64) -> Result<bool, CartApiError> {
        let mut conn = self.pool.acquire().await?;
        let updated = carts::set_line_quantity(cart_id, product_id, quantity, &mut conn).await?;
        Ok(updated)
    }

    async fn remove_line(&self, cart_id: i64, product_id: i64) -> Result<u64, CartApiError> {
        let mut conn = self.pool.acquire().await?;
        let removed = carts::remove_line(cart_id, product_id, &mut conn).await?;
        Ok(removed)
    }

    async fn clear_lines(&self, cart_id: i64) -> Result<(), CartApiError> {
        let mut conn = self.pool.acquire().await?;
        carts::clear_lines(cart_id, &mut conn).await?;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::items_for_order(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn fetch_orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::orders_for_user(user_id, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_all_orders(&self) -> Result<Vec<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::all_orders(&mut conn).await?;
        Ok(result)
    }

    async fn set_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_status(order_id, status, &mut conn).await?.ok_or(OrderApiError::OrderNotFound)?;
        debug!("🗃️ Order #{order_id} status set to {status}");
        Ok(order)
    }
}

impl StorefrontDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn place_order(
        &self,
        user_id: &UserId,
        customer: CustomerInfo,
        tax_rate: TaxRate,
        decrement_stock: bool,
    ) -> Result<(Order, Vec<OrderItem>), CheckoutApiError> {
        let mut tx = self.pool.begin().await?;
        let cart = carts::cart_for_user(user_id, &mut tx).await?.ok_or(CheckoutApiError::EmptyCart)?;
        let lines = carts::resolved_lines(cart.id, &mut tx).await?;
        if lines.is_empty() {
            return Err(CheckoutApiError::EmptyCart);
        }
        // The totals are computed from the very same resolved lines that get frozen into the order items, so
        // what is billed always matches what is recorded.
        let totals =
            pricing::cart_totals(lines.iter().map(|l| (l.product.price, l.product.discount, l.quantity)), tax_rate);
        let order = orders::insert_order(user_id, &customer, &totals, &mut tx).await?;
        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = orders::insert_order_item(order.id, line, &mut tx).await?;
            items.push(item);
        }
        if decrement_stock {
            for line in &lines {
                products::decrement_stock(line.product.id, line.quantity, &mut tx).await?;
            }
        }
        // Cart lines are consumed only inside the same transaction as the order insert. A failed checkout
        // leaves the cart exactly as it was.
        carts::clear_lines(cart.id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{} committed for user {user_id}: {} items, total {}", order.id, items.len(), order.total);
        Ok((order, items))
    }

    async fn close(&mut self) -> Result<(), CheckoutApiError> {
        self.pool.close().await;
        Ok(())
    }
}
