use chrono::{DateTime, TimeZone, Utc};
use mockall::mock;
use sfs_common::Money;
use storefront_engine::{
    db_types::{
        Cart,
        CustomerInfo,
        NewProduct,
        Order,
        OrderItem,
        OrderStatusType,
        Product,
        ProductUpdate,
        ResolvedCartLine,
        UserId,
    },
    pricing::TaxRate,
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

mock! {
    pub Storefront {}

    impl Clone for Storefront {
        fn clone(&self) -> Self;
    }

    impl CatalogManagement for Storefront {
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogApiError>;
        async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError>;
        async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogApiError>;
        async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Option<Product>, CatalogApiError>;
        async fn delete_product(&self, product_id: i64) -> Result<bool, CatalogApiError>;
    }

    impl CartManagement for Storefront {
        async fn fetch_cart(&self, user_id: &UserId) -> Result<Option<Cart>, CartApiError>;
        async fn fetch_or_create_cart(&self, user_id: &UserId) -> Result<Cart, CartApiError>;
        async fn fetch_resolved_lines(&self, cart_id: i64) -> Result<Vec<ResolvedCartLine>, CartApiError>;
        async fn upsert_line(&self, cart_id: i64, product_id: i64, quantity: i64) -> Result<(), CartApiError>;
        async fn set_line_quantity(&self, cart_id: i64, product_id: i64, quantity: i64) -> Result<bool, CartApiError>;
        async fn remove_line(&self, cart_id: i64, product_id: i64) -> Result<u64, CartApiError>;
        async fn clear_lines(&self, cart_id: i64) -> Result<(), CartApiError>;
    }

    impl OrderManagement for Storefront {
        async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderApiError>;
        async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderApiError>;
        async fn fetch_orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderApiError>;
        async fn fetch_all_orders(&self) -> Result<Vec<Order>, OrderApiError>;
        async fn set_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, OrderApiError>;
    }

    impl StorefrontDatabase for Storefront {
        fn url(&self) -> &str;
        async fn place_order(
            &self,
            user_id: &UserId,
            customer: CustomerInfo,
            tax_rate: TaxRate,
            decrement_stock: bool,
        ) -> Result<(Order, Vec<OrderItem>), CheckoutApiError>;
    }
}

// ----------------------------------------------  Fixtures  ----------------------------------------------------

pub fn ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap()
}

pub fn sample_product(id: i64, title: &str, price_cents: i64, discount: i64) -> Product {
    Product {
        id,
        title: title.to_string(),
        description: None,
        category: "office".to_string(),
        price: Money::from_cents(price_cents),
        discount,
        image: None,
        stock: 100,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub fn sample_cart() -> Cart {
    Cart { id: 1, user_id: UserId::from("user-alice"), created_at: ts(), updated_at: ts() }
}

/// The worked pricing scenario: 1000.00 at 10% off x2 plus 500.00 x1.
pub fn sample_lines() -> Vec<ResolvedCartLine> {
    vec![
        ResolvedCartLine { product: sample_product(1, "Walnut standing desk", 100_000, 10), quantity: 2 },
        ResolvedCartLine { product: sample_product(2, "Desk lamp", 50_000, 0), quantity: 1 },
    ]
}

pub fn sample_customer() -> CustomerInfo {
    CustomerInfo {
        name: "Alice Example".to_string(),
        email: "alice@example.com".to_string(),
        phone: "+1-555-0100".to_string(),
        address1: "1 Main Street".to_string(),
        address2: None,
        city: "Springfield".to_string(),
        state: Some("OR".to_string()),
        zip: "97477".to_string(),
        country: "US".to_string(),
    }
}

pub fn sample_order(user: &str, status: OrderStatusType) -> Order {
    Order {
        id: 1,
        user_id: UserId::from(user),
        customer: sample_customer(),
        subtotal: Money::from_cents(230_000),
        tax: Money::from_cents(23_000),
        total: Money::from_cents(253_000),
        status,
        paid_at: None,
        delivered_at: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub fn sample_items() -> Vec<OrderItem> {
    vec![
        OrderItem {
            id: 1,
            order_id: 1,
            product_id: 1,
            title: "Walnut standing desk".to_string(),
            price: Money::from_cents(100_000),
            discount: 10,
            image: None,
            quantity: 2,
        },
        OrderItem {
            id: 2,
            order_id: 1,
            product_id: 2,
            title: "Desk lamp".to_string(),
            price: Money::from_cents(50_000),
            discount: 0,
            image: None,
            quantity: 1,
        },
    ]
}
