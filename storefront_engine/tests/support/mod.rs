//! Shared plumbing for the engine integration tests: throwaway SQLite databases and a small seeded catalog.

#![allow(dead_code)]

use sfs_common::Money;
use storefront_engine::{
    db_types::{CustomerInfo, NewProduct, Product, UserId},
    traits::CatalogManagement,
    SqliteDatabase,
};

/// Creates a fresh database in the system temp directory and brings the schema up to date.
pub async fn prepare_test_db() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_url();
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    db
}

pub fn random_db_url() -> String {
    let mut path = std::env::temp_dir();
    path.push(format!("storefront_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

/// Seeds the catalog the worked pricing scenario uses: a 1000.00 product at 10% off, a 500.00 product at full
/// price, and a cheap 9.99 item.
pub async fn seed_catalog(db: &SqliteDatabase) -> Vec<Product> {
    let specs = [
        ("Walnut standing desk", 100_000, 10, 25),
        ("Desk lamp", 50_000, 0, 40),
        ("Cable ties (100 pack)", 999, 0, 500),
    ];
    let mut products = Vec::with_capacity(specs.len());
    for (title, price_cents, discount, stock) in specs {
        let product = db
            .create_product(NewProduct {
                title: title.to_string(),
                category: "office".to_string(),
                price: Money::from_cents(price_cents),
                discount,
                stock,
                ..NewProduct::default()
            })
            .await
            .expect("Error seeding catalog");
        products.push(product);
    }
    products
}

pub fn alice() -> UserId {
    UserId::from("user-alice")
}

pub fn bob() -> UserId {
    UserId::from("user-bob")
}

pub fn shipping_details() -> CustomerInfo {
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
