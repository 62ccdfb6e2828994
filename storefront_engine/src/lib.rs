//! Storefront Engine
//!
//! The storefront engine contains the core commerce logic for the storefront server: the product catalog, the
//! per-user shopping cart, the pricing engine, and the checkout transaction that freezes a cart into an
//! immutable, priced order. It is provider-agnostic.
//!
//! The library is divided into three main sections:
//! 1. Database contracts and backends. The behaviour a storage backend must provide lives in [`traits`];
//!    SQLite is the supported backend ([`SqliteDatabase`]). You should never need to touch the database
//!    directly; go through the public APIs instead. The exception is the data types, which are defined in
//!    [`db_types`] and are public.
//! 2. The public APIs: [`CartApi`] for everything that mutates or reads a cart, [`OrderFlowApi`] for checkout
//!    and the fulfilment lifecycle, and [`CatalogApi`] for product management.
//! 3. A set of events that fire when orders are created or change status ([`events`]). A simple hook system
//!    lets you subscribe and react without the engine knowing about you.

mod api;
pub mod db_types;
pub mod events;
pub mod pricing;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use api::{cart_objects, order_objects, CartApi, CatalogApi, CheckoutConfig, OrderFlowApi};
