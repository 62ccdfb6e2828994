//! Interface contracts for storefront database backends.
//!
//! The engine is provider-agnostic: any storage backend that implements these traits can power the storefront
//! server. The traits are split by concern:
//!
//! * [`CatalogManagement`] owns product records: the read path the cart resolves against, plus the
//!   administrative CRUD surface.
//! * [`CartManagement`] owns the per-user cart and its lines. Every mutation is a single atomic statement at
//!   the storage layer, so concurrent mutations to the same cart serialize in the store rather than racing in
//!   application code.
//! * [`OrderManagement`] owns order records after checkout: queries plus the fulfilment status write.
//! * [`StorefrontDatabase`] is the highest-level contract. Its centrepiece is [`StorefrontDatabase::place_order`],
//!   the checkout transaction that atomically converts a cart into an order.
//!
//! Each trait carries a concrete error enum defined alongside it.

mod cart_management;
mod catalog_management;
mod order_management;
mod storefront_database;

pub use cart_management::{CartApiError, CartManagement};
pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use order_management::{OrderApiError, OrderManagement};
pub use storefront_database::{CheckoutApiError, StorefrontDatabase};
