//! The storefront engine public API.
//!
//! These wrappers are what the server (and anything else embedding the engine) talks to. They are generic over
//! the backend traits so that endpoint tests can drive them with mocks, and they own the policy knobs
//! (tax rate, stock decrement, strict transitions) so the backends stay policy-free.

pub mod cart_objects;
pub mod order_objects;

mod cart_api;
mod catalog_api;
mod order_flow_api;

pub use cart_api::CartApi;
pub use catalog_api::CatalogApi;
pub use order_flow_api::{CheckoutConfig, OrderFlowApi};
