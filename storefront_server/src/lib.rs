//! # Storefront server
//!
//! This crate hosts the REST surface of the storefront. It is responsible for:
//! * Resolving access tokens into a user identity and roles (authentication itself is an external concern;
//!   the server only verifies the HMAC signature on tokens it is handed).
//! * Routing catalog, cart, checkout and order requests to the storefront engine.
//! * Mapping engine errors onto the HTTP error taxonomy.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! Everything except `/health` lives under the `/api` scope. Cart and order routes require a valid access
//! token; product reads are public; product writes and order status changes require the admin role.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
