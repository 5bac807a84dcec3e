//! Vitrina storefront library.
//!
//! The public JSON API: catalog browsing, a session cart and checkout via
//! messenger hand-off. Exposed as a library so the router can be driven in
//! tests without a database.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;
