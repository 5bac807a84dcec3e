//! Vitrina admin library.
//!
//! The back-office JSON API: catalog and category management, orders,
//! product images and legal documents. Exposed as a library so the router
//! can be tested without a database and so `vitrina-cli` can reuse the
//! catalog seeder and the session store.
//!
//! # Security
//!
//! This crate holds the object storage service key and the admin password.
//! Bind it to a private interface; the login flag is not a public boundary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_support;
