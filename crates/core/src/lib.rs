//! Vitrina Core - shared domain library.
//!
//! This crate holds everything the storefront and admin binaries agree on:
//! - `storefront` - Public catalog, cart and checkout service
//! - `admin` - Back-office service for catalog, orders and documents
//! - `cli` - Migrations and catalog seeding
//!
//! # Architecture
//!
//! Domain logic here is synchronous and pure: the catalog pipeline, the cart
//! ledger, order assembly and the messenger text never touch I/O. The only
//! I/O lives behind the traits in [`repository`], implemented with sqlx in
//! [`postgres`] (feature `postgres`) and in memory in [`testing`]
//! (feature `testing`).
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and statuses
//! - [`catalog`] - Products, the category tree, filter state and pipeline
//! - [`cart`] - The session cart ledger
//! - [`order`] / [`checkout`] - Order snapshots and submission
//! - [`messenger`] - Messenger hand-off messages and deep links
//! - [`upload`] / [`legal`] - Upload policy and legal documents

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod legal;
pub mod messenger;
pub mod order;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod repository;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;
pub mod upload;

pub use types::*;
