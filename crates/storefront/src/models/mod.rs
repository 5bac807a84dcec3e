//! Session-held models for the storefront.

pub mod session;

pub use session::{keys, load_cart, save_cart};
