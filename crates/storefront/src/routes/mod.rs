//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (database)
//!
//! # Catalog
//! GET  /api/catalog                 - Filtered, sorted product listing
//! GET  /api/catalog/price-range     - Min/max price over the catalog
//! GET  /api/products/{id}           - Product detail
//! GET  /api/products/{id}/buy-now   - Messenger link for a single product
//! GET  /api/categories              - Category tree
//!
//! # Cart (session)
//! GET  /api/cart                    - Cart with totals
//! POST /api/cart/add                - Add product (quantity 1..=10)
//! POST /api/cart/update             - Set quantity (0 removes)
//! POST /api/cart/remove             - Remove product
//! POST /api/cart/clear              - Empty cart
//! GET  /api/cart/count              - Item count badge
//!
//! # Checkout
//! POST /api/checkout                - Submit order (rate limited)
//!
//! # Legal
//! GET  /api/legal/{kind}            - Legal document by kind
//! ```

pub mod cart;
pub mod catalog;
pub mod categories;
pub mod checkout;
pub mod legal;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::checkout_rate_limiter;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/price-range", get(catalog::price_range))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(products::show))
        .route("/{id}/buy-now", get(products::buy_now))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::submit))
        .route_layer(checkout_rate_limiter())
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/catalog", catalog_routes())
        .nest("/api/products", product_routes())
        .route("/api/categories", get(categories::tree))
        .nest("/api/cart", cart_routes())
        .nest("/api/checkout", checkout_routes())
        .route("/api/legal/{kind}", get(legal::show))
}
