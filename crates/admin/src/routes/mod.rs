//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness check
//! GET    /health/ready                 - Readiness check (database)
//!
//! # Authentication
//! POST   /auth/login                   - Check password, set session flag
//! POST   /auth/logout                  - Drop session
//! GET    /auth/status                  - Whether the session is logged in
//!
//! # Catalog (login required)
//! GET    /api/products                 - All products, newest first
//! POST   /api/products                 - Create product
//! PUT    /api/products/{id}            - Update product
//! DELETE /api/products/{id}            - Delete product
//! GET    /api/categories               - All categories by name
//! GET    /api/categories/tree          - Two-level category tree
//! POST   /api/categories               - Create category
//! PUT    /api/categories/{id}          - Rename / move category
//! DELETE /api/categories/{id}          - Delete category and subcategories
//!
//! # Orders (login required)
//! GET    /api/orders?q=                - Orders, newest first, with search
//! GET    /api/orders/stats             - Dashboard counters
//! GET    /api/orders/{id}              - Order detail
//! PATCH  /api/orders/{id}/status       - Update status / payment status
//! DELETE /api/orders/{id}              - Delete order
//!
//! # Files (login required)
//! POST   /api/uploads/product-image    - Upload product image (multipart)
//! GET    /api/legal                    - Legal documents
//! POST   /api/legal/{kind}             - Upload legal document (multipart)
//! DELETE /api/legal/{kind}             - Remove file, restore placeholder
//! ```

pub mod auth;
pub mod categories;
pub mod legal;
pub mod orders;
pub mod products;
pub mod uploads;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

/// Create the authentication routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/status", get(auth::status))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/{id}", put(products::update).delete(products::delete))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route("/tree", get(categories::tree))
        .route("/{id}", put(categories::update).delete(categories::delete))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/stats", get(orders::stats))
        .route("/{id}", get(orders::show).delete(orders::delete))
        .route("/{id}/status", patch(orders::update_status))
}

/// Create the file upload routes router.
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/product-image", post(uploads::product_image))
        .layer(DefaultBodyLimit::max(uploads::MAX_IMAGE_BODY_BYTES))
}

/// Create the legal document routes router.
pub fn legal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(legal::index))
        .route("/{kind}", post(legal::upload).delete(legal::delete))
        .layer(DefaultBodyLimit::max(legal::MAX_DOCUMENT_BODY_BYTES))
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/categories", category_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/uploads", upload_routes())
        .nest("/api/legal", legal_routes())
}
