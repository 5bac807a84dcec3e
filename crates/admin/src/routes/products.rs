//! Product management route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;
use vitrina_core::ProductId;
use vitrina_core::catalog::{Product, ProductInput};
use vitrina_core::repository::ProductRepository;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Confirmation for a delete.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: ProductId,
}

/// List every product, newest first.
#[instrument(skip(state, _admin))]
pub async fn index(_admin: RequireAdmin, State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.backend().list_products().await?;
    Ok(Json(products))
}

/// Create a product.
#[instrument(skip(state, _admin, input), fields(name = %input.name))]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let draft = input.validate()?;
    let product = state.backend().create_product(draft).await?;

    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's editable fields.
#[instrument(skip(state, _admin, input))]
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    let draft = input.validate()?;
    let product = state.backend().update_product(id, draft).await?;

    tracing::info!(product_id = %id, "product updated");
    Ok(Json(product))
}

/// Delete a product. Past orders keep their snapshot.
#[instrument(skip(state, _admin))]
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Deleted>> {
    state.backend().delete_product(id).await?;

    tracing::info!(product_id = %id, "product deleted");
    Ok(Json(Deleted { deleted: id }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_create_normalizes_input() {
        let app = TestApp::logged_in().await;
        let (status, body) = app
            .post(
                "/api/products",
                json!({
                    "name": "  Ваза  ",
                    "price": 2990,
                    "category": "Дом",
                    "image": "",
                    "image2": "  ",
                    "subcategory": ""
                }),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Ваза");
        assert_eq!(body["image"], "/api/placeholder/300/300");
        assert!(body["image2"].is_null());
        assert!(body["subcategory"].is_null());
        assert_eq!(body["in_stock"], true);
        assert_eq!(app.backend.list_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let app = TestApp::logged_in().await;

        let (status, body) = app
            .post(
                "/api/products",
                json!({ "name": " ", "price": 100, "category": "Дом" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "name");

        let (status, body) = app
            .post(
                "/api/products",
                json!({ "name": "Ваза", "price": -1, "category": "Дом" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "price");

        assert!(app.backend.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let app = TestApp::logged_in().await;
        let (_, created) = app
            .post(
                "/api/products",
                json!({ "name": "Ваза", "price": 2990, "category": "Дом" }),
            )
            .await;
        let id = created["id"].as_str().unwrap().to_owned();

        let (status, body) = app
            .put(
                &format!("/api/products/{id}"),
                json!({ "name": "Ваза", "price": 3490, "category": "Дом", "in_stock": false }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["price"], 3490);
        assert_eq!(body["in_stock"], false);

        let (status, _) = app.delete(&format!("/api/products/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app.delete(&format!("/api/products/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_requires_login() {
        let app = TestApp::new();
        let (status, _) = app
            .post(
                "/api/products",
                json!({ "name": "Ваза", "price": 2990, "category": "Дом" }),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
