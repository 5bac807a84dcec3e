//! Product detail and the "buy now" messenger shortcut.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;
use vitrina_core::ProductId;
use vitrina_core::catalog::Product;
use vitrina_core::messenger::buy_now_message;
use vitrina_core::repository::ProductRepository;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// Messenger hand-off for a single product.
#[derive(Debug, Serialize)]
pub struct BuyNowResponse {
    pub product_id: ProductId,
    pub message: String,
    pub messenger_url: String,
}

async fn find_product(state: &AppState, id: ProductId) -> Result<Product> {
    state
        .backend()
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

/// Show one product.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<ProductId>) -> Result<Json<Product>> {
    Ok(Json(find_product(&state, id).await?))
}

/// Build the messenger link for buying one product without a cart.
///
/// No order is created.
#[instrument(skip(state))]
pub async fn buy_now(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<BuyNowResponse>> {
    let product = find_product(&state, id).await?;
    let message = buy_now_message(&product);
    add_breadcrumb("checkout", "Buy now", &[("product_id", &id.to_string())]);

    Ok(Json(BuyNowResponse {
        product_id: id,
        messenger_url: state.messenger().deep_link(&message),
        message,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use vitrina_core::ProductId;

    use crate::test_support::{TestApp, product};

    #[tokio::test]
    async fn test_show_product() {
        let app = TestApp::new();
        let kettle = product("Чайник", 2990, "Посуда");
        let id = kettle.id;
        app.backend.insert_product(kettle);

        let (status, body) = app.get(&format!("/api/products/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Чайник");
        assert_eq!(body["price"], 2990);
    }

    #[tokio::test]
    async fn test_missing_product() {
        let app = TestApp::new();
        let (status, body) = app
            .get(&format!("/api/products/{}", ProductId::generate()))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Product not found");
    }

    #[tokio::test]
    async fn test_buy_now_link() {
        let app = TestApp::new();
        let kettle = product("Чайник", 2990, "Посуда");
        let id = kettle.id;
        app.backend.insert_product(kettle);

        let (status, body) = app.get(&format!("/api/products/{id}/buy-now")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().contains("Чайник"));
        assert!(
            body["messenger_url"]
                .as_str()
                .unwrap()
                .starts_with("https://wa.me/79103561190?text=")
        );
    }
}
