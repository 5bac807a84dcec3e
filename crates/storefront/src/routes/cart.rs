//! Cart route handlers.
//!
//! The cart is a [`CartLedger`] kept in the visitor's session. Every mutation
//! loads it, applies one ledger operation and writes it back; the response is
//! always the updated cart.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use vitrina_core::cart::{CartLedger, CartLine};
use vitrina_core::repository::ProductRepository;
use vitrina_core::{Price, ProductId};

use crate::error::{AppError, Result};
use crate::models::{load_cart, save_cart};
use crate::state::AppState;

/// Most units of one product a single add may request.
pub const MAX_ADD_QUANTITY: u32 = 10;

/// Cart as returned to the client, with totals computed on demand.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total_items: u32,
    pub total_amount: Price,
}

impl From<&CartLedger> for CartView {
    fn from(cart: &CartLedger) -> Self {
        Self {
            lines: cart.lines().to_vec(),
            total_items: cart.total_items(),
            total_amount: cart.total_amount(),
        }
    }
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Update quantity request; zero removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

/// Show the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add a product, snapshotting its current name, price and image.
///
/// Adding an existing product increases its quantity.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    if request.quantity > MAX_ADD_QUANTITY {
        return Err(AppError::validation(
            "quantity",
            format!("at most {MAX_ADD_QUANTITY} units can be added at once"),
        ));
    }

    let product = state
        .backend()
        .get_product(request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
    if !product.in_stock {
        return Err(AppError::validation("product_id", "product is out of stock"));
    }

    let mut cart = load_cart(&session).await?;
    cart.add_quantity(&product, request.quantity);
    save_cart(&session, &cart).await?;

    tracing::info!(
        product_id = %product.id,
        quantity = request.quantity,
        total_items = cart.total_items(),
        "added to cart"
    );
    Ok(Json(CartView::from(&cart)))
}

/// Overwrite a line's quantity.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    if !cart.set_quantity(request.product_id, request.quantity) {
        return Err(AppError::NotFound("Cart item".to_string()));
    }
    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Remove a line; removing an absent product is not an error.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    if cart.remove(request.product_id) {
        save_cart(&session, &cart).await?;
    }
    Ok(Json(CartView::from(&cart)))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Number of items for the cart badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<CartCount>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartCount {
        count: cart.total_items(),
    }))
}
