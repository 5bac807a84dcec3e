//! Order management route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use vitrina_core::OrderId;
use vitrina_core::order::{Order, OrderStats, OrderStatusUpdate};
use vitrina_core::repository::OrderRepository;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Order list query.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    /// Matches order number, customer name or phone.
    #[serde(default)]
    pub q: String,
}

/// Order list response.
#[derive(Debug, Serialize)]
pub struct OrderList {
    pub orders: Vec<Order>,
    /// Orders matching the query.
    pub shown: usize,
    /// All stored orders.
    pub total: usize,
}

/// Confirmation for a delete.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: OrderId,
}

/// List orders, newest first, optionally filtered by `q`.
#[instrument(skip(state, _admin))]
pub async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<OrderList>> {
    let all = state.backend().list_orders().await?;
    let total = all.len();
    let orders: Vec<Order> = all.into_iter().filter(|o| o.matches(&query.q)).collect();

    Ok(Json(OrderList {
        shown: orders.len(),
        total,
        orders,
    }))
}

/// Dashboard counters over every order.
#[instrument(skip(state, _admin))]
pub async fn stats(_admin: RequireAdmin, State(state): State<AppState>) -> Result<Json<OrderStats>> {
    let orders = state.backend().list_orders().await?;
    Ok(Json(OrderStats::of(&orders)))
}

/// Order detail.
#[instrument(skip(state, _admin))]
pub async fn show(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = state
        .backend()
        .get_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;
    Ok(Json(order))
}

/// Change the fulfillment status, and the payment status when given.
#[instrument(skip(state, _admin))]
pub async fn update_status(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(update): Json<OrderStatusUpdate>,
) -> Result<Json<Order>> {
    let order = state.backend().update_order_status(id, update).await?;

    tracing::info!(
        order_id = %id,
        order_number = %order.order_number,
        status = %order.status,
        payment_status = %order.payment_status,
        "order status updated"
    );
    Ok(Json(order))
}

/// Delete an order.
#[instrument(skip(state, _admin))]
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Deleted>> {
    state.backend().delete_order(id).await?;

    tracing::info!(order_id = %id, "order deleted");
    Ok(Json(Deleted { deleted: id }))
}
