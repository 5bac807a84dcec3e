//! Checkout: turn the session cart into an order and hand it off to the
//! shop's messenger.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;
use vitrina_core::cart::CartLedger;
use vitrina_core::checkout::{CheckoutReceipt, ContactForm, submit_order};

use crate::error::{Result, add_breadcrumb};
use crate::models::{load_cart, save_cart};
use crate::state::AppState;

/// Submit the cart as an order.
///
/// The cart in the session is cleared only once the order is stored. On any
/// error before that the session is not written.
///
/// The emptied cart is persisted here rather than left to the session layer.
/// If that write fails the order already exists: the failure is logged at
/// warn with the order number, and the client gets a 500 while its cart still
/// holds the ordered lines, so a retry creates a second order.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<CheckoutReceipt>)> {
    let mut cart = load_cart(&session).await?;

    let receipt = submit_order(
        state.backend(),
        &mut cart,
        &form,
        state.messenger(),
        Utc::now(),
    )
    .await?;

    if let Err(err) = persist_cart(&session, &cart).await {
        tracing::warn!(
            order_id = %receipt.order_id,
            order_number = %receipt.order_number,
            error = %err,
            "order stored but the session cart could not be cleared"
        );
        return Err(err.into());
    }

    add_breadcrumb(
        "checkout",
        "Order submitted",
        &[("order_number", receipt.order_number.as_str())],
    );
    tracing::info!(
        order_id = %receipt.order_id,
        order_number = %receipt.order_number,
        total_amount = receipt.total_amount.rubles(),
        "order submitted"
    );

    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn persist_cart(
    session: &Session,
    cart: &CartLedger,
) -> std::result::Result<(), tower_sessions::session::Error> {
    save_cart(session, cart).await?;
    session.save().await
}
