//! Session-stored state.
//!
//! The cart is the only thing the storefront keeps per visitor. It is a
//! [`CartLedger`] serialized under [`keys::CART`].
//!
//! Requests on one session are not serialized. Each request loads its own
//! copy of the cart and the last write wins, so overlapping cart mutations
//! can drop one of the updates.

use tower_sessions::Session;
use vitrina_core::cart::CartLedger;

/// Session keys.
pub mod keys {
    /// Key for the visitor's cart ledger.
    pub const CART: &str = "cart";
}

/// Load the cart from the session, or an empty one for a new visitor.
///
/// # Errors
///
/// Returns the session store error if the session cannot be read.
pub async fn load_cart(session: &Session) -> Result<CartLedger, tower_sessions::session::Error> {
    Ok(session
        .get::<CartLedger>(keys::CART)
        .await?
        .unwrap_or_default())
}

/// Store the cart in the session.
///
/// # Errors
///
/// Returns the session store error if the session cannot be written.
pub async fn save_cart(
    session: &Session,
    cart: &CartLedger,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, cart).await
}
