//! Checkout: contact validation and order submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::CartLedger;
use crate::messenger::{Messenger, order_message};
use crate::order::{NewOrder, OrderNumber};
use crate::repository::{OrderRepository, RepositoryError};
use crate::types::{Email, EmailError, OrderId, Price};

/// Contact form as submitted by the customer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub notes: String,
}

/// Field-specific contact validation failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("name is required")]
    MissingName,
    #[error("phone is required")]
    MissingPhone,
    #[error("invalid email: {0}")]
    InvalidEmail(#[source] EmailError),
}

impl ContactError {
    /// The form field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingName => "name",
            Self::MissingPhone => "phone",
            Self::InvalidEmail(_) => "email",
        }
    }
}

/// Validated, trimmed contact details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<Email>,
    pub notes: Option<String>,
}

impl ContactForm {
    /// Trim every field and check the required ones.
    ///
    /// # Errors
    ///
    /// Returns a [`ContactError`] naming the first invalid field.
    pub fn validate(&self) -> Result<ContactInfo, ContactError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ContactError::MissingName);
        }
        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(ContactError::MissingPhone);
        }
        let email = match self.email.trim() {
            "" => None,
            email => Some(Email::parse(email).map_err(ContactError::InvalidEmail)?),
        };
        let notes = Some(self.notes.trim())
            .filter(|notes| !notes.is_empty())
            .map(str::to_owned);

        Ok(ContactInfo {
            name: name.to_owned(),
            phone: phone.to_owned(),
            email,
            notes,
        })
    }
}

/// Errors from [`submit_order`].
#[derive(thiserror::Error, Debug)]
pub enum CheckoutError {
    #[error(transparent)]
    Contact(#[from] ContactError),
    #[error("cart is empty")]
    EmptyCart,
    /// The order could not be stored; the cart was left as it was.
    #[error("order submission failed: {0}")]
    Submission(#[source] RepositoryError),
}

/// What the customer gets back after a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub order_number: OrderNumber,
    pub total_amount: Price,
    /// The order summary sent to the shop.
    pub message: String,
    /// Messenger link prefilled with [`Self::message`].
    pub messenger_url: String,
}

/// Validate the contact form, store the order and clear the cart.
///
/// Nothing is written when validation fails. The cart is cleared only after
/// the repository has accepted the order; on a repository error it is left
/// untouched and no retry is attempted.
///
/// # Errors
///
/// Returns [`CheckoutError::Contact`] or [`CheckoutError::EmptyCart`] before
/// any external call, or [`CheckoutError::Submission`] if the insert fails.
#[tracing::instrument(skip_all, fields(lines = cart.lines().len()))]
pub async fn submit_order<R>(
    orders: &R,
    cart: &mut CartLedger,
    form: &ContactForm,
    messenger: &Messenger,
    now: DateTime<Utc>,
) -> Result<CheckoutReceipt, CheckoutError>
where
    R: OrderRepository + ?Sized,
{
    let contact = form.validate()?;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let order = NewOrder::from_cart(OrderNumber::generate(now), contact, cart);
    let message = order_message(&order);

    let stored = orders
        .create_order(order)
        .await
        .map_err(CheckoutError::Submission)?;

    cart.clear();
    tracing::info!(order_number = %stored.order_number, "order submitted");

    Ok(CheckoutReceipt {
        order_id: stored.id,
        messenger_url: messenger.deep_link(&message),
        order_number: stored.order_number,
        total_amount: stored.total_amount,
        message,
    })
}
