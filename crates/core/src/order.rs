//! Orders: numbering, the immutable order snapshot built at checkout, and
//! the read model the admin panel works with.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{CartLedger, CartLine};
use crate::checkout::ContactInfo;
use crate::types::{OrderId, OrderStatus, PaymentStatus, Price, ProductId};

/// Human-facing order number, `ORD-YYYYMMDD-NNNN`.
///
/// The date is the UTC calendar date of submission and `NNNN` is the last
/// four digits of the submission time in epoch milliseconds. Numbers are not
/// guaranteed unique; the database id is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate the number for an order submitted at `now`.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use vitrina_core::order::OrderNumber;
    ///
    /// let now = Utc.timestamp_millis_opt(1_705_312_801_234).unwrap();
    /// assert_eq!(OrderNumber::generate(now).as_str(), "ORD-20240115-1234");
    /// ```
    #[must_use]
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix = now.timestamp_millis().rem_euclid(10_000);
        Self(format!("ORD-{}-{suffix:04}", now.format("%Y%m%d")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OrderNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A cart line frozen into an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub image: String,
}

impl OrderItem {
    /// Price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Decode the stored `items` column.
    ///
    /// Older rows hold the array serialized into a JSON string instead of a
    /// JSON array; both shapes are accepted.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if neither shape decodes.
    pub fn decode_stored(value: serde_json::Value) -> Result<Vec<Self>, serde_json::Error> {
        match value {
            serde_json::Value::String(encoded) => serde_json::from_str(&encoded),
            other => serde_json::from_value(other),
        }
    }
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.product_id,
            name: line.name.clone(),
            price: line.price,
            quantity: line.quantity.get(),
            image: line.image.clone(),
        }
    }
}

/// An order ready to be inserted.
///
/// Owns a copy of the cart lines, so mutating the cart afterwards cannot
/// change a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub items: Vec<OrderItem>,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

impl NewOrder {
    /// Snapshot `cart` into a pending, unpaid order.
    #[must_use]
    pub fn from_cart(order_number: OrderNumber, contact: ContactInfo, cart: &CartLedger) -> Self {
        Self {
            order_number,
            customer_name: contact.name,
            customer_phone: contact.phone,
            customer_email: contact.email.map(String::from),
            items: cart.lines().iter().map(OrderItem::from).collect(),
            total_amount: cart.total_amount(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            notes: contact.notes,
        }
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub items: Vec<OrderItem>,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_transaction_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Admin search: order number and customer name case-insensitively,
    /// phone as a plain substring. An empty query matches every order.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }
        let folded = query.to_lowercase();
        self.order_number.as_str().to_lowercase().contains(&folded)
            || self.customer_name.to_lowercase().contains(&folded)
            || self.customer_phone.contains(query)
    }
}

/// Admin status change. `payment_status` is left untouched when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

/// Dashboard counters over a set of orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub paid: usize,
    pub total_amount: Price,
    /// Count per fulfillment status; every status is present.
    pub by_status: BTreeMap<&'static str, usize>,
}

impl OrderStats {
    #[must_use]
    pub fn of(orders: &[Order]) -> Self {
        let empty = Self {
            total: 0,
            pending: 0,
            paid: 0,
            total_amount: Price::ZERO,
            by_status: OrderStatus::ALL
                .into_iter()
                .map(|status| (status.as_str(), 0))
                .collect(),
        };
        orders.iter().fold(empty, |mut stats, order| {
            stats.total += 1;
            if order.status == OrderStatus::Pending {
                stats.pending += 1;
            }
            if order.payment_status == PaymentStatus::Paid {
                stats.paid += 1;
            }
            *stats.by_status.entry(order.status.as_str()).or_default() += 1;
            stats.total_amount = stats.total_amount.saturating_add(order.total_amount);
            stats
        })
    }
}
