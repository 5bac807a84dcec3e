//! Session cart ledger.
//!
//! A cart is a list of product snapshots with quantities, kept in insertion
//! order. Snapshots are taken when a product is first added, so later edits
//! to the product do not change what the customer already put in the cart.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Price, ProductId};

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub quantity: NonZeroU32,
}

impl CartLine {
    fn snapshot(product: &Product, quantity: NonZeroU32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity,
        }
    }

    /// Price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity.get())
    }
}

/// The cart ledger.
///
/// Quantities are [`NonZeroU32`], so a zero-quantity line cannot exist:
/// setting a quantity to zero removes the line instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLedger {
    lines: Vec<CartLine>,
}

impl CartLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product`.
    pub fn add(&mut self, product: &Product) {
        self.add_quantity(product, 1);
    }

    /// Add `quantity` units of `product`; zero is a no-op.
    pub fn add_quantity(&mut self, product: &Product, quantity: u32) {
        let Some(quantity) = NonZeroU32::new(quantity) else {
            return;
        };
        match self.line_mut(product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity.get()),
            None => self.lines.push(CartLine::snapshot(product, quantity)),
        }
    }

    /// Overwrite the quantity of a line; zero removes it.
    ///
    /// Returns `false` if the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        let Some(quantity) = NonZeroU32::new(quantity) else {
            return self.remove(product_id);
        };
        match self.line_mut(product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |acc, line| acc.saturating_add(line.quantity.get()))
    }

    /// Sum of price × quantity.
    #[must_use]
    pub fn total_amount(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}
