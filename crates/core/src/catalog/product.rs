//! Products as stored in the catalog and as submitted by the admin form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Price, PriceError, ProductId};

/// Image shown for products created without a photo.
pub const PLACEHOLDER_IMAGE: &str = "/api/placeholder/300/300";

/// Separator used by legacy rows that packed `"Parent > Sub"` into `category`.
const LEGACY_PATH_SEPARATOR: &str = " > ";

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Primary image reference.
    pub image: String,
    pub image2: Option<String>,
    pub image3: Option<String>,
    /// Root category name.
    pub category: String,
    /// Subcategory name, if the product sits below a root category.
    pub subcategory: Option<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Split a legacy `"Parent > Sub"` category into category and subcategory.
    ///
    /// Only applies when the row has no subcategory of its own.
    #[must_use]
    pub fn normalize_category(mut self) -> Self {
        if self.subcategory.is_none() {
            let split = self
                .category
                .split_once(LEGACY_PATH_SEPARATOR)
                .map(|(parent, sub)| (parent.trim().to_owned(), sub.trim().to_owned()));
            if let Some((parent, sub)) = split {
                self.category = parent;
                self.subcategory = (!sub.is_empty()).then_some(sub);
            }
        }
        self
    }
}

/// Errors from validating a [`ProductInput`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductInputError {
    #[error("product name is required")]
    MissingName,
    #[error("product category is required")]
    MissingCategory,
    #[error(transparent)]
    Price(#[from] PriceError),
}

const fn default_in_stock() -> bool {
    true
}

/// Product form as submitted by the admin panel.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub image2: Option<String>,
    #[serde(default)]
    pub image3: Option<String>,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

impl ProductInput {
    /// Validate and normalize the form into a [`ProductDraft`].
    ///
    /// Text fields are trimmed, a blank primary image becomes
    /// [`PLACEHOLDER_IMAGE`], and blank optional fields become `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or category is blank or the price is negative.
    pub fn validate(self) -> Result<ProductDraft, ProductInputError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(ProductInputError::MissingName);
        }
        let category = self.category.trim().to_owned();
        if category.is_empty() {
            return Err(ProductInputError::MissingCategory);
        }
        let price = Price::new(self.price)?;

        let image = match self.image.trim() {
            "" => PLACEHOLDER_IMAGE.to_owned(),
            image => image.to_owned(),
        };

        Ok(ProductDraft {
            name,
            description: self.description.trim().to_owned(),
            price,
            image,
            image2: non_blank(self.image2),
            image3: non_blank(self.image3),
            category,
            subcategory: non_blank(self.subcategory),
            in_stock: self.in_stock,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// A validated product ready to be written by a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: String,
    pub image2: Option<String>,
    pub image3: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub in_stock: bool,
}

impl ProductDraft {
    /// Materialize the draft as a product with the given identity.
    #[must_use]
    pub fn into_product(self, id: ProductId, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            image: self.image,
            image2: self.image2,
            image3: self.image3,
            category: self.category,
            subcategory: self.subcategory,
            in_stock: self.in_stock,
            created_at,
        }
    }
}
