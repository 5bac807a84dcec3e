//! Catalog filter state.

use serde::{Deserialize, Serialize};

use super::CategoryTree;

/// Sort key for the catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Price,
    /// Date added (`created_at`).
    Date,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Errors from updating a [`FilterState`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown subcategory: {0}")]
    UnknownSubcategory(String),
}

/// Current catalog selection: category, sort and price range.
///
/// Fields are private so the category/subcategory relationship can only be
/// changed through the selection methods: a selected subcategory always
/// comes with its parent category, and changing the category drops the
/// subcategory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    category: Option<String>,
    subcategory: Option<String>,
    sort: Option<SortKey>,
    direction: SortDirection,
    min_price: Option<i64>,
    max_price: Option<i64>,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    #[must_use]
    pub const fn sort(&self) -> Option<SortKey> {
        self.sort
    }

    #[must_use]
    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    #[must_use]
    pub const fn min_price(&self) -> Option<i64> {
        self.min_price
    }

    #[must_use]
    pub const fn max_price(&self) -> Option<i64> {
        self.max_price
    }

    /// Select a root category, clearing any subcategory.
    pub fn select_category(&mut self, name: impl Into<String>) {
        self.category = Some(name.into());
        self.subcategory = None;
    }

    /// Select a subcategory and its parent category.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownSubcategory`] if no root category in the
    /// tree owns a subcategory with this name; the state is left unchanged.
    pub fn select_subcategory(
        &mut self,
        tree: &CategoryTree,
        name: impl Into<String>,
    ) -> Result<(), FilterError> {
        let name = name.into();
        let parent = tree
            .parent_of(&name)
            .ok_or_else(|| FilterError::UnknownSubcategory(name.clone()))?;
        self.category = Some(parent.name.clone());
        self.subcategory = Some(name);
        Ok(())
    }

    /// Clear both category and subcategory.
    pub fn clear_category(&mut self) {
        self.category = None;
        self.subcategory = None;
    }

    /// Set or unset the sort key and direction.
    pub const fn set_sort(&mut self, key: Option<SortKey>, direction: SortDirection) {
        self.sort = key;
        self.direction = direction;
    }

    /// Set the inclusive price range; `None` leaves that side open.
    pub const fn set_price_range(&mut self, min: Option<i64>, max: Option<i64>) {
        self.min_price = min;
        self.max_price = max;
    }
}
