//! Product catalog: products, the category tree, filter state and the
//! filter/sort pipeline the storefront runs on every catalog request.

pub mod category;
pub mod filter;
pub mod pipeline;
pub mod product;

use std::cmp::Ordering;

pub use category::{
    Category, CategoryDraft, CategoryInput, CategoryInputError, CategoryNode, CategoryTree,
    CategoryTreeError, RejectedCategory,
};
pub use filter::{FilterError, FilterState, SortDirection, SortKey};
pub use pipeline::{PriceStats, apply};
pub use product::{PLACEHOLDER_IMAGE, Product, ProductDraft, ProductInput, ProductInputError};

/// Compare two display names the way a Russian-locale UI orders them.
///
/// Case and the `ё`/`е` distinction are ignored first; the raw strings break
/// ties so the ordering stays total.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    fold(a).cmp(fold(b)).then_with(|| a.cmp(b))
}

fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase).map(|c| match c {
        'ё' => 'е',
        other => other,
    })
}
