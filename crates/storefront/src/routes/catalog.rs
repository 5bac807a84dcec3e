//! Catalog listing: the filter/sort pipeline over the full product list.
//!
//! Every request re-fetches the products; nothing is cached between requests.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use vitrina_core::catalog::{
    self, CategoryTree, FilterState, PriceStats, Product, SortDirection, SortKey,
};

use vitrina_core::repository::{CategoryRepository, ProductRepository};

use crate::error::Result;
use crate::state::AppState;

/// Catalog query string.
///
/// `subcategory` wins over `category`: selecting a subcategory selects its
/// parent. Blank values count as unset.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub sort: Option<SortKey>,
    pub order: Option<SortDirection>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    #[serde(default)]
    pub q: String,
}

/// Catalog listing response.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub products: Vec<Product>,
    /// Number of products after filtering.
    pub shown: usize,
    /// Number of products in the catalog.
    pub total: usize,
    /// The search query as applied.
    pub query: String,
    /// The effective selection.
    pub filter: FilterState,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// List products matching the query.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>> {
    let products = state.backend().list_products().await?;

    let mut filter = FilterState::new();
    if let Some(subcategory) = non_blank(query.subcategory.as_deref()) {
        let tree = CategoryTree::build(state.backend().list_categories().await?);
        filter.select_subcategory(&tree, subcategory)?;
    } else if let Some(category) = non_blank(query.category.as_deref()) {
        filter.select_category(category);
    }
    filter.set_sort(query.sort, query.order.unwrap_or_default());
    filter.set_price_range(query.min_price, query.max_price);

    let shown = catalog::apply(&products, &filter, &query.q);
    tracing::debug!(shown = shown.len(), total = products.len(), "catalog filtered");

    Ok(Json(CatalogResponse {
        shown: shown.len(),
        total: products.len(),
        products: shown,
        query: catalog::pipeline::normalize_query(&query.q),
        filter,
    }))
}

/// Min/max price over the whole catalog, `null` when it is empty.
#[instrument(skip(state))]
pub async fn price_range(State(state): State<AppState>) -> Result<Json<Option<PriceStats>>> {
    let products = state.backend().list_products().await?;
    Ok(Json(PriceStats::of(&products)))
}
