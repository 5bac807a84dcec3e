//! Category navigation.

use axum::{Json, extract::State};
use tracing::instrument;
use vitrina_core::catalog::CategoryTree;
use vitrina_core::repository::CategoryRepository;

use crate::error::Result;
use crate::state::AppState;

/// The two-level category tree.
///
/// Rows that do not fit two levels are listed under `rejected` and logged.
#[instrument(skip(state))]
pub async fn tree(State(state): State<AppState>) -> Result<Json<CategoryTree>> {
    let tree = CategoryTree::build(state.backend().list_categories().await?);
    for rejected in tree.rejected() {
        tracing::warn!(
            category = %rejected.category.name,
            reason = %rejected.reason,
            "category left out of the tree"
        );
    }
    Ok(Json(tree))
}
