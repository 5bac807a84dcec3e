//! Category management route handlers.
//!
//! Categories form a two-level tree: roots and their subcategories. Input is
//! validated against the current categories before anything is written.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;
use vitrina_core::CategoryId;
use vitrina_core::catalog::{Category, CategoryInput, CategoryTree};
use vitrina_core::repository::CategoryRepository;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Result of deleting a category.
#[derive(Debug, Serialize)]
pub struct CategoryDeleted {
    /// Rows removed, the category plus its subcategories.
    pub deleted: u64,
}

/// List every category by name.
#[instrument(skip(state, _admin))]
pub async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.backend().list_categories().await?))
}

/// Categories arranged as a tree, with rows that do not fit reported separately.
#[instrument(skip(state, _admin))]
pub async fn tree(_admin: RequireAdmin, State(state): State<AppState>) -> Result<Json<CategoryTree>> {
    let categories = state.backend().list_categories().await?;
    Ok(Json(CategoryTree::build(categories)))
}

/// Create a category, optionally under a root category.
#[instrument(skip(state, _admin))]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    let existing = state.backend().list_categories().await?;
    let draft = input.validate(&existing, None)?;
    let category = state.backend().create_category(draft).await?;

    tracing::info!(category_id = %category.id, name = %category.name, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// Rename or move a category.
#[instrument(skip(state, _admin))]
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>> {
    let existing = state.backend().list_categories().await?;
    if !existing.iter().any(|category| category.id == id) {
        return Err(AppError::NotFound("Category".to_string()));
    }

    let draft = input.validate(&existing, Some(id))?;
    let category = state.backend().update_category(id, draft).await?;

    tracing::info!(category_id = %id, "category updated");
    Ok(Json(category))
}

/// Delete a category together with its subcategories.
///
/// Products keep their category names.
#[instrument(skip(state, _admin))]
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<CategoryDeleted>> {
    let deleted = state.backend().delete_category(id).await?;

    tracing::info!(category_id = %id, deleted, "category deleted");
    Ok(Json(CategoryDeleted { deleted }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::test_support::TestApp;

    async fn create(app: &TestApp, name: &str, parent_id: Option<&str>) -> (StatusCode, Value) {
        app.post("/api/categories", json!({ "name": name, "parent_id": parent_id }))
            .await
    }

    #[tokio::test]
    async fn test_create_and_tree() {
        let app = TestApp::logged_in().await;
        let (status, root) = create(&app, "Дом", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let root_id = root["id"].as_str().unwrap().to_owned();

        let (status, _) = create(&app, "Кухня", Some(&root_id)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, tree) = app.get("/api/categories/tree").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tree["roots"][0]["name"], "Дом");
        assert_eq!(tree["roots"][0]["subcategories"][0]["name"], "Кухня");

        let (_, list) = app.get("/api/categories").await;
        let names: Vec<&str> = list
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Дом", "Кухня"]);
    }

    #[tokio::test]
    async fn test_parent_must_be_root() {
        let app = TestApp::logged_in().await;
        let (_, root) = create(&app, "Дом", None).await;
        let (_, sub) = create(&app, "Кухня", root["id"].as_str()).await;

        let (status, body) = create(&app, "Ножи", sub["id"].as_str()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "parent_id");
    }

    #[tokio::test]
    async fn test_update_rejects_self_parent() {
        let app = TestApp::logged_in().await;
        let (_, root) = create(&app, "Дом", None).await;
        let id = root["id"].as_str().unwrap();

        let (status, body) = app
            .put(
                &format!("/api/categories/{id}"),
                json!({ "name": "Дом", "parent_id": id }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "parent_id");

        let (status, body) = app
            .put(&format!("/api/categories/{id}"), json!({ "name": "Для дома" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Для дома");
    }

    #[tokio::test]
    async fn test_update_unknown_category() {
        let app = TestApp::logged_in().await;
        let (status, _) = app
            .put(
                &format!("/api/categories/{}", CategoryId::generate()),
                json!({ "name": "Дом" }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_removes_subcategories() {
        let app = TestApp::logged_in().await;
        let (_, root) = create(&app, "Дом", None).await;
        create(&app, "Кухня", root["id"].as_str()).await;
        create(&app, "Спальня", root["id"].as_str()).await;

        let (status, body) = app
            .delete(&format!("/api/categories/{}", root["id"].as_str().unwrap()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], 3);
        assert!(app.backend.list_categories().await.unwrap().is_empty());
    }
}
