//! Category rows. Deleting a category removes its subcategories in the
//! same transaction.

use async_trait::async_trait;
use uuid::Uuid;

use super::PgBackend;
use crate::catalog::{Category, CategoryDraft, compare_names};
use crate::repository::{CategoryRepository, RepositoryError};
use crate::types::CategoryId;

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    parent_id: Option<Uuid>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            parent_id: row.parent_id.map(CategoryId::new),
        }
    }
}

#[async_trait]
impl CategoryRepository for PgBackend {
    #[tracing::instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows: Vec<CategoryRow> =
            sqlx::query_as("SELECT id, name, parent_id FROM categories ORDER BY name")
                .fetch_all(self.pool())
                .await?;

        // Collation differs between databases; keep the catalog order stable.
        let mut categories: Vec<Category> = rows.into_iter().map(Category::from).collect();
        categories.sort_by(|a, b| compare_names(&a.name, &b.name));
        Ok(categories)
    }

    #[tracing::instrument(skip(self))]
    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row: Option<CategoryRow> =
            sqlx::query_as("SELECT id, name, parent_id FROM categories WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool())
                .await?;

        Ok(row.map(Category::from))
    }

    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    async fn create_category(&self, draft: CategoryDraft) -> Result<Category, RepositoryError> {
        let row: CategoryRow = sqlx::query_as(
            r"
            INSERT INTO categories (name, parent_id)
            VALUES ($1, $2)
            RETURNING id, name, parent_id
            ",
        )
        .bind(&draft.name)
        .bind(draft.parent_id)
        .fetch_one(self.pool())
        .await?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self, draft))]
    async fn update_category(
        &self,
        id: CategoryId,
        draft: CategoryDraft,
    ) -> Result<Category, RepositoryError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            r"
            UPDATE categories
            SET name = $2, parent_id = $3
            WHERE id = $1
            RETURNING id, name, parent_id
            ",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(draft.parent_id)
        .fetch_optional(self.pool())
        .await?;

        row.map(Category::from).ok_or(RepositoryError::NotFound)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_category(&self, id: CategoryId) -> Result<u64, RepositoryError> {
        let mut tx = self.pool().begin().await?;

        let children = sqlx::query("DELETE FROM categories WHERE parent_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let removed = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;

        tracing::info!(subcategories = children, "deleted category");
        Ok(removed + children)
    }
}
