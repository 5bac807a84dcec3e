use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{PgBackend, corrupt};
use crate::catalog::{Product, ProductDraft};
use crate::repository::{ProductRepository, RepositoryError};
use crate::types::{Price, ProductId};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price: i64,
    image: String,
    image2: Option<String>,
    image3: Option<String>,
    category: String,
    subcategory: Option<String>,
    in_stock: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| corrupt("product price", e))?;
        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price,
            image: row.image,
            image2: row.image2,
            image3: row.image3,
            category: row.category,
            subcategory: row.subcategory.filter(|s| !s.is_empty()),
            in_stock: row.in_stock,
            created_at: row.created_at,
        }
        .normalize_category())
    }
}

const COLUMNS: &str = "id, name, description, price, image, image2, image3, \
                       category, subcategory, in_stock, created_at";

#[async_trait]
impl ProductRepository for PgBackend {
    #[tracing::instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM products WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool())
                .await?;

        row.map(Product::try_from).transpose()
    }

    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    async fn create_product(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(&format!(
            r"
            INSERT INTO products
                (name, description, price, image, image2, image3, category, subcategory, in_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "
        ))
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(&draft.image)
        .bind(&draft.image2)
        .bind(&draft.image3)
        .bind(&draft.category)
        .bind(&draft.subcategory)
        .bind(draft.in_stock)
        .fetch_one(self.pool())
        .await?;

        row.try_into()
    }

    #[tracing::instrument(skip(self, draft))]
    async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r"
            UPDATE products
            SET name = $2, description = $3, price = $4, image = $5, image2 = $6,
                image3 = $7, category = $8, subcategory = $9, in_stock = $10
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(&draft.image)
        .bind(&draft.image2)
        .bind(&draft.image3)
        .bind(&draft.category)
        .bind(&draft.subcategory)
        .bind(draft.in_stock)
        .fetch_optional(self.pool())
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    #[tracing::instrument(skip(self))]
    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
