use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{PgBackend, corrupt};
use crate::legal::{LegalDocument, LegalDocumentKind, LegalDocumentUpload};
use crate::repository::{LegalDocumentRepository, RepositoryError};
use crate::types::LegalDocumentId;

#[derive(Debug, sqlx::FromRow)]
struct LegalDocumentRow {
    id: Uuid,
    #[sqlx(rename = "type")]
    kind: String,
    title: String,
    file_url: Option<String>,
    file_name: Option<String>,
    content: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LegalDocumentRow> for LegalDocument {
    type Error = RepositoryError;

    fn try_from(row: LegalDocumentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LegalDocumentId::new(row.id),
            kind: row
                .kind
                .parse::<LegalDocumentKind>()
                .map_err(|e| corrupt("legal document row", e))?,
            title: row.title,
            file_url: row.file_url,
            file_name: row.file_name,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, type, title, file_url, file_name, content, created_at, updated_at";

#[async_trait]
impl LegalDocumentRepository for PgBackend {
    #[tracing::instrument(skip(self))]
    async fn list_legal_documents(&self) -> Result<Vec<LegalDocument>, RepositoryError> {
        let rows: Vec<LegalDocumentRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM legal_documents ORDER BY type"
        ))
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(LegalDocument::try_from).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn get_legal_document(
        &self,
        kind: LegalDocumentKind,
    ) -> Result<Option<LegalDocument>, RepositoryError> {
        let row: Option<LegalDocumentRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM legal_documents WHERE type = $1"
        ))
        .bind(kind.as_str())
        .fetch_optional(self.pool())
        .await?;

        row.map(LegalDocument::try_from).transpose()
    }

    #[tracing::instrument(skip(self, upload), fields(kind = %upload.kind))]
    async fn upsert_legal_document(
        &self,
        upload: LegalDocumentUpload,
    ) -> Result<LegalDocument, RepositoryError> {
        let row: LegalDocumentRow = sqlx::query_as(&format!(
            r"
            INSERT INTO legal_documents (type, title, file_url, file_name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (type) DO UPDATE
            SET title = EXCLUDED.title,
                file_url = EXCLUDED.file_url,
                file_name = EXCLUDED.file_name,
                updated_at = NOW()
            RETURNING {COLUMNS}
            "
        ))
        .bind(upload.kind.as_str())
        .bind(upload.kind.title())
        .bind(&upload.file_url)
        .bind(&upload.file_name)
        .fetch_one(self.pool())
        .await?;

        row.try_into()
    }

    #[tracing::instrument(skip(self))]
    async fn reset_legal_document(
        &self,
        kind: LegalDocumentKind,
    ) -> Result<LegalDocument, RepositoryError> {
        let row: Option<LegalDocumentRow> = sqlx::query_as(&format!(
            r"
            UPDATE legal_documents
            SET file_url = NULL, file_name = NULL, content = $2, updated_at = NOW()
            WHERE type = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(kind.as_str())
        .bind(kind.placeholder_content())
        .fetch_optional(self.pool())
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }
}
