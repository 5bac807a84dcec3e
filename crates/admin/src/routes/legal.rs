//! Legal document route handlers.
//!
//! One document per kind. Uploading replaces the kind's file reference;
//! deleting removes the stored object and restores the placeholder text.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use chrono::Utc;
use tracing::instrument;
use vitrina_core::legal::{LegalDocument, LegalDocumentKind, LegalDocumentUpload};
use vitrina_core::repository::LegalDocumentRepository;
use vitrina_core::upload::{legal_document_path, object_name_from_url, validate_legal_document};

use super::uploads::read_file;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Request body limit for document uploads.
pub const MAX_DOCUMENT_BODY_BYTES: usize = 20 * 1024 * 1024;

/// List the stored legal documents.
#[instrument(skip(state, _admin))]
pub async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<LegalDocument>>> {
    Ok(Json(state.backend().list_legal_documents().await?))
}

/// Upload the file for `kind`, replacing any earlier one.
#[instrument(skip(state, _admin, multipart))]
pub async fn upload(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(kind): Path<LegalDocumentKind>,
    mut multipart: Multipart,
) -> Result<Json<LegalDocument>> {
    let file = read_file(&mut multipart).await?;
    validate_legal_document(&file.content_type, file.bytes.len())?;

    let path = legal_document_path(kind, &file.file_name, Utc::now());
    let file_url = state
        .files()
        .upload(
            &state.config().storage.legal_documents_bucket,
            &path,
            file.bytes,
            &file.content_type,
            true,
        )
        .await?;

    let document = state
        .backend()
        .upsert_legal_document(LegalDocumentUpload {
            kind,
            file_url,
            file_name: file.file_name,
        })
        .await?;

    tracing::info!(kind = %kind, path = %path, "legal document uploaded");
    Ok(Json(document))
}

/// Remove the file for `kind` and restore the placeholder text.
#[instrument(skip(state, _admin))]
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(kind): Path<LegalDocumentKind>,
) -> Result<Json<LegalDocument>> {
    let document = state
        .backend()
        .get_legal_document(kind)
        .await?
        .ok_or_else(|| AppError::NotFound("Legal document".to_string()))?;

    if let Some(name) = document.file_url.as_deref().and_then(object_name_from_url) {
        state
            .files()
            .remove(&state.config().storage.legal_documents_bucket, name)
            .await?;
    }

    let document = state.backend().reset_legal_document(kind).await?;
    tracing::info!(kind = %kind, "legal document reset");
    Ok(Json(document))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::test_support::{TEST_DOCUMENTS_BUCKET, TestApp};

    const PDF: &str = "application/pdf";

    #[tokio::test]
    async fn test_upload_then_replace() {
        let app = TestApp::logged_in().await;
        let (status, body) = app
            .upload("/api/legal/privacy_policy", "policy.pdf", PDF, b"%PDF-1")
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], "privacy_policy");
        assert_eq!(body["title"], "Политика конфиденциальности");
        assert_eq!(body["file_name"], "policy.pdf");
        let first_url = body["file_url"].as_str().unwrap().to_owned();
        assert!(first_url.contains("/privacy_policy_"));

        let (status, body) = app
            .upload("/api/legal/privacy_policy", "policy-v2.pdf", PDF, b"%PDF-2")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["file_name"], "policy-v2.pdf");

        let (_, list) = app.get("/api/legal").await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_unsupported_type() {
        let app = TestApp::logged_in().await;
        let (status, body) = app
            .upload("/api/legal/public_offer", "offer.txt", "text/plain", b"offer")
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "file");
        assert!(app.files.paths(TEST_DOCUMENTS_BUCKET).is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_object_and_restores_placeholder() {
        let app = TestApp::logged_in().await;
        app.upload("/api/legal/terms_of_service", "terms.pdf", PDF, b"%PDF")
            .await;
        assert_eq!(app.files.paths(TEST_DOCUMENTS_BUCKET).len(), 1);

        let (status, body) = app.delete("/api/legal/terms_of_service").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["file_url"].is_null());
        assert_eq!(
            body["content"],
            "Пользовательское соглашение будет доступна после загрузки документа через админ-панель."
        );
        assert!(app.files.paths(TEST_DOCUMENTS_BUCKET).is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_document() {
        let app = TestApp::logged_in().await;
        let (status, _) = app.delete("/api/legal/public_offer").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
