//! Public legal documents.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;
use vitrina_core::legal::{LegalDocument, LegalDocumentKind};
use vitrina_core::repository::LegalDocumentRepository;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Show the current document of one kind.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(kind): Path<LegalDocumentKind>,
) -> Result<Json<LegalDocument>> {
    state
        .backend()
        .get_legal_document(kind)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(kind.title().to_string()))
}
