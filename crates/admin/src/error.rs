//! Unified error handling for admin.
//!
//! Error bodies are JSON: `{"error": "...", "field": "..."}`, where `field`
//! names the offending form field for validation errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use vitrina_core::catalog::{CategoryInputError, ProductInputError};
use vitrina_core::repository::{RepositoryError, StorageError};
use vitrina_core::upload::UploadError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Object storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Input rejected before any external call.
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Not logged in, or wrong password.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build a validation error for a form field.
    pub fn validation(field: &'static str, message: impl ToString) -> Self {
        Self::Validation {
            field,
            message: message.to_string(),
        }
    }

    const fn is_server_error(&self) -> bool {
        match self {
            Self::Database(err) => !matches!(err, RepositoryError::NotFound),
            Self::Storage(_) | Self::Session(_) | Self::Internal(_) => true,
            _ => false,
        }
    }
}

impl From<ProductInputError> for AppError {
    fn from(err: ProductInputError) -> Self {
        let field = match err {
            ProductInputError::MissingName => "name",
            ProductInputError::MissingCategory => "category",
            ProductInputError::Price(_) => "price",
        };
        Self::validation(field, err)
    }
}

impl From<CategoryInputError> for AppError {
    fn from(err: CategoryInputError) -> Self {
        let field = match err {
            CategoryInputError::EmptyName => "name",
            CategoryInputError::SelfParent
            | CategoryInputError::UnknownParent
            | CategoryInputError::ParentNotRoot
            | CategoryInputError::HasSubcategories => "parent_id",
        };
        Self::validation(field, err)
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        Self::validation("file", err)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Storage(_) => StatusCode::BAD_GATEWAY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation { .. } | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let (message, field) = match &self {
            Self::Database(RepositoryError::NotFound) => ("Not found".to_string(), None),
            Self::Database(RepositoryError::Conflict(_)) => {
                ("Conflicting update".to_string(), None)
            }
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                ("Internal server error".to_string(), None)
            }
            Self::Storage(_) => ("File storage error".to_string(), None),
            Self::Validation { field, message } => (message.clone(), Some(*field)),
            Self::NotFound(what) => (format!("{what} not found"), None),
            Self::Unauthorized(message) | Self::BadRequest(message) => (message.clone(), None),
        };

        let body = ErrorBody {
            error: &message,
            field,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
