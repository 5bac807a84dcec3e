//! Product image uploads.
//!
//! Files arrive as `multipart/form-data` with the file in a `file` field.
//! The upload policy is checked before anything is sent to object storage.

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;
use tracing::instrument;
use vitrina_core::upload::{MAX_PRODUCT_IMAGE_BYTES, product_image_path, validate_product_image};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Request body limit for image uploads: the image limit plus form overhead.
///
/// Slightly oversized images still reach the policy check and get a
/// field-specific error.
pub const MAX_IMAGE_BODY_BYTES: usize = MAX_PRODUCT_IMAGE_BYTES + 1024 * 1024;

/// Multipart field holding the file.
const FILE_FIELD: &str = "file";

/// Content type assumed when the client sends none.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file read from a multipart form.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Where an uploaded file ended up.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Public URL to store on the product.
    pub url: String,
    /// Object path inside the bucket.
    pub path: String,
}

#[allow(clippy::needless_pass_by_value)] // used as a `map_err` callback
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::validation(FILE_FIELD, "file is too large")
    } else {
        AppError::BadRequest(err.body_text())
    }
}

async fn read_field(field: Field<'_>) -> Result<UploadedFile> {
    let file_name = field.file_name().unwrap_or_default().to_owned();
    let content_type = field
        .content_type()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_owned();
    let bytes = field.bytes().await.map_err(multipart_error)?.to_vec();

    Ok(UploadedFile {
        file_name,
        content_type,
        bytes,
    })
}

/// Read the `file` field of a multipart form, skipping any other fields.
///
/// # Errors
///
/// Returns a validation error on field `file` if the form has no file, and a
/// bad request if the body is not valid multipart.
pub async fn read_file(multipart: &mut Multipart) -> Result<UploadedFile> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some(FILE_FIELD) {
            return read_field(field).await;
        }
    }
    Err(AppError::validation(FILE_FIELD, "no file was uploaded"))
}

/// Upload a product image and return its public URL.
#[instrument(skip(state, _admin, multipart))]
pub async fn product_image(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let file = read_file(&mut multipart).await?;
    validate_product_image(&file.content_type, file.bytes.len())?;

    let path = product_image_path(&file.file_name, Utc::now(), rand::random());
    let size = file.bytes.len();
    let url = state
        .files()
        .upload(
            &state.config().storage.product_images_bucket,
            &path,
            file.bytes,
            &file.content_type,
            false,
        )
        .await?;

    tracing::info!(path = %path, size, "product image uploaded");
    Ok((StatusCode::CREATED, Json(UploadResponse { url, path })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{TEST_IMAGES_BUCKET, TestApp};

    #[tokio::test]
    async fn test_upload_image() {
        let app = TestApp::logged_in().await;
        let (status, body) = app
            .upload("/api/uploads/product-image", "vase.PNG", "image/png", b"\x89PNG")
            .await;

        assert_eq!(status, StatusCode::CREATED);
        let path = body["path"].as_str().unwrap();
        assert!(path.starts_with("products/"));
        assert!(path.ends_with(".png"));
        assert_eq!(
            body["url"],
            format!("https://storage.test/object/public/{TEST_IMAGES_BUCKET}/{path}")
        );

        let stored = app.files.get(TEST_IMAGES_BUCKET, path).unwrap();
        assert_eq!(stored.bytes, b"\x89PNG");
        assert_eq!(stored.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_rejects_non_image() {
        let app = TestApp::logged_in().await;
        let (status, body) = app
            .upload("/api/uploads/product-image", "notes.txt", "text/plain", b"hello")
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "file");
        assert!(app.files.paths(TEST_IMAGES_BUCKET).is_empty());
    }

    #[tokio::test]
    async fn test_rejects_oversized_image() {
        let app = TestApp::logged_in().await;
        let big = vec![0_u8; MAX_PRODUCT_IMAGE_BYTES + 1];
        let (status, body) = app
            .upload("/api/uploads/product-image", "big.jpg", "image/jpeg", &big)
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "file");
        assert!(app.files.paths(TEST_IMAGES_BUCKET).is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_is_bad_gateway() {
        let app = TestApp::logged_in().await;
        app.files.fail(true);
        let (status, body) = app
            .upload("/api/uploads/product-image", "vase.png", "image/png", b"\x89PNG")
            .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "File storage error");
    }
}
