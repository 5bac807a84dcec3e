//! Object storage client.
//!
//! Talks to a storage REST API with the service key as a bearer token:
//!
//! ```text
//! POST   {base}/object/{bucket}/{path}   upload (x-upsert: true to replace)
//! DELETE {base}/object/{bucket}          body {"prefixes": [path]}
//! GET    {base}/object/public/{bucket}/{path}   public URL
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::instrument;
use vitrina_core::repository::{FileStore, StorageError};

use crate::config::StorageConfig;

/// HTTP [`FileStore`] implementation.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct RemoveRequest<'a> {
    prefixes: [&'a str; 1],
}

#[allow(clippy::needless_pass_by_value)] // used as a `map_err` callback
fn request_error(err: reqwest::Error) -> StorageError {
    StorageError::Request(err.to_string())
}

impl StorageClient {
    /// Create a new storage client.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Request`] if the service key is not a valid
    /// header value or the HTTP client cannot be built.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", config.service_key.expose_secret()))
                .map_err(|_| StorageError::Request("invalid service key".to_string()))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StorageError::Request(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(StorageClientInner {
                client,
                base_url: config.url.as_str().trim_end_matches('/').to_string(),
            }),
        })
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/object/{}/{}",
            self.inner.base_url,
            urlencoding::encode(bucket),
            encode_path(path)
        )
    }

    async fn check(response: reqwest::Response) -> Result<(), StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.map_err(request_error)?;
        tracing::warn!(status = status.as_u16(), %message, "storage request rejected");
        Err(StorageError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

/// Percent-encode each segment of an object path, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl FileStore for StorageClient {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<String, StorageError> {
        let response = self
            .inner
            .client
            .post(self.object_url(bucket, path))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes)
            .send()
            .await
            .map_err(request_error)?;
        Self::check(response).await?;

        tracing::info!("object uploaded");
        Ok(self.public_url(bucket, path))
    }

    #[instrument(skip(self))]
    async fn remove(&self, bucket: &str, path: &str) -> Result<(), StorageError> {
        let response = self
            .inner
            .client
            .delete(format!(
                "{}/object/{}",
                self.inner.base_url,
                urlencoding::encode(bucket)
            ))
            .json(&RemoveRequest { prefixes: [path] })
            .send()
            .await
            .map_err(request_error)?;
        Self::check(response).await?;

        tracing::info!("object removed");
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/object/public/{}/{}",
            self.inner.base_url,
            urlencoding::encode(bucket),
            encode_path(path)
        )
    }
}
