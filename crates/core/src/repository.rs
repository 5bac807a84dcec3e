//! Repository and object-storage traits.
//!
//! Handlers and services depend on these traits only. The `postgres`
//! feature provides the sqlx-backed implementations in [`crate::postgres`];
//! the `testing` feature provides in-memory ones in [`crate::testing`].

use async_trait::async_trait;

use crate::catalog::{Category, CategoryDraft, Product, ProductDraft};
use crate::legal::{LegalDocument, LegalDocumentKind, LegalDocumentUpload};
use crate::order::{NewOrder, Order, OrderStatusUpdate};
use crate::types::{CategoryId, OrderId, ProductId};

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backing store could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate legal document kind).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Product storage.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product, newest first.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, RepositoryError>;

    /// Replace every editable field. [`RepositoryError::NotFound`] if absent.
    async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, RepositoryError>;

    /// [`RepositoryError::NotFound`] if absent.
    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError>;
}

/// Category storage.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Every category ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;

    async fn create_category(&self, draft: CategoryDraft) -> Result<Category, RepositoryError>;

    async fn update_category(
        &self,
        id: CategoryId,
        draft: CategoryDraft,
    ) -> Result<Category, RepositoryError>;

    /// Delete a category together with its subcategories.
    ///
    /// Returns how many rows were removed.
    async fn delete_category(&self, id: CategoryId) -> Result<u64, RepositoryError>;
}

/// Order storage.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// Every order, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    async fn update_order_status(
        &self,
        id: OrderId,
        update: OrderStatusUpdate,
    ) -> Result<Order, RepositoryError>;

    async fn delete_order(&self, id: OrderId) -> Result<(), RepositoryError>;
}

/// Legal document storage. At most one row per kind.
#[async_trait]
pub trait LegalDocumentRepository: Send + Sync {
    async fn list_legal_documents(&self) -> Result<Vec<LegalDocument>, RepositoryError>;

    async fn get_legal_document(
        &self,
        kind: LegalDocumentKind,
    ) -> Result<Option<LegalDocument>, RepositoryError>;

    /// Insert or replace the document of `upload.kind`, titled with the kind's title.
    async fn upsert_legal_document(
        &self,
        upload: LegalDocumentUpload,
    ) -> Result<LegalDocument, RepositoryError>;

    /// Drop the file reference and restore the placeholder text.
    ///
    /// [`RepositoryError::NotFound`] if the kind has no row.
    async fn reset_legal_document(
        &self,
        kind: LegalDocumentKind,
    ) -> Result<LegalDocument, RepositoryError>;
}

/// Everything a binary needs from the relational store.
#[async_trait]
pub trait Backend:
    ProductRepository + CategoryRepository + OrderRepository + LegalDocumentRepository
{
    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Errors from object storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The request could not be sent or the response could not be read.
    #[error("storage request failed: {0}")]
    Request(String),

    /// The storage service answered with a non-success status.
    #[error("storage returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Binary object storage with public URLs.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `bytes` at `bucket/path` and return the object's public URL.
    ///
    /// With `upsert` an existing object at the same path is replaced.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<String, StorageError>;

    /// Delete the object at `bucket/path`. Deleting a missing object succeeds.
    async fn remove(&self, bucket: &str, path: &str) -> Result<(), StorageError>;

    /// Public URL of `bucket/path`, whether or not it exists.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}
