//! In-memory implementations of the repository and storage traits.
//!
//! Used by unit tests here and by the handler tests of the binaries
//! (enable the `testing` feature as a dev-dependency).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::catalog::{Category, CategoryDraft, Product, ProductDraft, compare_names};
use crate::legal::{LegalDocument, LegalDocumentKind, LegalDocumentUpload};
use crate::order::{NewOrder, Order, OrderStatusUpdate};
use crate::repository::{
    Backend, CategoryRepository, FileStore, LegalDocumentRepository, OrderRepository,
    ProductRepository, RepositoryError, StorageError,
};
use crate::types::{CategoryId, LegalDocumentId, OrderId, ProductId};

#[derive(Debug, Default)]
struct Tables {
    products: Vec<Product>,
    categories: Vec<Category>,
    orders: Vec<Order>,
    legal: Vec<LegalDocument>,
}

/// A [`Backend`] holding everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    tables: Mutex<Tables>,
    fail_orders: AtomicBool,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product as-is.
    pub fn insert_product(&self, product: Product) {
        self.tables().products.push(product);
    }

    /// Insert a category as-is, without validation.
    pub fn insert_category(&self, category: Category) {
        self.tables().categories.push(category);
    }

    /// Make every order call fail with [`RepositoryError::Unavailable`].
    pub fn fail_orders(&self, fail: bool) {
        self.fail_orders.store(fail, Ordering::SeqCst);
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_orders(&self) -> Result<(), RepositoryError> {
        if self.fail_orders.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "orders table unavailable".to_owned(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryBackend {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self
            .tables()
            .products
            .iter()
            .cloned()
            .map(Product::normalize_category)
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self
            .tables()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .map(Product::normalize_category))
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let product = draft.into_product(ProductId::generate(), Utc::now());
        self.tables().products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let mut tables = self.tables();
        let slot = tables
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = draft.into_product(id, slot.created_at);
        Ok(slot.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        if tables.products.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryBackend {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories = self.tables().categories.clone();
        categories.sort_by(|a, b| compare_names(&a.name, &b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        Ok(self
            .tables()
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn create_category(&self, draft: CategoryDraft) -> Result<Category, RepositoryError> {
        let category = Category {
            id: CategoryId::generate(),
            name: draft.name,
            parent_id: draft.parent_id,
        };
        self.tables().categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        draft: CategoryDraft,
    ) -> Result<Category, RepositoryError> {
        let mut tables = self.tables();
        let slot = tables
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        slot.name = draft.name;
        slot.parent_id = draft.parent_id;
        Ok(slot.clone())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<u64, RepositoryError> {
        let mut tables = self.tables();
        let before = tables.categories.len();
        tables
            .categories
            .retain(|c| c.id != id && c.parent_id != Some(id));
        let removed = before - tables.categories.len();
        if removed == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl OrderRepository for InMemoryBackend {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        self.check_orders()?;
        let now = Utc::now();
        let stored = Order {
            id: OrderId::generate(),
            order_number: order.order_number,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            customer_email: order.customer_email,
            items: order.items,
            total_amount: order.total_amount,
            status: order.status,
            payment_status: order.payment_status,
            payment_method: None,
            payment_transaction_id: None,
            notes: order.notes,
            created_at: now,
            updated_at: now,
        };
        self.tables().orders.push(stored.clone());
        Ok(stored)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        self.check_orders()?;
        let mut orders = self.tables().orders.clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.check_orders()?;
        Ok(self.tables().orders.iter().find(|o| o.id == id).cloned())
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        update: OrderStatusUpdate,
    ) -> Result<Order, RepositoryError> {
        self.check_orders()?;
        let mut tables = self.tables();
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(RepositoryError::NotFound)?;
        order.status = update.status;
        if let Some(payment_status) = update.payment_status {
            order.payment_status = payment_status;
        }
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn delete_order(&self, id: OrderId) -> Result<(), RepositoryError> {
        self.check_orders()?;
        let mut tables = self.tables();
        let before = tables.orders.len();
        tables.orders.retain(|o| o.id != id);
        if tables.orders.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl LegalDocumentRepository for InMemoryBackend {
    async fn list_legal_documents(&self) -> Result<Vec<LegalDocument>, RepositoryError> {
        let mut documents = self.tables().legal.clone();
        documents.sort_by_key(|d| d.kind.as_str());
        Ok(documents)
    }

    async fn get_legal_document(
        &self,
        kind: LegalDocumentKind,
    ) -> Result<Option<LegalDocument>, RepositoryError> {
        Ok(self.tables().legal.iter().find(|d| d.kind == kind).cloned())
    }

    async fn upsert_legal_document(
        &self,
        upload: LegalDocumentUpload,
    ) -> Result<LegalDocument, RepositoryError> {
        let now = Utc::now();
        let mut tables = self.tables();
        if let Some(existing) = tables.legal.iter_mut().find(|d| d.kind == upload.kind) {
            existing.title = upload.kind.title().to_owned();
            existing.file_url = Some(upload.file_url);
            existing.file_name = Some(upload.file_name);
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let document = LegalDocument {
            id: LegalDocumentId::generate(),
            kind: upload.kind,
            title: upload.kind.title().to_owned(),
            file_url: Some(upload.file_url),
            file_name: Some(upload.file_name),
            content: None,
            created_at: now,
            updated_at: now,
        };
        tables.legal.push(document.clone());
        Ok(document)
    }

    async fn reset_legal_document(
        &self,
        kind: LegalDocumentKind,
    ) -> Result<LegalDocument, RepositoryError> {
        let mut tables = self.tables();
        let document = tables
            .legal
            .iter_mut()
            .find(|d| d.kind == kind)
            .ok_or(RepositoryError::NotFound)?;
        document.file_url = None;
        document.file_name = None;
        document.content = Some(kind.placeholder_content());
        document.updated_at = Utc::now();
        Ok(document.clone())
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// A [`FileStore`] keeping objects in memory.
#[derive(Debug)]
pub struct InMemoryFileStore {
    base_url: String,
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    fail: AtomicBool,
}

impl Default for InMemoryFileStore {
    fn default() -> Self {
        Self::new("https://storage.test")
    }
}

impl InMemoryFileStore {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Mutex::new(HashMap::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Make every call fail with a 503.
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn get(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.objects()
            .get(&(bucket.to_owned(), path.to_owned()))
            .cloned()
    }

    /// Paths stored in `bucket`, sorted.
    #[must_use]
    pub fn paths(&self, bucket: &str) -> Vec<String> {
        let mut paths: Vec<String> = self
            .objects()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, path)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    fn objects(&self) -> MutexGuard<'_, HashMap<(String, String), StoredObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Status {
                status: 503,
                message: "storage unavailable".to_owned(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<String, StorageError> {
        self.check()?;
        let key = (bucket.to_owned(), path.to_owned());
        let mut objects = self.objects();
        if !upsert && objects.contains_key(&key) {
            return Err(StorageError::Status {
                status: 409,
                message: "The resource already exists".to_owned(),
            });
        }
        objects.insert(
            key,
            StoredObject {
                bytes,
                content_type: content_type.to_owned(),
            },
        );
        Ok(self.public_url(bucket, path))
    }

    async fn remove(&self, bucket: &str, path: &str) -> Result<(), StorageError> {
        self.check()?;
        self.objects().remove(&(bucket.to_owned(), path.to_owned()));
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/object/public/{bucket}/{path}", self.base_url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{OrderStatus, PaymentStatus};

    #[tokio::test]
    async fn test_delete_category_cascades() {
        let backend = InMemoryBackend::new();
        let root = backend
            .create_category(CategoryDraft {
                name: "Дом".to_owned(),
                parent_id: None,
            })
            .await
            .unwrap();
        backend
            .create_category(CategoryDraft {
                name: "Кухня".to_owned(),
                parent_id: Some(root.id),
            })
            .await
            .unwrap();

        assert_eq!(backend.delete_category(root.id).await.unwrap(), 2);
        assert!(backend.list_categories().await.unwrap().is_empty());
        assert!(matches!(
            backend.delete_category(root.id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_status_update_keeps_payment_when_absent() {
        let backend = InMemoryBackend::new();
        let order = backend
            .create_order(NewOrder {
                order_number: "ORD-1".to_owned().into(),
                customer_name: "A".to_owned(),
                customer_phone: "1".to_owned(),
                customer_email: None,
                items: Vec::new(),
                total_amount: crate::types::Price::ZERO,
                status: OrderStatus::Pending,
                payment_status: PaymentStatus::Paid,
                notes: None,
            })
            .await
            .unwrap();

        let updated = backend
            .update_order_status(
                order.id,
                OrderStatusUpdate {
                    status: OrderStatus::Shipped,
                    payment_status: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_legal_upsert_then_reset() {
        let backend = InMemoryBackend::new();
        let kind = LegalDocumentKind::TermsOfService;
        assert!(matches!(
            backend.reset_legal_document(kind).await,
            Err(RepositoryError::NotFound)
        ));

        let first = backend
            .upsert_legal_document(LegalDocumentUpload {
                kind,
                file_url: "https://s/a.pdf".to_owned(),
                file_name: "a.pdf".to_owned(),
            })
            .await
            .unwrap();
        let second = backend
            .upsert_legal_document(LegalDocumentUpload {
                kind,
                file_url: "https://s/b.pdf".to_owned(),
                file_name: "b.pdf".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(backend.list_legal_documents().await.unwrap().len(), 1);

        let reset = backend.reset_legal_document(kind).await.unwrap();
        assert!(!reset.has_file());
        assert_eq!(reset.content, Some(kind.placeholder_content()));
    }

    #[tokio::test]
    async fn test_file_store_upsert_semantics() {
        let store = InMemoryFileStore::default();
        let url = store
            .upload("b", "x.png", vec![1], "image/png", false)
            .await
            .unwrap();
        assert_eq!(url, "https://storage.test/object/public/b/x.png");
        assert!(
            store
                .upload("b", "x.png", vec![2], "image/png", false)
                .await
                .is_err()
        );
        store
            .upload("b", "x.png", vec![3], "image/png", true)
            .await
            .unwrap();
        assert_eq!(store.get("b", "x.png").unwrap().bytes, vec![3]);

        store.remove("b", "x.png").await.unwrap();
        assert!(store.paths("b").is_empty());
    }
}
