//! Shared helpers for handler tests.
//!
//! The real router runs over an in-memory backend, an in-memory file store
//! and a `MemoryStore` session layer. The session cookie is replayed on every
//! request.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use url::Url;
use vitrina_core::cart::CartLedger;
use vitrina_core::catalog::Product;
use vitrina_core::checkout::ContactForm;
use vitrina_core::order::{NewOrder, Order, OrderNumber};
use vitrina_core::repository::OrderRepository;
use vitrina_core::testing::{InMemoryBackend, InMemoryFileStore};
use vitrina_core::{Price, ProductId};

use crate::config::{AdminConfig, SentryConfig, StorageConfig};
use crate::middleware::create_session_layer;
use crate::routes::routes;
use crate::state::AppState;

pub const TEST_PASSWORD: &str = "Tr0ub4dor&3-horse-staple";
pub const TEST_IMAGES_BUCKET: &str = "product-images";
pub const TEST_DOCUMENTS_BUCKET: &str = "legal-documents";

const MULTIPART_BOUNDARY: &str = "vitrina-test-boundary";

pub fn test_config() -> AdminConfig {
    AdminConfig {
        database_url: SecretString::from("postgres://localhost/test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3001,
        base_url: Url::parse("http://localhost:3001").unwrap(),
        password: SecretString::from(TEST_PASSWORD),
        storage: StorageConfig {
            url: Url::parse("https://storage.test").unwrap(),
            service_key: SecretString::from("service-key"),
            product_images_bucket: TEST_IMAGES_BUCKET.to_owned(),
            legal_documents_bucket: TEST_DOCUMENTS_BUCKET.to_owned(),
        },
        sentry: SentryConfig::default(),
    }
}

pub struct TestApp {
    pub backend: Arc<InMemoryBackend>,
    pub files: Arc<InMemoryFileStore>,
    router: Router,
    cookie: Mutex<Option<String>>,
}

impl TestApp {
    pub fn new() -> Self {
        let backend = Arc::new(InMemoryBackend::new());
        let files = Arc::new(InMemoryFileStore::default());
        let config = test_config();
        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let router = routes()
            .layer(session_layer)
            .with_state(AppState::new(config, backend.clone(), files.clone()));
        Self {
            backend,
            files,
            router,
            cookie: Mutex::new(None),
        }
    }

    /// A fresh app whose session has already logged in.
    pub async fn logged_in() -> Self {
        let app = Self::new();
        let (status, _) = app
            .post("/auth/login", json!({ "password": TEST_PASSWORD }))
            .await;
        assert_eq!(status, StatusCode::OK);
        app
    }

    /// Store an order for one unit of a 1000 ₽ product.
    pub async fn insert_order(&self, name: &str, phone: &str) -> Order {
        let product = Product {
            id: ProductId::generate(),
            name: "Ваза".to_owned(),
            description: String::new(),
            price: Price::new(1000).unwrap(),
            image: "/api/placeholder/300/300".to_owned(),
            image2: None,
            image3: None,
            category: "Дом".to_owned(),
            subcategory: None,
            in_stock: true,
            created_at: Utc::now(),
        };
        let mut cart = CartLedger::new();
        cart.add(&product);
        let contact = ContactForm {
            name: name.to_owned(),
            phone: phone.to_owned(),
            ..ContactForm::default()
        }
        .validate()
        .unwrap();

        self.backend
            .create_order(NewOrder::from_cart(
                OrderNumber::generate(Utc::now()),
                contact,
                &cart,
            ))
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None, Body::empty()).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, None, Body::empty()).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send_json("POST", uri, body).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send_json("PUT", uri, body).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send_json("PATCH", uri, body).await
    }

    /// POST a multipart form with a single `file` field.
    pub async fn upload(
        &self,
        uri: &str,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> (StatusCode, Value) {
        let mut body = format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

        self.send(
            "POST",
            uri,
            Some(format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")),
            Body::from(body),
        )
        .await
    }

    async fn send_json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            method,
            uri,
            Some("application/json".to_owned()),
            Body::from(body.to_string()),
        )
        .await
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        content_type: Option<String>,
        body: Body,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        if let Some(cookie) = self.cookie.lock().unwrap().clone() {
            builder = builder.header(header::COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_owned();
            *self.cookie.lock().unwrap() = Some(pair);
        }

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        // Extractor rejections answer in plain text.
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }
}
