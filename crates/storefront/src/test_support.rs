//! Shared helpers for handler tests.
//!
//! Requests go through the real router with an in-memory backend and a
//! `MemoryStore` session layer. The session cookie from the last response is
//! replayed on the next request, like a browser would.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use url::Url;
use vitrina_core::catalog::{Category, Product};
use vitrina_core::messenger::Messenger;
use vitrina_core::testing::InMemoryBackend;
use vitrina_core::{CategoryId, Price, ProductId};

use crate::config::{SentryConfig, StorefrontConfig};
use crate::middleware::create_session_layer;
use crate::routes::routes;
use crate::state::AppState;

pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: Url::parse("http://localhost:3000").unwrap(),
        messenger: Messenger::new("+7 (910) 356-11-90").unwrap(),
        sentry: SentryConfig::default(),
    }
}

pub fn product(name: &str, price: i64, category: &str) -> Product {
    Product {
        id: ProductId::generate(),
        name: name.to_owned(),
        description: String::new(),
        price: Price::new(price).unwrap(),
        image: "/api/placeholder/300/300".to_owned(),
        image2: None,
        image3: None,
        category: category.to_owned(),
        subcategory: None,
        in_stock: true,
        created_at: Utc::now(),
    }
}

pub fn category(name: &str, parent_id: Option<CategoryId>) -> Category {
    Category {
        id: CategoryId::generate(),
        name: name.to_owned(),
        parent_id,
    }
}

pub struct TestApp {
    pub backend: Arc<InMemoryBackend>,
    router: Router,
    cookie: Mutex<Option<String>>,
}

impl TestApp {
    pub fn new() -> Self {
        let backend = Arc::new(InMemoryBackend::new());
        let config = test_config();
        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let router = routes()
            .layer(session_layer)
            .with_state(AppState::new(config, backend.clone()));
        Self {
            backend,
            router,
            cookie: Mutex::new(None),
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().method("GET").uri(uri), Body::empty())
            .await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json"),
            Body::from(body.to_string()),
        )
        .await
    }

    async fn send(&self, builder: axum::http::request::Builder, body: Body) -> (StatusCode, Value) {
        let mut builder = builder.header("x-forwarded-for", "203.0.113.9");
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
