//! Integration tests for Vitrina.
//!
//! # Running Tests
//!
//! ```bash
//! # Repository tests against a scratch database
//! DATABASE_URL=postgres://localhost/vitrina_test \
//!     cargo test -p vitrina-integration-tests -- --ignored
//!
//! # API tests against a running admin server
//! ADMIN_BASE_URL=http://localhost:3001 ADMIN_PASSWORD=... \
//!     cargo test -p vitrina-integration-tests --test admin_api -- --ignored
//! ```
//!
//! Every test is `#[ignore]`d so a plain `cargo test` needs no services.
//! Tests create rows with unique names and never truncate tables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use secrecy::SecretString;
use vitrina_core::postgres::{MIGRATOR, PgBackend, create_pool};

/// Connect to `DATABASE_URL` and apply the migrations.
///
/// # Panics
///
/// Panics if the variable is missing or the database is unreachable.
#[allow(clippy::expect_used)]
pub async fn test_backend() -> PgBackend {
    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .expect("DATABASE_URL must be set for integration tests");
    let pool = create_pool(&database_url)
        .await
        .expect("Failed to connect to test database");
    MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    PgBackend::new(pool)
}

/// A name no other test run has used.
#[must_use]
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

/// Base URL for the admin API.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}
