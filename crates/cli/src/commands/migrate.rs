//! Database migration command.
//!
//! Applies the core schema migrations, then creates the storefront session
//! table (`tower_sessions.session`) and the admin session table
//! (`admin.session`).
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use secrecy::SecretString;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;
use vitrina_core::postgres::{MIGRATOR, create_pool};

/// Errors from the migrate command.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Session store error: {0}")]
    SessionStore(String),
}

/// Run every migration against `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if the variable is missing or any migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("DATABASE_URL"))?;

    info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    info!("Running schema migrations...");
    MIGRATOR.run(&pool).await?;

    info!("Creating storefront session table...");
    PostgresStore::new(pool.clone()).migrate().await?;

    info!("Creating admin session table...");
    vitrina_admin::middleware::session_store(pool)
        .map_err(MigrationError::SessionStore)?
        .migrate()
        .await?;

    info!("Migrations complete");
    Ok(())
}
