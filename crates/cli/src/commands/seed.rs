//! Seed the catalog from a YAML file.
//!
//! The file is parsed and validated before connecting, so a typo never
//! leaves a half-loaded catalog. See [`vitrina_admin::seed`] for the format.

use std::path::Path;

use secrecy::SecretString;
use tracing::{error, info};
use vitrina_admin::seed::{CatalogSeed, SeedError, seed_catalog};
use vitrina_core::postgres::{PgBackend, create_pool};

/// Seed categories and products from `file_path`.
///
/// With `dry_run` the file is only parsed and validated.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is missing, the file cannot be read or
/// is invalid, or a database write fails.
pub async fn catalog(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed = CatalogSeed::from_yaml(&content)?;

    info!(
        categories = seed.categories.len(),
        products = seed.products.len(),
        "Parsed catalog"
    );

    if let Err(SeedError::Invalid(problems)) = seed.validate() {
        error!("Catalog validation failed:");
        for problem in &problems {
            error!("  - {problem}");
        }
        return Err(format!("{} validation errors found", problems.len()).into());
    }

    info!("Catalog validated successfully");
    if dry_run {
        return Ok(());
    }

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "DATABASE_URL not set")?;

    let pool = create_pool(&database_url).await?;
    info!("Connected to database");

    let result = seed_catalog(&PgBackend::new(pool), seed).await?;

    info!(
        categories_created = result.categories_created,
        categories_skipped = result.categories_skipped,
        products_created = result.products_created,
        products_skipped = result.products_skipped,
        "Catalog seeded"
    );
    Ok(())
}
