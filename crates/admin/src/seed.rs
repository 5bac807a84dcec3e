//! Catalog seeding from YAML.
//!
//! Used by `vitrina-cli seed` to load a starter catalog. The whole file is
//! validated before the first write; rows that already exist are skipped, so
//! running the same file twice is harmless.
//!
//! ## YAML Format
//!
//! ```yaml
//! categories:
//!   - name: Дом
//!     subcategories: [Кухня, Спальня]
//!   - name: Сад
//!
//! products:
//!   - name: Ваза
//!     description: Керамика ручной работы
//!     price: 2990
//!     category: Дом
//!     subcategory: Кухня
//! ```

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};
use vitrina_core::catalog::{CategoryDraft, ProductInput};
use vitrina_core::repository::{Backend, CategoryRepository, ProductRepository, RepositoryError};

/// A root category and the names of its subcategories.
#[derive(Debug, Clone, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

/// Full seed file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    #[serde(default)]
    pub products: Vec<ProductInput>,
}

/// Errors from seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Every problem found in the file, one message each.
    #[error("invalid seed file: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result of a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedResult {
    pub categories_created: u64,
    /// Categories that already existed under the same parent.
    pub categories_skipped: u64,
    pub products_created: u64,
    /// Products that already existed with the same name and category.
    pub products_skipped: u64,
}

impl CatalogSeed {
    /// Parse a seed file.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Parse`] if the YAML does not match the format.
    pub fn from_yaml(content: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Check the whole file without touching the database.
    ///
    /// Category names must be non-blank and unique among siblings. When
    /// categories are declared, every product must name a declared root
    /// category and, if given, one of its subcategories.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Invalid`] listing every problem found.
    pub fn validate(&self) -> Result<(), SeedError> {
        let mut problems = Vec::new();
        let mut roots = HashSet::new();

        for (i, category) in self.categories.iter().enumerate() {
            let name = category.name.trim();
            if name.is_empty() {
                problems.push(format!("categories[{i}]: name is required"));
            } else if !roots.insert(name) {
                problems.push(format!("categories[{i}]: duplicate category {name:?}"));
            }

            let mut subs = HashSet::new();
            for sub in &category.subcategories {
                let sub = sub.trim();
                if sub.is_empty() {
                    problems.push(format!("categories[{i}]: blank subcategory"));
                } else if !subs.insert(sub) {
                    problems.push(format!("categories[{i}]: duplicate subcategory {sub:?}"));
                }
            }
        }

        for (i, product) in self.products.iter().enumerate() {
            if let Err(e) = product.clone().validate() {
                problems.push(format!("products[{i}]: {e}"));
                continue;
            }
            if self.categories.is_empty() {
                continue;
            }
            let category = product.category.trim();
            let Some(root) = self.categories.iter().find(|c| c.name.trim() == category) else {
                problems.push(format!("products[{i}]: unknown category {category:?}"));
                continue;
            };
            if let Some(sub) = product.subcategory.as_deref().map(str::trim)
                && !sub.is_empty()
                && !root.subcategories.iter().any(|s| s.trim() == sub)
            {
                problems.push(format!(
                    "products[{i}]: {sub:?} is not a subcategory of {category:?}"
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(SeedError::Invalid(problems))
        }
    }
}

/// Validate `seed`, then write its categories and products.
///
/// # Errors
///
/// Returns [`SeedError::Invalid`] before any write if the file is invalid,
/// or the first repository error.
#[instrument(skip(backend, seed), fields(
    categories = seed.categories.len(),
    products = seed.products.len(),
))]
pub async fn seed_catalog(backend: &dyn Backend, seed: CatalogSeed) -> Result<SeedResult, SeedError> {
    seed.validate()?;
    let mut result = SeedResult::default();

    for root in seed.categories {
        let existing = backend.list_categories().await?;
        let root_name = root.name.trim().to_owned();
        let root_id = if let Some(found) = existing
            .iter()
            .find(|c| c.parent_id.is_none() && c.name == root_name)
        {
            debug!(category = %root_name, "Skipping existing category");
            result.categories_skipped += 1;
            found.id
        } else {
            result.categories_created += 1;
            backend
                .create_category(CategoryDraft {
                    name: root_name,
                    parent_id: None,
                })
                .await?
                .id
        };

        for sub in root.subcategories {
            let sub = sub.trim().to_owned();
            if existing
                .iter()
                .any(|c| c.parent_id == Some(root_id) && c.name == sub)
            {
                debug!(category = %sub, "Skipping existing subcategory");
                result.categories_skipped += 1;
                continue;
            }
            backend
                .create_category(CategoryDraft {
                    name: sub,
                    parent_id: Some(root_id),
                })
                .await?;
            result.categories_created += 1;
        }
    }

    let existing = backend.list_products().await?;
    for input in seed.products {
        let draft = input.validate().map_err(|e| SeedError::Invalid(vec![e.to_string()]))?;
        if existing
            .iter()
            .any(|p| p.name == draft.name && p.category == draft.category)
        {
            debug!(product = %draft.name, "Skipping existing product");
            result.products_skipped += 1;
            continue;
        }
        backend.create_product(draft).await?;
        result.products_created += 1;
    }

    info!(
        categories_created = result.categories_created,
        categories_skipped = result.categories_skipped,
        products_created = result.products_created,
        products_skipped = result.products_skipped,
        "Seeding complete"
    );
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vitrina_core::catalog::CategoryTree;
    use vitrina_core::testing::InMemoryBackend;

    use super::*;

    const SEED: &str = r"
categories:
  - name: Дом
    subcategories: [Кухня, Спальня]
  - name: Сад

products:
  - name: Ваза
    price: 2990
    category: Дом
    subcategory: Кухня
  - name: Лейка
    price: 890
    category: Сад
    in_stock: false
";

    #[test]
    fn test_parse_and_validate() {
        let seed = CatalogSeed::from_yaml(SEED).unwrap();
        assert_eq!(seed.categories.len(), 2);
        assert_eq!(seed.products.len(), 2);
        seed.validate().unwrap();
    }

    #[test]
    fn test_validation_collects_every_problem() {
        let seed = CatalogSeed::from_yaml(
            r"
categories:
  - name: Дом
    subcategories: [Кухня]
  - name: ' '
products:
  - name: Ваза
    price: -5
    category: Дом
  - name: Стул
    price: 100
    category: Офис
  - name: Нож
    price: 100
    category: Дом
    subcategory: Ванная
",
        )
        .unwrap();

        let Err(SeedError::Invalid(problems)) = seed.validate() else {
            panic!("expected validation errors");
        };
        assert_eq!(problems.len(), 4);
        assert!(problems.iter().any(|p| p.contains("categories[1]")));
        assert!(problems.iter().any(|p| p.contains("Офис")));
        assert!(problems.iter().any(|p| p.contains("Ванная")));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            CatalogSeed::from_yaml("products: 42"),
            Err(SeedError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let backend = InMemoryBackend::new();
        let seed = CatalogSeed::from_yaml(SEED).unwrap();

        let first = seed_catalog(&backend, seed.clone()).await.unwrap();
        assert_eq!(first.categories_created, 4);
        assert_eq!(first.products_created, 2);

        let second = seed_catalog(&backend, seed).await.unwrap();
        assert_eq!(second.categories_created, 0);
        assert_eq!(second.categories_skipped, 4);
        assert_eq!(second.products_skipped, 2);

        let tree = CategoryTree::build(backend.list_categories().await.unwrap());
        assert!(tree.rejected().is_empty());
        assert_eq!(tree.roots().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_seed_writes_nothing() {
        let backend = InMemoryBackend::new();
        let seed = CatalogSeed::from_yaml("products:\n  - name: Ваза\n    price: 1\n    category: ''\n")
            .unwrap();

        assert!(matches!(
            seed_catalog(&backend, seed).await,
            Err(SeedError::Invalid(_))
        ));
        assert!(backend.list_products().await.unwrap().is_empty());
    }
}
