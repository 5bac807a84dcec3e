//! The catalog filter/sort pipeline.
//!
//! Narrowing runs in a fixed order (category, price range, text search) and
//! the survivors are then stably sorted. Everything here is pure: the same
//! products, filter and query always give the same listing.

use std::cmp::Ordering;

use serde::Serialize;

use super::{FilterState, Product, SortDirection, SortKey, compare_names};
use crate::types::Price;

/// Run the pipeline over the full product list.
///
/// `search` is trimmed and case-folded here; an empty query matches everything.
#[must_use]
pub fn apply(products: &[Product], filter: &FilterState, search: &str) -> Vec<Product> {
    let query = normalize_query(search);

    let mut shown: Vec<Product> = products
        .iter()
        .filter(|product| in_category(product, filter))
        .filter(|product| in_price_range(product, filter))
        .filter(|product| matches_search(product, &query))
        .cloned()
        .collect();

    if let Some(key) = filter.sort() {
        let direction = filter.direction();
        shown.sort_by(|a, b| {
            let ordering = compare(a, b, key);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    shown
}

/// Trim and lowercase a free-text query.
#[must_use]
pub fn normalize_query(search: &str) -> String {
    search.trim().to_lowercase()
}

fn in_category(product: &Product, filter: &FilterState) -> bool {
    if let Some(sub) = filter.subcategory() {
        return product.subcategory.as_deref() == Some(sub);
    }
    filter
        .category()
        .is_none_or(|category| product.category == category)
}

fn in_price_range(product: &Product, filter: &FilterState) -> bool {
    let price = product.price.rubles();
    filter.min_price().is_none_or(|min| price >= min)
        && filter.max_price().is_none_or(|max| price <= max)
}

/// Whether the product name or description contains an already-normalized query.
#[must_use]
pub fn matches_search(product: &Product, query: &str) -> bool {
    query.is_empty()
        || product.name.to_lowercase().contains(query)
        || product.description.to_lowercase().contains(query)
}

/// Ascending comparison of two products by `key`.
#[must_use]
pub fn compare(a: &Product, b: &Product, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => compare_names(&a.name, &b.name),
        SortKey::Price => a.price.cmp(&b.price),
        SortKey::Date => a.created_at.cmp(&b.created_at),
    }
}

/// Cheapest and most expensive price in a product list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceStats {
    pub min: Price,
    pub max: Price,
}

impl PriceStats {
    /// `None` for an empty list.
    #[must_use]
    pub fn of(products: &[Product]) -> Option<Self> {
        let min = products.iter().map(|p| p.price).min()?;
        let max = products.iter().map(|p| p.price).max()?;
        Some(Self { min, max })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;
    use crate::catalog::{Category, CategoryTree};
    use crate::types::{CategoryId, ProductId};

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn product(name: &str, price: i64, category: &str, sub: Option<&str>) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_owned(),
            description: String::new(),
            price: Price::new(price).unwrap(),
            image: String::new(),
            image2: None,
            image3: None,
            category: category.to_owned(),
            subcategory: sub.map(str::to_owned),
            in_stock: true,
            created_at: epoch(),
        }
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    fn prices(products: &[Product]) -> Vec<i64> {
        products.iter().map(|p| p.price.rubles()).collect()
    }

    fn three_prices() -> Vec<Product> {
        vec![
            product("Футболка", 1890, "Одежда", None),
            product("Наушники", 5990, "Электроника", None),
            product("Кружка", 2990, "Посуда", None),
        ]
    }

    #[test]
    fn test_price_range_keeps_input_order_without_sort() {
        let mut filter = FilterState::new();
        filter.set_price_range(Some(2000), Some(6000));
        let shown = apply(&three_prices(), &filter, "");
        assert_eq!(prices(&shown), vec![5990, 2990]);
    }

    #[test]
    fn test_price_range_sorted_ascending() {
        let mut filter = FilterState::new();
        filter.set_price_range(Some(2000), Some(6000));
        filter.set_sort(Some(SortKey::Price), SortDirection::Asc);
        let shown = apply(&three_prices(), &filter, "");
        assert_eq!(prices(&shown), vec![2990, 5990]);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let mut filter = FilterState::new();
        filter.set_price_range(Some(1890), Some(2990));
        let shown = apply(&three_prices(), &filter, "");
        assert_eq!(prices(&shown), vec![1890, 2990]);
    }

    #[test]
    fn test_subcategory_takes_precedence_over_category() {
        let root = Category {
            id: CategoryId::generate(),
            name: "Электроника".to_owned(),
            parent_id: None,
        };
        let sub = Category {
            id: CategoryId::generate(),
            name: "Наушники".to_owned(),
            parent_id: Some(root.id),
        };
        let tree = CategoryTree::build(vec![root, sub]);

        let products = vec![
            product("AirPods", 15000, "Электроника", Some("Наушники")),
            product("Зарядка", 900, "Электроника", Some("Зарядки")),
            product("Свитер", 3000, "Одежда", None),
        ];

        let mut filter = FilterState::new();
        filter.select_category("Электроника");
        assert_eq!(names(&apply(&products, &filter, "")), vec!["AirPods", "Зарядка"]);

        filter.select_subcategory(&tree, "Наушники").unwrap();
        assert_eq!(names(&apply(&products, &filter, "")), vec!["AirPods"]);
    }

    #[test]
    fn test_search_matches_name_or_description_case_insensitively() {
        let mut with_description = product("Кружка", 500, "Посуда", None);
        with_description.description = "Большая КЕРАМИЧЕСКАЯ кружка".to_owned();
        let products = vec![with_description, product("Керамическая ваза", 900, "Дом", None)];

        let shown = apply(&products, &FilterState::new(), "  керамическ ");
        assert_eq!(shown.len(), 2);

        let shown = apply(&products, &FilterState::new(), "ВАЗА");
        assert_eq!(names(&shown), vec!["Керамическая ваза"]);

        assert!(apply(&products, &FilterState::new(), "телефон").is_empty());
    }

    #[test]
    fn test_narrowing_is_idempotent() {
        let mut filter = FilterState::new();
        filter.select_category("Электроника");
        filter.set_price_range(Some(1000), None);
        let products = vec![
            product("A", 500, "Электроника", None),
            product("B", 1500, "Электроника", None),
            product("C", 2500, "Одежда", None),
            product("D", 9000, "Электроника", None),
        ];
        let once = apply(&products, &filter, "");
        let twice = apply(&once, &filter, "");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        let products = vec![
            product("первый", 100, "X", None),
            product("второй", 100, "X", None),
            product("третий", 50, "X", None),
        ];
        let mut filter = FilterState::new();
        filter.set_sort(Some(SortKey::Price), SortDirection::Asc);
        assert_eq!(
            names(&apply(&products, &filter, "")),
            vec!["третий", "первый", "второй"]
        );

        filter.set_sort(Some(SortKey::Price), SortDirection::Desc);
        assert_eq!(
            names(&apply(&products, &filter, "")),
            vec!["первый", "второй", "третий"]
        );
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let products = vec![
            product("яблоко", 1, "X", None),
            product("Апельсин", 1, "X", None),
            product("банан", 1, "X", None),
        ];
        let mut filter = FilterState::new();
        filter.set_sort(Some(SortKey::Name), SortDirection::Asc);
        assert_eq!(
            names(&apply(&products, &filter, "")),
            vec!["Апельсин", "банан", "яблоко"]
        );
    }

    #[test]
    fn test_sort_by_date_uses_created_at() {
        let mut old = product("старый", 1, "X", None);
        old.created_at = epoch() - Duration::days(3);
        let mut new = product("новый", 1, "X", None);
        new.created_at = epoch();
        let products = vec![old, new];

        let mut filter = FilterState::new();
        filter.set_sort(Some(SortKey::Date), SortDirection::Desc);
        assert_eq!(names(&apply(&products, &filter, "")), vec!["новый", "старый"]);
        filter.set_sort(Some(SortKey::Date), SortDirection::Asc);
        assert_eq!(names(&apply(&products, &filter, "")), vec!["старый", "новый"]);
    }

    #[test]
    fn test_empty_result_is_valid() {
        let mut filter = FilterState::new();
        filter.select_category("Нет такой");
        assert!(apply(&three_prices(), &filter, "").is_empty());
        assert!(apply(&[], &FilterState::new(), "").is_empty());
    }

    #[test]
    fn test_price_stats() {
        let stats = PriceStats::of(&three_prices()).unwrap();
        assert_eq!(stats.min.rubles(), 1890);
        assert_eq!(stats.max.rubles(), 5990);
        assert_eq!(PriceStats::of(&[]), None);
    }
}
