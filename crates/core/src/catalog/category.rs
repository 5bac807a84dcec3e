//! Categories and the two-level category tree.
//!
//! Categories are stored flat with an optional parent link. The catalog only
//! understands two levels (root categories and their subcategories), so the
//! tree builder sets aside anything that does not fit that shape instead of
//! guessing where it belongs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::compare_names;
use crate::types::CategoryId;

/// A category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// `None` for root categories.
    pub parent_id: Option<CategoryId>,
}

impl Category {
    /// Whether this is a top-level category.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Why a category was left out of the tree.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CategoryTreeError {
    /// The parent is itself a subcategory.
    #[error("parent category {parent} is not a root category")]
    NestedTooDeep { parent: CategoryId },
    /// The parent id does not match any category.
    #[error("parent category {parent} does not exist")]
    MissingParent { parent: CategoryId },
}

/// A root category with its subcategories, both sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Category>,
}

/// A category that could not be placed in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedCategory {
    pub category: Category,
    #[serde(flatten)]
    pub reason: CategoryTreeError,
}

/// Two-level category tree built from the flat table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTree {
    roots: Vec<CategoryNode>,
    rejected: Vec<RejectedCategory>,
}

impl CategoryTree {
    /// Build the tree from every category row.
    #[must_use]
    pub fn build(categories: Vec<Category>) -> Self {
        let by_id: HashMap<CategoryId, bool> = categories
            .iter()
            .map(|category| (category.id, category.is_root()))
            .collect();

        let mut roots = Vec::new();
        let mut children: HashMap<CategoryId, Vec<Category>> = HashMap::new();
        let mut rejected = Vec::new();

        for category in categories {
            let Some(parent) = category.parent_id else {
                roots.push(category);
                continue;
            };
            match by_id.get(&parent) {
                Some(true) => children.entry(parent).or_default().push(category),
                Some(false) => rejected.push(RejectedCategory {
                    category,
                    reason: CategoryTreeError::NestedTooDeep { parent },
                }),
                None => rejected.push(RejectedCategory {
                    category,
                    reason: CategoryTreeError::MissingParent { parent },
                }),
            }
        }

        roots.sort_by(|a, b| compare_names(&a.name, &b.name));
        let roots = roots
            .into_iter()
            .map(|category| {
                let mut subcategories = children.remove(&category.id).unwrap_or_default();
                subcategories.sort_by(|a, b| compare_names(&a.name, &b.name));
                CategoryNode {
                    category,
                    subcategories,
                }
            })
            .collect();

        Self { roots, rejected }
    }

    /// Root categories in display order.
    #[must_use]
    pub fn roots(&self) -> &[CategoryNode] {
        &self.roots
    }

    /// Categories that did not fit the two-level shape.
    #[must_use]
    pub fn rejected(&self) -> &[RejectedCategory] {
        &self.rejected
    }

    /// Find the root category that owns a subcategory with this name.
    #[must_use]
    pub fn parent_of(&self, subcategory: &str) -> Option<&Category> {
        self.roots
            .iter()
            .find(|node| node.subcategories.iter().any(|sub| sub.name == subcategory))
            .map(|node| &node.category)
    }
}

/// Errors from validating a [`CategoryInput`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CategoryInputError {
    #[error("category name is required")]
    EmptyName,
    #[error("a category cannot be its own parent")]
    SelfParent,
    #[error("parent category does not exist")]
    UnknownParent,
    #[error("parent must be a root category")]
    ParentNotRoot,
    #[error("a category with subcategories cannot become a subcategory")]
    HasSubcategories,
}

/// Category form as submitted by the admin panel.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

/// A validated category ready to be written by a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

impl CategoryInput {
    /// Validate against the existing categories.
    ///
    /// `editing` is the id of the category being updated, or `None` when
    /// creating a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the parent would break the
    /// two-level shape.
    pub fn validate(
        self,
        existing: &[Category],
        editing: Option<CategoryId>,
    ) -> Result<CategoryDraft, CategoryInputError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(CategoryInputError::EmptyName);
        }

        if let Some(parent_id) = self.parent_id {
            if editing == Some(parent_id) {
                return Err(CategoryInputError::SelfParent);
            }
            let parent = existing
                .iter()
                .find(|category| category.id == parent_id)
                .ok_or(CategoryInputError::UnknownParent)?;
            if !parent.is_root() {
                return Err(CategoryInputError::ParentNotRoot);
            }
            if let Some(id) = editing
                && existing.iter().any(|category| category.parent_id == Some(id))
            {
                return Err(CategoryInputError::HasSubcategories);
            }
        }

        Ok(CategoryDraft {
            name,
            parent_id: self.parent_id,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn category(name: &str, parent: Option<&Category>) -> Category {
        Category {
            id: CategoryId::generate(),
            name: name.to_owned(),
            parent_id: parent.map(|p| p.id),
        }
    }

    #[test]
    fn test_build_sorts_roots_and_children() {
        let tech = category("Электроника", None);
        let home = category("Дом", None);
        let phones = category("Телефоны", Some(&tech));
        let audio = category("Аудио", Some(&tech));

        let tree = CategoryTree::build(vec![tech, phones, home, audio]);
        let names: Vec<_> = tree.roots().iter().map(|n| n.category.name.as_str()).collect();
        assert_eq!(names, vec!["Дом", "Электроника"]);

        let subs: Vec<_> = tree.roots()[1]
            .subcategories
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(subs, vec!["Аудио", "Телефоны"]);
        assert!(tree.rejected().is_empty());
    }

    #[test]
    fn test_build_rejects_deep_and_orphan_categories() {
        let root = category("Одежда", None);
        let sub = category("Обувь", Some(&root));
        let deep = category("Кеды", Some(&sub));
        let orphan = Category {
            id: CategoryId::generate(),
            name: "Сирота".to_owned(),
            parent_id: Some(CategoryId::generate()),
        };

        let tree = CategoryTree::build(vec![root, sub.clone(), deep, orphan]);
        assert_eq!(tree.roots().len(), 1);
        assert_eq!(tree.roots()[0].subcategories.len(), 1);

        let reasons: Vec<_> = tree.rejected().iter().map(|r| r.reason).collect();
        assert_eq!(reasons.len(), 2);
        assert!(reasons.contains(&CategoryTreeError::NestedTooDeep { parent: sub.id }));
        assert!(
            reasons
                .iter()
                .any(|r| matches!(r, CategoryTreeError::MissingParent { .. }))
        );
    }

    #[test]
    fn test_self_parented_category_is_rejected() {
        let id = CategoryId::generate();
        let tree = CategoryTree::build(vec![Category {
            id,
            name: "Петля".to_owned(),
            parent_id: Some(id),
        }]);
        assert!(tree.roots().is_empty());
        assert_eq!(
            tree.rejected()[0].reason,
            CategoryTreeError::NestedTooDeep { parent: id }
        );
    }

    #[test]
    fn test_lookups() {
        let root = category("Книги", None);
        let sub = category("Фантастика", Some(&root));
        let tree = CategoryTree::build(vec![root.clone(), sub]);

        assert_eq!(tree.roots().len(), 1);
        assert_eq!(tree.roots()[0].category.name, "Книги");
        assert_eq!(tree.parent_of("Фантастика"), Some(&root));
        assert_eq!(tree.parent_of("Поэзия"), None);
    }

    #[test]
    fn test_validate_input() {
        let root = category("Книги", None);
        let sub = category("Фантастика", Some(&root));
        let existing = vec![root.clone(), sub.clone()];

        let blank = CategoryInput {
            name: "  ".to_owned(),
            parent_id: None,
        };
        assert_eq!(
            blank.validate(&existing, None),
            Err(CategoryInputError::EmptyName)
        );

        let under_sub = CategoryInput {
            name: "Киберпанк".to_owned(),
            parent_id: Some(sub.id),
        };
        assert_eq!(
            under_sub.validate(&existing, None),
            Err(CategoryInputError::ParentNotRoot)
        );

        let own_parent = CategoryInput {
            name: "Книги".to_owned(),
            parent_id: Some(root.id),
        };
        assert_eq!(
            own_parent.validate(&existing, Some(root.id)),
            Err(CategoryInputError::SelfParent)
        );

        let unknown = CategoryInput {
            name: "Журналы".to_owned(),
            parent_id: Some(CategoryId::generate()),
        };
        assert_eq!(
            unknown.validate(&existing, None),
            Err(CategoryInputError::UnknownParent)
        );

        let ok = CategoryInput {
            name: " Поэзия ".to_owned(),
            parent_id: Some(root.id),
        };
        let draft = ok.validate(&existing, None).unwrap();
        assert_eq!(draft.name, "Поэзия");
        assert_eq!(draft.parent_id, Some(root.id));
    }

    #[test]
    fn test_root_with_children_cannot_be_nested() {
        let books = category("Книги", None);
        let sub = category("Фантастика", Some(&books));
        let music = category("Музыка", None);
        let existing = vec![books.clone(), sub, music.clone()];

        let input = CategoryInput {
            name: "Книги".to_owned(),
            parent_id: Some(music.id),
        };
        assert_eq!(
            input.validate(&existing, Some(books.id)),
            Err(CategoryInputError::HasSubcategories)
        );
    }
}
