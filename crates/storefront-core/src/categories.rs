use serde::{Deserialize, Serialize};

/// Slug of the catch-all bucket the commerce API assigns to products without
/// a category. It is never shown in the category tree.
pub const UNCATEGORIZED_SLUG: &str = "uncategorized";

/// A category as returned by the commerce API's `/categories` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    /// Id of the parent category; `0` for top-level categories.
    #[serde(default)]
    pub parent: i64,
    /// Number of products in this category (not including subcategories).
    #[serde(default)]
    pub count: u64,
    /// Raw HTML description. May be `null`, absent or empty.
    #[serde(default)]
    pub description: Option<String>,
}

impl Category {
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.parent == 0
    }

    #[must_use]
    pub fn is_uncategorized(&self) -> bool {
        self.slug == UNCATEGORIZED_SLUG
    }
}

/// A [`Category`] with its subcategories attached, as produced by
/// [`crate::build_category_tree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchicalCategory {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<HierarchicalCategory>,
}

impl HierarchicalCategory {
    #[must_use]
    pub fn new(category: Category) -> Self {
        Self {
            category,
            children: Vec::new(),
        }
    }

    /// Sum of `count` over this node and every descendant.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.category.count
            + self
                .children
                .iter()
                .map(HierarchicalCategory::total_count)
                .sum::<u64>()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
