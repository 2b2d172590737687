//! Options catalog and label/code lookup
//!
//! The catalog is static reference data listing the valid games, platforms,
//! providers and locations. Forms carry human-facing labels; API payloads carry
//! the internal codes (`identifier`). [`CatalogIndex`] translates between them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One selectable catalog value
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Internal code used in API payloads
    pub identifier: String,
    /// Display label used in forms
    pub label: String,
}

impl CatalogEntry {
    pub fn new(identifier: &str, label: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            label: label.to_string(),
        }
    }
}

/// Catalog categories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Game,
    Platform,
    Provider,
    Location,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Game,
        Category::Platform,
        Category::Provider,
        Category::Location,
    ];

    /// Key of the category in the options document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Game => "games",
            Category::Platform => "platforms",
            Category::Provider => "providers",
            Category::Location => "locations",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The options document: category name to ordered entries
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsCatalog {
    pub games: Vec<CatalogEntry>,
    pub platforms: Vec<CatalogEntry>,
    pub providers: Vec<CatalogEntry>,
    pub locations: Vec<CatalogEntry>,
}

impl OptionsCatalog {
    pub fn entries(&self, category: Category) -> &[CatalogEntry] {
        match category {
            Category::Game => &self.games,
            Category::Platform => &self.platforms,
            Category::Provider => &self.providers,
            Category::Location => &self.locations,
        }
    }

    /// Labels of a category in catalog order, for populating form choices.
    pub fn labels(&self, category: Category) -> Vec<&str> {
        self.entries(category)
            .iter()
            .map(|e| e.label.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.entries(*c).is_empty())
    }
}

/// Failed label or code lookup
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("unknown {category} label: {label}")]
    UnknownLabel { category: Category, label: String },

    #[error("unknown {category} code: {code}")]
    UnknownCode { category: Category, code: String },
}

#[derive(Clone, Debug, Default)]
struct CategoryIndex {
    by_label: HashMap<String, String>,
    by_code: HashMap<String, String>,
}

/// Bidirectional label/code table built once from an [`OptionsCatalog`].
///
/// When a label or code appears more than once the first entry wins.
#[derive(Clone, Debug, Default)]
pub struct CatalogIndex {
    categories: HashMap<Category, CategoryIndex>,
}

impl CatalogIndex {
    pub fn new(catalog: &OptionsCatalog) -> Self {
        let mut categories = HashMap::new();

        for category in Category::ALL {
            let mut index = CategoryIndex::default();
            for entry in catalog.entries(category) {
                if index.by_label.contains_key(&entry.label) {
                    warn!("Duplicate {} label '{}' ignored", category, entry.label);
                } else {
                    index
                        .by_label
                        .insert(entry.label.clone(), entry.identifier.clone());
                }

                if index.by_code.contains_key(&entry.identifier) {
                    warn!("Duplicate {} code '{}' ignored", category, entry.identifier);
                } else {
                    index
                        .by_code
                        .insert(entry.identifier.clone(), entry.label.clone());
                }
            }
            categories.insert(category, index);
        }

        Self { categories }
    }

    /// Translate a display label into its API code.
    pub fn code_for(&self, category: Category, label: &str) -> Result<&str, LookupError> {
        self.categories
            .get(&category)
            .and_then(|index| index.by_label.get(label))
            .map(String::as_str)
            .ok_or_else(|| LookupError::UnknownLabel {
                category,
                label: label.to_string(),
            })
    }

    /// Translate an API code back into its display label.
    pub fn label_for(&self, category: Category, code: &str) -> Result<&str, LookupError> {
        self.categories
            .get(&category)
            .and_then(|index| index.by_code.get(code))
            .map(String::as_str)
            .ok_or_else(|| LookupError::UnknownCode {
                category,
                code: code.to_string(),
            })
    }
}

impl From<&OptionsCatalog> for CatalogIndex {
    fn from(catalog: &OptionsCatalog) -> Self {
        Self::new(catalog)
    }
}
