//! Category catalogs feeding the image queue
//!
//! A catalog maps category names to ordered lists of opaque item
//! identifiers (usually image locators). The engine only relies on the
//! length and order of a list, it never interprets the identifiers.

use garde::Validate;
use heck::ToTitleCase;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{config::Error, constants::catalog};

/// Catalog shipped with the crate, the three classic picture categories
const BUILTIN_CATALOG: &str = include_str!("../data/categories.json");

/// A named, ordered list of items that make up one round's queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Category {
    /// Key used to select the category
    #[garde(length(chars, min = 1, max = catalog::MAX_NAME_LENGTH))]
    name: String,
    /// Item identifiers in presentation order
    #[garde(
        length(min = 1, max = catalog::MAX_ITEM_COUNT),
        inner(length(min = 1, max = catalog::MAX_ITEM_LENGTH))
    )]
    items: Vec<String>,
}

impl Category {
    /// Creates a category from its name and items
    pub fn new<I, S>(name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            items: items.into_iter().map(Into::into).collect_vec(),
        }
    }

    /// Key used to select the category
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human readable name, `Iconic_World_Landmarks` becomes `Iconic World Landmarks`
    pub fn display_name(&self) -> String {
        self.name.to_title_case()
    }

    /// Item identifiers in presentation order
    pub fn items(&self) -> &[String] {
        &self.items
    }
}

fn unique_names(categories: &[Category], _ctx: &()) -> garde::Result {
    match categories.iter().map(Category::name).duplicates().next() {
        Some(name) => Err(garde::Error::new(format!("duplicate category `{name}`"))),
        None => Ok(()),
    }
}

/// The full set of categories a game can choose from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Catalog {
    #[garde(
        length(min = 1, max = catalog::MAX_CATEGORY_COUNT),
        custom(|v: &Vec<Category>, ctx: &()| unique_names(v, ctx)),
        dive
    )]
    categories: Vec<Category>,
}

impl Catalog {
    /// Builds and validates a catalog from categories
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCatalog`] if there are no categories, a
    /// category is empty, or two categories share a name.
    pub fn new(categories: Vec<Category>) -> Result<Self, Error> {
        let catalog = Self { categories };
        catalog.validate().map_err(Error::InvalidCatalog)?;
        Ok(catalog)
    }

    /// Parses and validates a catalog from JSON
    ///
    /// The expected shape is `{"categories": [{"name": ..., "items": [...]}]}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed input and
    /// [`Error::InvalidCatalog`] when the content is unusable.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate().map_err(Error::InvalidCatalog)?;
        Ok(catalog)
    }

    /// The catalog bundled with the crate
    ///
    /// # Errors
    ///
    /// Only fails if the bundled data file is corrupt.
    pub fn builtin() -> Result<Self, Error> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Looks up a category by its key
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Whether a category with this key exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The first category, selected by default in a fresh game
    pub fn first(&self) -> Option<&Category> {
        self.categories.first()
    }

    /// All categories in catalog order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}
