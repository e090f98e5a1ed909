//! Read-only menu data.
//!
//! A [`Catalog`] is loaded once per ordering destination and never mutated
//! by the dialog engine. [`CatalogDirectory`] maps the dialed number to the
//! catalog that answers it.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CallOrderError, Result};

/// One selectable value of a [`MenuOption`], e.g. "1: Steamed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChoice {
    /// Short code the caller can key or say, usually a single digit.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price_extra: f64,
}

/// A configurable aspect of a dish, e.g. "Noodle Width".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuOption {
    pub name: String,
    pub choices: Vec<OptionChoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<MenuOption>,
}

impl MenuItem {
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }
}

/// Menu for a single ordering destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub id: String,
    /// Restaurant name spoken in greetings and stored on orders.
    pub name: String,
    /// Callee address (E.164 phone number) routed to this catalog.
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
    #[serde(default)]
    pub categories: BTreeSet<String>,
}

impl Catalog {
    /// Build a catalog, deriving the category set from the items.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        phone_number: impl Into<String>,
        items: Vec<MenuItem>,
    ) -> Self {
        let mut catalog = Self {
            id: id.into(),
            name: name.into(),
            phone_number: phone_number.into(),
            items,
            categories: BTreeSet::new(),
        };
        catalog.collect_categories();
        catalog
    }

    /// Exact id lookup.
    pub fn find_item(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Condensed "id: name (category)" listing, one item per line.
    pub fn condensed_listing(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{}: {} ({})", item.id, item.name, item.category))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check the structural rules every catalog must satisfy.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(item.id.as_str()) {
                return Err(CallOrderError::Catalog(format!(
                    "catalog {}: duplicate item id {}",
                    self.id, item.id
                )));
            }
            if item.price <= 0.0 {
                return Err(CallOrderError::Catalog(format!(
                    "catalog {}: item {} must have a positive price",
                    self.id, item.id
                )));
            }
            for option in &item.options {
                if option.choices.is_empty() {
                    return Err(CallOrderError::Catalog(format!(
                        "catalog {}: option '{}' of item {} has no choices",
                        self.id, option.name, item.id
                    )));
                }
                if let Some(choice) = option.choices.iter().find(|c| c.price_extra < 0.0) {
                    return Err(CallOrderError::Catalog(format!(
                        "catalog {}: choice '{}' of item {} has a negative price extra",
                        self.id, choice.name, item.id
                    )));
                }
            }
        }
        Ok(())
    }

    fn collect_categories(&mut self) {
        for item in &self.items {
            if !item.category.is_empty() {
                self.categories.insert(item.category.clone());
            }
        }
    }
}

/// All catalogs known to this deployment, keyed by callee address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDirectory {
    #[serde(default)]
    pub catalogs: Vec<Catalog>,
}

impl CatalogDirectory {
    /// Load and validate a catalog directory from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let directory = Self::from_toml_str(&content)?;
        info!(
            catalogs = directory.catalogs.len(),
            "Catalog directory loaded from {}",
            path.display()
        );
        Ok(directory)
    }

    /// Parse and validate a catalog directory from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut directory: CatalogDirectory = toml::from_str(content)?;
        for catalog in &mut directory.catalogs {
            catalog.collect_categories();
            catalog.validate()?;
        }
        Ok(directory)
    }

    /// Find the catalog answering calls to `callee`.
    pub fn find_by_callee(&self, callee: &str) -> Option<&Catalog> {
        self.catalogs.iter().find(|c| c.phone_number == callee)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Catalog> {
        self.catalogs.iter().find(|c| c.id == id)
    }
}
