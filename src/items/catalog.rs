//! Item catalog
//!
//! Read-only lookup from item id to its static definition. The data source
//! is external; `ItemCatalog` is an in-memory table that can be filled in
//! code or loaded from a RON file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use thiserror::Error;

use super::item::{ItemDefinition, ItemId};

/// Read-only item definition lookup
pub trait Catalog {
    fn definition(&self, id: &str) -> Option<&ItemDefinition>;

    /// Max stack size for `id`, or None for unknown items
    fn max_stack(&self, id: &str) -> Option<u32> {
        self.definition(id).map(|d| d.max_stack)
    }

    fn contains(&self, id: &str) -> bool {
        self.definition(id).is_some()
    }
}

/// Catalog construction errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate item id `{0}`")]
    DuplicateId(ItemId),
    #[error("item `{0}` has a max stack of zero")]
    ZeroStack(ItemId),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// In-memory item table
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    definitions: HashMap<ItemId, ItemDefinition>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition, rejecting duplicates and empty stacks
    pub fn insert(&mut self, definition: ItemDefinition) -> Result<(), CatalogError> {
        if definition.max_stack == 0 {
            return Err(CatalogError::ZeroStack(definition.id));
        }
        if self.definitions.contains_key(&definition.id) {
            return Err(CatalogError::DuplicateId(definition.id));
        }
        self.definitions.insert(definition.id.clone(), definition);
        Ok(())
    }

    /// Builder-style insert for catalogs assembled in code
    pub fn with(mut self, definition: ItemDefinition) -> Result<Self, CatalogError> {
        self.insert(definition)?;
        Ok(self)
    }

    /// Parse a RON list of definitions
    pub fn from_ron(source: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<ItemDefinition> = ron::from_str(source)?;
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.insert(definition)?;
        }
        Ok(catalog)
    }

    /// Load a RON catalog file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        let catalog = Self::from_ron(&content)
            .with_context(|| format!("invalid catalog {}", path.display()))?;
        log::info!("Loaded {} item definitions from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Catalog for ItemCatalog {
    fn definition(&self, id: &str) -> Option<&ItemDefinition> {
        self.definitions.get(id)
    }
}
