//! # Definition Tables
//!
//! Typed lookup tables keyed by case-insensitive id, and the trait that
//! maps each definition type to its table inside a [`Library`].

use std::collections::BTreeMap;

use mission_domain::{
    CoalitionDefinition, Definition, FeatureDefinition, LanguageDefinition, ObjectiveDefinition,
    TheaterDefinition, UnitDefinition,
};

use crate::Library;
use crate::error::{LibraryError, Result};

/// Immutable table of one definition type
#[derive(Debug, Clone)]
pub struct DefinitionTable<T> {
    entries: BTreeMap<String, T>,
}

impl<T: Definition> DefinitionTable<T> {
    /// Build a table, rejecting ids that collide case-insensitively
    pub fn from_definitions(definitions: Vec<T>) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for definition in definitions {
            let key = normalize(definition.id());
            if entries.contains_key(&key) {
                return Err(LibraryError::DuplicateId {
                    kind: T::KIND,
                    id: definition.id().to_string(),
                });
            }
            entries.insert(key, definition);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(&normalize(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(&normalize(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for DefinitionTable<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

fn normalize(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Definition types stored in the library
pub trait LibraryTable: Definition + Sized + 'static {
    fn table(library: &Library) -> &DefinitionTable<Self>;
}

impl LibraryTable for TheaterDefinition {
    fn table(library: &Library) -> &DefinitionTable<Self> {
        &library.theaters
    }
}

impl LibraryTable for UnitDefinition {
    fn table(library: &Library) -> &DefinitionTable<Self> {
        &library.units
    }
}

impl LibraryTable for CoalitionDefinition {
    fn table(library: &Library) -> &DefinitionTable<Self> {
        &library.coalitions
    }
}

impl LibraryTable for ObjectiveDefinition {
    fn table(library: &Library) -> &DefinitionTable<Self> {
        &library.objectives
    }
}

impl LibraryTable for LanguageDefinition {
    fn table(library: &Library) -> &DefinitionTable<Self> {
        &library.languages
    }
}

impl LibraryTable for FeatureDefinition {
    fn table(library: &Library) -> &DefinitionTable<Self> {
        &library.features
    }
}
