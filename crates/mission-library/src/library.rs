//! Library construction and startup checks.

use std::fs;
use std::path::Path;

use mission_domain::{
    CoalitionDefinition, Definition, FeatureDefinition, LanguageDefinition, ObjectiveDefinition,
    TheaterDefinition, UnitDefinition, UnitFamily,
};
use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, Result};
use crate::table::{DefinitionTable, LibraryTable};

/// Ids of the definitions that must exist before any generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDefaults {
    pub theater: String,
    pub coalition_blue: String,
    pub coalition_red: String,
    pub language: String,
    pub objective: String,
    pub player_aircraft: String,
}

/// Raw, unchecked content of a definition bundle file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionBundle {
    pub defaults: LibraryDefaults,
    #[serde(default)]
    pub theaters: Vec<TheaterDefinition>,
    #[serde(default)]
    pub units: Vec<UnitDefinition>,
    #[serde(default)]
    pub coalitions: Vec<CoalitionDefinition>,
    #[serde(default)]
    pub objectives: Vec<ObjectiveDefinition>,
    #[serde(default)]
    pub languages: Vec<LanguageDefinition>,
    #[serde(default)]
    pub features: Vec<FeatureDefinition>,
}

/// Read-only definition library, shared by every generation run
#[derive(Debug, Clone)]
pub struct Library {
    pub(crate) theaters: DefinitionTable<TheaterDefinition>,
    pub(crate) units: DefinitionTable<UnitDefinition>,
    pub(crate) coalitions: DefinitionTable<CoalitionDefinition>,
    pub(crate) objectives: DefinitionTable<ObjectiveDefinition>,
    pub(crate) languages: DefinitionTable<LanguageDefinition>,
    pub(crate) features: DefinitionTable<FeatureDefinition>,
    defaults: LibraryDefaults,
}

impl Library {
    /// Load and check a JSON definition bundle
    ///
    /// # Errors
    ///
    /// Any error here is fatal: the process must not start generating.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LibraryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let library = Self::from_json_str(&content)?;
        tracing::info!(path = %path.display(), "Definition library loaded");
        Ok(library)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let bundle: DefinitionBundle = serde_json::from_str(json)?;
        Self::from_bundle(bundle)
    }

    /// Build the lookup tables and run the startup checks
    pub fn from_bundle(bundle: DefinitionBundle) -> Result<Self> {
        for theater in &bundle.theaters {
            theater
                .validate()
                .map_err(|source| LibraryError::InvalidDefinition {
                    kind: TheaterDefinition::KIND,
                    id: theater.id.clone(),
                    source,
                })?;
        }

        let library = Self {
            theaters: DefinitionTable::from_definitions(bundle.theaters)?,
            units: DefinitionTable::from_definitions(bundle.units)?,
            coalitions: DefinitionTable::from_definitions(bundle.coalitions)?,
            objectives: DefinitionTable::from_definitions(bundle.objectives)?,
            languages: DefinitionTable::from_definitions(bundle.languages)?,
            features: DefinitionTable::from_definitions(bundle.features)?,
            defaults: bundle.defaults,
        };

        library.check_defaults()?;
        library.warn_dangling_unit_references();

        tracing::debug!(
            theaters = library.theaters.len(),
            units = library.units.len(),
            coalitions = library.coalitions.len(),
            objectives = library.objectives.len(),
            languages = library.languages.len(),
            features = library.features.len(),
            "Definition library built"
        );

        Ok(library)
    }

    fn check_defaults(&self) -> Result<()> {
        let d = &self.defaults;
        require::<TheaterDefinition>(self, &d.theater)?;
        require::<CoalitionDefinition>(self, &d.coalition_blue)?;
        require::<CoalitionDefinition>(self, &d.coalition_red)?;
        require::<LanguageDefinition>(self, &d.language)?;
        require::<ObjectiveDefinition>(self, &d.objective)?;
        let aircraft = require::<UnitDefinition>(self, &d.player_aircraft)?;
        if !aircraft.player_controllable {
            return Err(LibraryError::DefaultAircraftNotControllable(
                d.player_aircraft.clone(),
            ));
        }
        Ok(())
    }

    /// Unknown unit ids in coalition tables are skipped at generation time
    fn warn_dangling_unit_references(&self) {
        for coalition in self.coalitions.iter() {
            for (family, ids) in &coalition.units {
                for id in ids.iter().filter(|id| !self.units.contains(id)) {
                    tracing::warn!(
                        coalition = %coalition.id,
                        ?family,
                        unit = %id,
                        "Coalition references an unknown unit"
                    );
                }
            }
        }
    }

    pub fn get<T: LibraryTable>(&self, id: &str) -> Option<&T> {
        T::table(self).get(id)
    }

    pub fn all<T: LibraryTable>(&self) -> impl Iterator<Item = &T> {
        T::table(self).iter()
    }

    pub const fn defaults(&self) -> &LibraryDefaults {
        &self.defaults
    }

    pub fn units_with_family(&self, family: UnitFamily) -> impl Iterator<Item = &UnitDefinition> {
        self.units.iter().filter(move |u| u.has_family(family))
    }

    pub fn player_aircraft(&self) -> impl Iterator<Item = &UnitDefinition> {
        self.units.iter().filter(|u| u.player_controllable)
    }
}

fn require<'a, T: LibraryTable>(library: &'a Library, id: &str) -> Result<&'a T> {
    library.get::<T>(id).ok_or_else(|| LibraryError::MissingDefault {
        kind: T::KIND,
        id: id.to_string(),
    })
}
