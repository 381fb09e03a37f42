//! Immutable definitions loaded once into the definition library.
//!
//! Every definition is identified by a string id compared
//! case-insensitively.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    CallsignStyle, Coalition, Coordinates, DomainError, ENVIRONMENT_LEVELS, NodeCategory,
    PerMonth, Precipitation, Side, SpawnPointType, UnitFamily, UnitSystem, ValueRange,
};

/// Common behaviour of library definitions
pub trait Definition {
    /// Human-readable kind used in error messages ("theater", "unit", ...)
    const KIND: &'static str;

    fn id(&self) -> &str;

    fn display_name(&self) -> &str;
}

// =============================================================================
// THEATER
// =============================================================================

/// A spawn-capable point; belongs to exactly one [`TheaterNode`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub id: String,
    pub coordinates: Coordinates,
    pub point_type: SpawnPointType,
}

/// Named location of a theater (airbase or other location)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheaterNode {
    pub id: String,
    pub name: String,
    pub category: NodeCategory,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub default_coalition: Option<Coalition>,
    #[serde(default)]
    pub atc_frequency_mhz: Option<f32>,
    #[serde(default)]
    pub elevation_ft: f64,
    #[serde(default)]
    pub spawn_points: Vec<SpawnPoint>,
}

impl TheaterNode {
    pub fn is_airbase(&self) -> bool {
        self.category == NodeCategory::Airbase
    }
}

/// Sunrise and sunset in minutes after midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaylightWindow {
    pub sunrise_min: u32,
    pub sunset_min: u32,
}

impl DaylightWindow {
    pub const fn noon_min(&self) -> u32 {
        (self.sunrise_min + self.sunset_min) / 2
    }
}

/// Weather parameters for one weather level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPreset {
    pub cloud_base_m: ValueRange<f64>,
    /// Cloud density on a 0..=10 scale
    pub cloud_density: ValueRange<u32>,
    #[serde(default)]
    pub precipitation: Precipitation,
    #[serde(default)]
    pub fog_visibility_m: Option<ValueRange<f64>>,
    pub qnh_mmhg: ValueRange<f64>,
}

/// Wind parameters for one wind level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindPreset {
    pub speed_mps: ValueRange<f64>,
    pub turbulence_mps: ValueRange<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheaterDefinition {
    pub id: String,
    pub display_name: String,
    pub default_map_center: Coordinates,
    #[serde(default)]
    pub magnetic_variation_deg: f64,
    pub nodes: Vec<TheaterNode>,
    /// One preset per weather level, calmest first
    pub weather: Vec<WeatherPreset>,
    /// One preset per wind level, calmest first
    pub wind: Vec<WindPreset>,
    pub daylight: PerMonth<DaylightWindow>,
    pub temperature_c: PerMonth<ValueRange<i32>>,
}

impl TheaterDefinition {
    /// Check table lengths and id uniqueness
    pub fn validate(&self) -> Result<(), DomainError> {
        for (table, found) in [("weather", self.weather.len()), ("wind", self.wind.len())] {
            if found != ENVIRONMENT_LEVELS {
                return Err(DomainError::TableLength {
                    table,
                    expected: ENVIRONMENT_LEVELS,
                    found,
                });
            }
        }

        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.to_lowercase()) {
                return Err(DomainError::DuplicateId {
                    entity_type: "theater node".to_string(),
                    id: node.id.clone(),
                });
            }
        }

        let mut spawn_ids = HashSet::new();
        for (_, point) in self.spawn_points() {
            if !spawn_ids.insert(point.id.as_str()) {
                return Err(DomainError::DuplicateId {
                    entity_type: "spawn point".to_string(),
                    id: point.id.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&TheaterNode> {
        self.nodes.iter().find(|n| n.id.eq_ignore_ascii_case(id))
    }

    pub fn airbases(&self) -> impl Iterator<Item = &TheaterNode> {
        self.nodes.iter().filter(|n| n.is_airbase())
    }

    /// Every spawn point with the node that owns it
    pub fn spawn_points(&self) -> impl Iterator<Item = (&TheaterNode, &SpawnPoint)> {
        self.nodes
            .iter()
            .flat_map(|node| node.spawn_points.iter().map(move |sp| (node, sp)))
    }
}

impl Definition for TheaterDefinition {
    const KIND: &'static str = "theater";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }
}

// =============================================================================
// UNITS
// =============================================================================

/// Flight characteristics of an aircraft
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AircraftData {
    pub cruise_altitude_ft: f64,
    pub cruise_speed_kts: f64,
    pub radio_frequency_mhz: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub id: String,
    pub display_name: String,
    pub families: Vec<UnitFamily>,
    /// Simulator type names; one unit is spawned per entry
    pub type_names: Vec<String>,
    #[serde(default)]
    pub player_controllable: bool,
    #[serde(default)]
    pub aircraft: Option<AircraftData>,
}

impl UnitDefinition {
    pub fn has_family(&self, family: UnitFamily) -> bool {
        self.families.contains(&family)
    }
}

impl Definition for UnitDefinition {
    const KIND: &'static str = "unit";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }
}

// =============================================================================
// COALITIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoalitionDefinition {
    pub id: String,
    pub display_name: String,
    pub countries: Vec<String>,
    #[serde(default)]
    pub callsign_style: CallsignStyle,
    #[serde(default)]
    pub unit_system: UnitSystem,
    /// Preferred unit ids for each family
    #[serde(default)]
    pub units: BTreeMap<UnitFamily, Vec<String>>,
}

impl Definition for CoalitionDefinition {
    const KIND: &'static str = "coalition";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }
}

// =============================================================================
// OBJECTIVES & FEATURES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveDefinition {
    pub id: String,
    pub display_name: String,
    pub spawn_point_types: Vec<SpawnPointType>,
    /// Random offset applied to objective waypoints
    pub waypoint_inaccuracy_nm: ValueRange<f64>,
    pub waypoint_altitude_ft: ValueRange<f64>,
    #[serde(default)]
    pub target_side: Side,
    pub target_families: Vec<UnitFamily>,
    pub target_group_size: ValueRange<u32>,
    #[serde(default)]
    pub defense_families: Vec<UnitFamily>,
    pub description_keys: Vec<String>,
    pub task_key: String,
    #[serde(default)]
    pub remark_keys: Vec<String>,
    #[serde(default)]
    pub media_files: Vec<String>,
}

impl Definition for ObjectiveDefinition {
    const KIND: &'static str = "objective";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Optional add-on spawned around each objective node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDefinition {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub side: Side,
    pub families: Vec<UnitFamily>,
    pub unit_count: ValueRange<u32>,
    pub spawn_point_types: Vec<SpawnPointType>,
    pub spawn_distance_nm: ValueRange<f64>,
    #[serde(default)]
    pub remark_key: Option<String>,
    #[serde(default)]
    pub media_files: Vec<String>,
}

impl Definition for FeatureDefinition {
    const KIND: &'static str = "feature";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }
}

// =============================================================================
// LANGUAGES
// =============================================================================

/// Localized string table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageDefinition {
    pub id: String,
    pub display_name: String,
    pub strings: BTreeMap<String, String>,
}

impl LanguageDefinition {
    pub fn get(&self, key: &str) -> Result<&str, DomainError> {
        self.strings
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| DomainError::MissingLocalization {
                language: self.id.clone(),
                key: key.to_string(),
            })
    }

    /// Look up `key` and replace every `$NAME$` placeholder with its argument
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> Result<String, DomainError> {
        let mut text = self.get(key)?.to_string();
        for (name, value) in args {
            text = text.replace(&format!("${}$", name.to_uppercase()), value);
        }
        Ok(text)
    }
}

impl Definition for LanguageDefinition {
    const KIND: &'static str = "language";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }
}
