//! # Mission Generator - Domain Model
//!
//! Core value objects, enums, definitions, templates and the generated
//! mission aggregate for procedural combat flight mission generation.
//! These types are shared by the definition library and the generation
//! pipeline.

use std::f64::consts::TAU;
use std::ops::{Index, IndexMut};

use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod definitions;
pub mod mission;
pub mod template;

pub use definitions::{
    AircraftData, CoalitionDefinition, DaylightWindow, Definition, FeatureDefinition,
    LanguageDefinition, ObjectiveDefinition, SpawnPoint, TheaterDefinition, TheaterNode,
    UnitDefinition, WeatherPreset, WindPreset,
};
pub use mission::{
    Briefing, Callsign, Environment, FlightPlan, GroupRole, LogLevel, LogLine, Mission,
    MissionAirbase, MissionObjective, MissionUnit, MissionWaypoint, ResolvedSettings, UnitGroup,
    WaypointKind, WindLayer,
};
pub use template::{
    BriefingOptions, EnvironmentOptions, FlightPlanOptions, MissionTemplate, PlayerFlightGroup,
    RealismOptions, SituationOptions, SupportOptions,
};

pub const METERS_PER_NM: f64 = 1852.0;
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Number of concrete weather and wind levels a theater must describe.
pub const ENVIRONMENT_LEVELS: usize = 6;

/// Highest objective count a template may request.
pub const MAX_OBJECTIVES: u8 = 5;

/// Highest number of aircraft in one player flight group.
pub const MAX_FLIGHT_GROUP_SIZE: u8 = 4;

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// Planar theater coordinates in meters (x north, y east)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance in meters
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    #[must_use]
    pub fn distance_to_nm(&self, other: &Self) -> f64 {
        self.distance_to(other) / METERS_PER_NM
    }

    /// Linear interpolation, `t = 0` is `self` and `t = 1` is `other`
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Move `distance` meters along `heading` (radians, 0 = north)
    #[must_use]
    pub fn offset(&self, heading: f64, distance: f64) -> Self {
        Self {
            x: self.x + heading.cos() * distance,
            y: self.y + heading.sin() * distance,
        }
    }

    /// Move a random distance (meters) in a random direction
    pub fn random_offset<R: Rng + ?Sized>(&self, rng: &mut R, distance: ValueRange<f64>) -> Self {
        let heading = rng.gen_range(0.0..TAU);
        self.offset(heading, distance.random(rng))
    }

    /// Heading towards another point in degrees (0..360)
    #[must_use]
    pub fn heading_to(&self, other: &Self) -> f64 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees().rem_euclid(360.0)
    }

    /// Average of a set of points, `None` when empty
    #[must_use]
    pub fn centroid(points: &[Self]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let count = points.len() as f64;
        let (x, y) = points
            .iter()
            .fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
        Some(Self::new(x / count, y / count))
    }
}

/// Inclusive min/max range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValueRange<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> ValueRange<T> {
    /// Build a range, swapping the bounds if given in reverse
    pub fn new(a: T, b: T) -> Self {
        if a > b {
            Self { min: b, max: a }
        } else {
            Self { min: a, max: b }
        }
    }

    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl ValueRange<f64> {
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.min * factor, self.max * factor)
    }

    /// Widen geometrically: the lower bound shrinks and the upper bound grows
    #[must_use]
    pub fn widened(&self, factor: f64) -> Self {
        Self::new(self.min / factor, self.max * factor)
    }
}

impl ValueRange<i32> {
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

impl ValueRange<u32> {
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

// =============================================================================
// COALITIONS
// =============================================================================

/// The two sides of a mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Coalition {
    Blue,
    Red,
}

impl Coalition {
    pub const ALL: [Self; 2] = [Self::Blue, Self::Red];

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Blue => Self::Red,
            Self::Red => Self::Blue,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Blue => "BLUE",
            Self::Red => "RED",
        }
    }
}

/// One value per coalition, exactly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerCoalition<T> {
    pub blue: T,
    pub red: T,
}

impl<T> PerCoalition<T> {
    pub const fn new(blue: T, red: T) -> Self {
        Self { blue, red }
    }

    pub fn from_fn(mut f: impl FnMut(Coalition) -> T) -> Self {
        Self {
            blue: f(Coalition::Blue),
            red: f(Coalition::Red),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coalition, &T)> {
        [(Coalition::Blue, &self.blue), (Coalition::Red, &self.red)].into_iter()
    }
}

impl<T> Index<Coalition> for PerCoalition<T> {
    type Output = T;

    fn index(&self, coalition: Coalition) -> &T {
        match coalition {
            Coalition::Blue => &self.blue,
            Coalition::Red => &self.red,
        }
    }
}

impl<T> IndexMut<Coalition> for PerCoalition<T> {
    fn index_mut(&mut self, coalition: Coalition) -> &mut T {
        match coalition {
            Coalition::Blue => &mut self.blue,
            Coalition::Red => &mut self.red,
        }
    }
}

/// Which coalition, relative to the player, something spawns for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    #[default]
    Enemy,
    Ally,
}

impl Side {
    #[must_use]
    pub const fn coalition(self, player: Coalition) -> Coalition {
        match self {
            Self::Ally => player,
            Self::Enemy => player.opposite(),
        }
    }
}

/// Global rule deciding which coalition owns each theater airbase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CountryCoalitionRule {
    #[default]
    Default,
    Inverted,
    AllBlue,
    AllRed,
}

impl CountryCoalitionRule {
    /// Coalition of an airbase given its theater default (`None` = neutral)
    #[must_use]
    pub const fn apply(self, default: Option<Coalition>) -> Option<Coalition> {
        match (self, default) {
            (_, None) => None,
            (Self::Default, Some(c)) => Some(c),
            (Self::Inverted, Some(c)) => Some(c.opposite()),
            (Self::AllBlue, Some(_)) => Some(Coalition::Blue),
            (Self::AllRed, Some(_)) => Some(Coalition::Red),
        }
    }
}

// =============================================================================
// CALENDAR
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Self; 12] = [
        Self::January,
        Self::February,
        Self::March,
        Self::April,
        Self::May,
        Self::June,
        Self::July,
        Self::August,
        Self::September,
        Self::October,
        Self::November,
        Self::December,
    ];

    /// Zero-based index
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Calendar month number, 1..=12
    pub const fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(number: u32) -> Option<Self> {
        Self::ALL.get((number as usize).checked_sub(1)?).copied()
    }
}

/// One value per calendar month; the length is checked on construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<T>", into = "Vec<T>")]
#[serde(bound(serialize = "T: Serialize + Clone", deserialize = "T: Deserialize<'de>"))]
pub struct PerMonth<T: Clone>([T; 12]);

impl<T: Clone> PerMonth<T> {
    pub const fn new(values: [T; 12]) -> Self {
        Self(values)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Month, &T)> {
        Month::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T: Clone> TryFrom<Vec<T>> for PerMonth<T> {
    type Error = DomainError;

    fn try_from(values: Vec<T>) -> Result<Self, Self::Error> {
        let found = values.len();
        <[T; 12]>::try_from(values)
            .map(Self)
            .map_err(|_| DomainError::TableLength {
                table: "per-month",
                expected: 12,
                found,
            })
    }
}

impl<T: Clone> From<PerMonth<T>> for Vec<T> {
    fn from(table: PerMonth<T>) -> Self {
        table.0.into()
    }
}

impl<T: Clone> Index<Month> for PerMonth<T> {
    type Output = T;

    fn index(&self, month: Month) -> &T {
        &self.0[month.index()]
    }
}

/// Meteorological season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Season {
    #[default]
    Random,
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const CONCRETE: [Self; 4] = [Self::Spring, Self::Summer, Self::Fall, Self::Winter];

    /// Months covered by a concrete season, `None` for `Random`
    pub const fn months(self) -> Option<[Month; 3]> {
        match self {
            Self::Random => None,
            Self::Spring => Some([Month::March, Month::April, Month::May]),
            Self::Summer => Some([Month::June, Month::July, Month::August]),
            Self::Fall => Some([Month::September, Month::October, Month::November]),
            Self::Winter => Some([Month::December, Month::January, Month::February]),
        }
    }
}

/// Time period the mission takes place in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decade {
    #[default]
    Random,
    D1940,
    D1950,
    D1960,
    D1970,
    D1980,
    D1990,
    D2000,
    D2010,
}

impl Decade {
    pub const CONCRETE: [Self; 8] = [
        Self::D1940,
        Self::D1950,
        Self::D1960,
        Self::D1970,
        Self::D1980,
        Self::D1990,
        Self::D2000,
        Self::D2010,
    ];

    pub const fn start_year(self) -> Option<i32> {
        match self {
            Self::Random => None,
            Self::D1940 => Some(1940),
            Self::D1950 => Some(1950),
            Self::D1960 => Some(1960),
            Self::D1970 => Some(1970),
            Self::D1980 => Some(1980),
            Self::D1990 => Some(1990),
            Self::D2000 => Some(2000),
            Self::D2010 => Some(2010),
        }
    }

    /// Decade a year falls in; years past the last decade clamp to it
    pub fn from_year(year: i32) -> Option<Self> {
        if year < 1940 {
            return None;
        }
        let index = usize::try_from((year - 1940) / 10).ok()?;
        Some(Self::CONCRETE[index.min(Self::CONCRETE.len() - 1)])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeOfDay {
    #[default]
    Random,
    Daylight,
    Dawn,
    Noon,
    Twilight,
    Night,
}

impl TimeOfDay {
    pub const CONCRETE: [Self; 5] = [
        Self::Daylight,
        Self::Dawn,
        Self::Noon,
        Self::Twilight,
        Self::Night,
    ];
}

// =============================================================================
// ENVIRONMENT LEVELS
// =============================================================================

/// Requested weather; concrete levels index the theater weather table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeatherLevel {
    #[default]
    Random,
    Clear,
    LightClouds,
    Scattered,
    Overcast,
    Precipitation,
    Storm,
}

impl WeatherLevel {
    pub const CONCRETE: [Self; ENVIRONMENT_LEVELS] = [
        Self::Clear,
        Self::LightClouds,
        Self::Scattered,
        Self::Overcast,
        Self::Precipitation,
        Self::Storm,
    ];

    pub fn index(self) -> Option<usize> {
        Self::CONCRETE.iter().position(|l| *l == self)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::CONCRETE.get(index).copied()
    }
}

/// Requested wind; concrete levels index the theater wind table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindLevel {
    #[default]
    Random,
    Calm,
    LightBreeze,
    ModerateBreeze,
    StrongBreeze,
    Gale,
    Storm,
}

impl WindLevel {
    pub const CONCRETE: [Self; ENVIRONMENT_LEVELS] = [
        Self::Calm,
        Self::LightBreeze,
        Self::ModerateBreeze,
        Self::StrongBreeze,
        Self::Gale,
        Self::Storm,
    ];

    pub fn index(self) -> Option<usize> {
        Self::CONCRETE.iter().position(|l| *l == self)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::CONCRETE.get(index).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Precipitation {
    #[default]
    None,
    Rain,
    Thunderstorm,
    Snow,
    SnowStorm,
}

// =============================================================================
// AMOUNTS & COUNTS
// =============================================================================

/// Requested intensity of an optional unit category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Amount {
    #[default]
    Random,
    None,
    Low,
    Average,
    High,
}

impl Amount {
    /// Concrete value for this amount, rolling once when random
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> ResolvedAmount {
        match self {
            Self::Random => ResolvedAmount::ALL[rng.gen_range(0..ResolvedAmount::ALL.len())],
            Self::None => ResolvedAmount::None,
            Self::Low => ResolvedAmount::Low,
            Self::Average => ResolvedAmount::Average,
            Self::High => ResolvedAmount::High,
        }
    }
}

/// An [`Amount`] after resolution; cannot be random
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolvedAmount {
    None,
    Low,
    Average,
    High,
}

impl ResolvedAmount {
    pub const ALL: [Self; 4] = [Self::None, Self::Low, Self::Average, Self::High];

    /// Suffix used by localized string keys
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Low => "Low",
            Self::Average => "Average",
            Self::High => "High",
        }
    }

    /// 0 for none up to 3 for high
    pub const fn level(self) -> usize {
        self as usize
    }
}

/// Number of objectives requested by a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectiveCount {
    #[default]
    Random,
    Fixed(u8),
}

impl ObjectiveCount {
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> u8 {
        match self {
            Self::Random => rng.gen_range(1..=4),
            Self::Fixed(count) => count,
        }
    }
}

/// Distance between the home airbase and the first objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectiveDistance {
    #[default]
    Random,
    Close,
    Medium,
    Far,
    VeryFar,
}

impl ObjectiveDistance {
    pub const CONCRETE: [Self; 4] = [Self::Close, Self::Medium, Self::Far, Self::VeryFar];

    /// Distance range in nautical miles, `None` for `Random`
    pub const fn range_nm(self) -> Option<ValueRange<f64>> {
        match self {
            Self::Random => None,
            Self::Close => Some(ValueRange { min: 20.0, max: 50.0 }),
            Self::Medium => Some(ValueRange { min: 40.0, max: 80.0 }),
            Self::Far => Some(ValueRange { min: 60.0, max: 120.0 }),
            Self::VeryFar => Some(ValueRange { min: 100.0, max: 160.0 }),
        }
    }
}

// =============================================================================
// THEATER & UNIT TAGS
// =============================================================================

/// Spawn point tag used to filter placements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpawnPointType {
    LandSmall,
    LandMedium,
    LandLarge,
    Sea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeCategory {
    Airbase,
    Location,
}

/// Unit families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitFamily {
    PlaneFighter,
    PlaneAttack,
    PlaneBomber,
    PlaneTanker,
    PlaneAwacs,
    HelicopterAttack,
    HelicopterTransport,
    VehicleAaa,
    VehicleSamShort,
    VehicleSamMedium,
    VehicleSamLong,
    VehicleArmor,
    VehicleArtillery,
    VehicleTransport,
    Infantry,
    StaticStructure,
    ShipFrigate,
    ShipCargo,
}

impl UnitFamily {
    pub const fn is_aircraft(self) -> bool {
        matches!(
            self,
            Self::PlaneFighter
                | Self::PlaneAttack
                | Self::PlaneBomber
                | Self::PlaneTanker
                | Self::PlaneAwacs
                | Self::HelicopterAttack
                | Self::HelicopterTransport
        )
    }
}

/// Callsign convention of a coalition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallsignStyle {
    #[default]
    Nato,
    Russian,
}

/// Units used in briefing text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitSystem {
    #[default]
    Imperial,
    Metric,
}

impl UnitSystem {
    /// Format a distance given in meters
    #[must_use]
    pub fn format_distance(self, meters: f64) -> String {
        match self {
            Self::Imperial => format!("{:.0} nm", meters / METERS_PER_NM),
            Self::Metric => format!("{:.0} km", meters / 1000.0),
        }
    }

    /// Format an altitude given in feet
    #[must_use]
    pub fn format_altitude(self, feet: f64) -> String {
        match self {
            Self::Imperial => format!("{feet:.0} ft"),
            Self::Metric => format!("{:.0} m", feet * METERS_PER_FOOT),
        }
    }
}

/// AI skill level of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Skill {
    Player,
    Client,
    #[default]
    Average,
    Good,
    High,
    Excellent,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid {table} table: expected {expected} entries, found {found}")]
    TableLength {
        table: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Duplicate {entity_type} id '{id}'")]
    DuplicateId { entity_type: String, id: String },

    #[error("Missing localized string '{key}' in language '{language}'")]
    MissingLocalization { language: String, key: String },

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),
}
