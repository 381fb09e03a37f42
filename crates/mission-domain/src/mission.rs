//! Generated mission aggregate, the output of one generation run.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::template::RealismOptions;
use crate::{
    Coalition, Coordinates, Decade, METERS_PER_NM, PerCoalition, Precipitation, ResolvedAmount,
    Skill, TimeOfDay, WeatherLevel, WindLevel,
};

// =============================================================================
// FLIGHT PLAN
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaypointKind {
    Transit,
    Objective { index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionWaypoint {
    pub name: String,
    pub coordinates: Coordinates,
    pub altitude_ft: f64,
    pub kind: WaypointKind,
}

/// Ordered route from the home airbase and back.
///
/// The total distance is computed from the route on construction; the type
/// offers no way to change it independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FlightPlanRoute")]
pub struct FlightPlan {
    home: Coordinates,
    waypoints: Vec<MissionWaypoint>,
    total_distance_m: f64,
}

#[derive(Deserialize)]
struct FlightPlanRoute {
    home: Coordinates,
    waypoints: Vec<MissionWaypoint>,
}

impl From<FlightPlanRoute> for FlightPlan {
    fn from(route: FlightPlanRoute) -> Self {
        Self::new(route.home, route.waypoints)
    }
}

impl FlightPlan {
    pub fn new(home: Coordinates, waypoints: Vec<MissionWaypoint>) -> Self {
        let total_distance_m = Self::route_distance(&home, &waypoints);
        Self {
            home,
            waypoints,
            total_distance_m,
        }
    }

    /// Sum of legs home → waypoints → home, in meters
    pub fn route_distance(home: &Coordinates, waypoints: &[MissionWaypoint]) -> f64 {
        let mut total = 0.0;
        let mut previous = *home;
        for waypoint in waypoints {
            total += previous.distance_to(&waypoint.coordinates);
            previous = waypoint.coordinates;
        }
        total + previous.distance_to(home)
    }

    pub const fn home(&self) -> Coordinates {
        self.home
    }

    pub fn waypoints(&self) -> &[MissionWaypoint] {
        &self.waypoints
    }

    pub const fn total_distance_m(&self) -> f64 {
        self.total_distance_m
    }

    pub fn total_distance_nm(&self) -> f64 {
        self.total_distance_m / METERS_PER_NM
    }

    pub fn objective_waypoints(&self) -> impl Iterator<Item = (usize, &MissionWaypoint)> {
        self.waypoints.iter().filter_map(|wp| match wp.kind {
            WaypointKind::Objective { index } => Some((index, wp)),
            WaypointKind::Transit => None,
        })
    }
}

// =============================================================================
// OBJECTIVES & AIRBASES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionObjective {
    pub index: usize,
    /// Codename shown in the briefing
    pub name: String,
    pub objective_type: String,
    pub node_id: String,
    pub node_name: String,
    pub spawn_point_id: String,
    pub coordinates: Coordinates,
    pub altitude_hint_ft: f64,
    pub group_size_hint: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionAirbase {
    pub node_id: String,
    pub name: String,
    pub coordinates: Coordinates,
    pub atc_frequency_mhz: Option<f32>,
}

// =============================================================================
// UNITS
// =============================================================================

/// Radio callsign of a flight group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Callsign {
    /// e.g. "Enfield 1", units "Enfield 1-1", "Enfield 1-2"
    Nato { name: String, flight: u8 },
    /// e.g. "215", units "2151", "2152"
    Numeric { number: u16 },
}

impl Callsign {
    pub fn group_name(&self) -> String {
        match self {
            Self::Nato { name, flight } => format!("{name} {flight}"),
            Self::Numeric { number } => number.to_string(),
        }
    }

    /// Callsign of the n-th unit of the group, starting at 1
    pub fn unit_name(&self, position: usize) -> String {
        match self {
            Self::Nato { name, flight } => format!("{name} {flight}-{position}"),
            Self::Numeric { number } => format!("{number}{position}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupRole {
    PlayerFlight,
    ObjectiveTarget { objective: usize },
    ObjectiveDefense { objective: usize },
    AirDefense,
    CombatAirPatrol,
    Tanker,
    Awacs,
    Feature { objective: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionUnit {
    pub unit_id: u32,
    pub name: String,
    pub definition_id: String,
    pub type_name: String,
    pub skill: Skill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitGroup {
    pub group_id: u32,
    pub name: String,
    pub coalition: Coalition,
    pub country: String,
    pub role: GroupRole,
    pub coordinates: Coordinates,
    pub destination: Option<Coordinates>,
    pub spawn_point_id: Option<String>,
    pub airbase_id: Option<String>,
    pub altitude_ft: f64,
    pub callsign: Option<Callsign>,
    pub units: Vec<MissionUnit>,
}

// =============================================================================
// ENVIRONMENT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindLayer {
    pub altitude_m: f64,
    pub speed_mps: f64,
    pub direction_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub date: NaiveDate,
    pub time_of_day: TimeOfDay,
    /// Seconds after midnight
    pub start_time_s: u32,
    pub weather_level: WeatherLevel,
    pub wind_level: WindLevel,
    pub cloud_base_m: f64,
    pub cloud_density: u32,
    pub precipitation: Precipitation,
    pub fog_visibility_m: Option<f64>,
    pub qnh_mmhg: f64,
    pub temperature_c: i32,
    pub turbulence_mps: f64,
    pub wind: [WindLayer; 3],
}

impl Environment {
    /// Always derived from the date's year
    pub fn decade(&self) -> Option<Decade> {
        use chrono::Datelike;
        Decade::from_year(self.date.year())
    }

    pub const fn start_hour_minute(&self) -> (u32, u32) {
        (self.start_time_s / 3600, (self.start_time_s % 3600) / 60)
    }
}

// =============================================================================
// BRIEFING & LOG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Briefing {
    pub title: String,
    pub description: String,
    pub remarks: Vec<String>,
    pub tasks: Vec<String>,
    pub plain_text: String,
    pub html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

// =============================================================================
// MISSION
// =============================================================================

/// Values resolved from "random" template settings, fixed for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSettings {
    pub objective_count: u8,
    pub enemy_air_defense: ResolvedAmount,
    pub enemy_cap: ResolvedAmount,
    pub friendly_air_defense: ResolvedAmount,
    pub friendly_cap: ResolvedAmount,
    pub objective_defense: ResolvedAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub mission_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub theater_id: String,
    pub coalitions: PerCoalition<String>,
    pub countries: PerCoalition<Vec<String>>,
    pub coalition_player: Coalition,
    pub start_airbase: MissionAirbase,
    /// Owning coalition of each non-neutral airbase, by node id
    pub airbase_coalitions: BTreeMap<String, Coalition>,
    pub resolved: ResolvedSettings,
    pub objectives: Vec<MissionObjective>,
    pub flight_plan: FlightPlan,
    pub map_center: Coordinates,
    pub bullseye: PerCoalition<Coordinates>,
    pub unit_groups: Vec<UnitGroup>,
    pub environment: Environment,
    pub briefing: Briefing,
    pub realism: RealismOptions,
    /// Audio assets the exporter must bundle
    pub media_files: BTreeSet<String>,
    pub log: Vec<LogLine>,
}

impl Mission {
    pub fn groups_for(&self, coalition: Coalition) -> impl Iterator<Item = &UnitGroup> {
        self.unit_groups
            .iter()
            .filter(move |g| g.coalition == coalition)
    }

    pub fn player_groups(&self) -> impl Iterator<Item = &UnitGroup> {
        self.unit_groups
            .iter()
            .filter(|g| g.role == GroupRole::PlayerFlight)
    }
}
