//! Mission template: the user-authored input of a generation run.

use serde::{Deserialize, Serialize};

use crate::{
    Amount, Coalition, CountryCoalitionRule, Decade, DomainError, MAX_FLIGHT_GROUP_SIZE,
    MAX_OBJECTIVES, ObjectiveCount, ObjectiveDistance, PerCoalition, Season, TimeOfDay,
    UnitSystem, WeatherLevel, WindLevel,
};

/// One player-controlled flight group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerFlightGroup {
    /// Unit definition id of the aircraft
    pub aircraft: String,
    pub count: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentOptions {
    pub decade: Decade,
    pub season: Season,
    pub time_of_day: TimeOfDay,
    pub weather: WeatherLevel,
    pub wind: WindLevel,
}

/// Intensity of the optional unit categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SituationOptions {
    pub enemy_air_defense: Amount,
    pub enemy_cap: Amount,
    pub friendly_air_defense: Amount,
    pub friendly_cap: Amount,
    pub objective_defense: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportOptions {
    pub awacs: bool,
    pub tanker: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightPlanOptions {
    /// Add a transit waypoint on the ingress and egress legs
    pub transit_waypoints: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BriefingOptions {
    /// Language id; the configured default when absent
    pub language: Option<String>,
    /// Overrides the player coalition's unit system
    pub unit_system: Option<UnitSystem>,
    /// Custom mission name; generated when absent
    pub mission_name: Option<String>,
}

/// Simulator realism toggles, passed through to the mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealismOptions {
    pub hide_enemy_units: bool,
    pub allow_external_views: bool,
    pub easy_communication: bool,
}

impl Default for RealismOptions {
    fn default() -> Self {
        Self {
            hide_enemy_units: true,
            allow_external_views: true,
            easy_communication: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionTemplate {
    pub theater: String,
    /// Coalition definition id for each side
    pub coalitions: PerCoalition<String>,
    pub player_coalition: Coalition,
    #[serde(default)]
    pub country_coalitions: CountryCoalitionRule,
    /// Start airbase node id; picked at random when absent
    #[serde(default)]
    pub start_airbase: Option<String>,

    pub objective_type: String,
    #[serde(default)]
    pub objective_count: ObjectiveCount,
    #[serde(default)]
    pub objective_distance: ObjectiveDistance,
    #[serde(default)]
    pub objective_features: Vec<String>,

    pub player_flight_groups: Vec<PlayerFlightGroup>,
    #[serde(default)]
    pub multiplayer: bool,

    #[serde(default)]
    pub environment: EnvironmentOptions,
    #[serde(default)]
    pub situation: SituationOptions,
    #[serde(default)]
    pub support: SupportOptions,
    #[serde(default)]
    pub flight_plan: FlightPlanOptions,
    #[serde(default)]
    pub briefing: BriefingOptions,
    #[serde(default)]
    pub realism: RealismOptions,

    /// RNG seed; a random seed is drawn (and recorded) when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl MissionTemplate {
    /// Checks that need no library access
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.theater.trim().is_empty() {
            return Err(DomainError::InvalidTemplate("no theater selected".to_string()));
        }
        if self.coalitions.blue.trim().is_empty() || self.coalitions.red.trim().is_empty() {
            return Err(DomainError::InvalidTemplate(
                "both coalitions must be selected".to_string(),
            ));
        }
        if self.objective_type.trim().is_empty() {
            return Err(DomainError::InvalidTemplate(
                "no objective type selected".to_string(),
            ));
        }
        if let ObjectiveCount::Fixed(count) = self.objective_count {
            if count == 0 || count > MAX_OBJECTIVES {
                return Err(DomainError::InvalidTemplate(format!(
                    "objective count {count} out of range 1..={MAX_OBJECTIVES}"
                )));
            }
        }
        if self.player_flight_groups.is_empty() {
            return Err(DomainError::InvalidTemplate(
                "at least one player flight group is required".to_string(),
            ));
        }
        for (i, group) in self.player_flight_groups.iter().enumerate() {
            if group.count == 0 || group.count > MAX_FLIGHT_GROUP_SIZE {
                return Err(DomainError::InvalidTemplate(format!(
                    "flight group #{} has {} aircraft, expected 1..={MAX_FLIGHT_GROUP_SIZE}",
                    i + 1,
                    group.count
                )));
            }
        }
        Ok(())
    }
}
