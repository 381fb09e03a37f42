//! # Mission Generator
//!
//! Runs the generation pipeline end to end:
//!
//! ```text
//! validate template ─▶ resolve definitions ─▶ environment ─▶ start airbase
//!        ─▶ flight plan ─▶ map center / bullseye ─▶ airbase coalitions
//!        ─▶ unit groups ─▶ briefing ─▶ Mission
//! ```
//!
//! Any failing step aborts the run and nothing of the mission under
//! construction is returned. Each run owns fresh state (RNG, spawn
//! exclusions, callsigns, log); the library is only read.

use std::collections::BTreeMap;

use chrono::Utc;
use mission_domain::{
    Coalition, CoalitionDefinition, Coordinates, CountryCoalitionRule, FeatureDefinition,
    GroupRole, LanguageDefinition, Mission, MissionAirbase, MissionTemplate, ObjectiveDefinition,
    PerCoalition, ResolvedSettings, Side, TheaterDefinition, TheaterNode, UnitDefinition,
    UnitGroup,
};
use mission_library::{Library, LibraryTable};
use uuid::Uuid;

use crate::briefing::{BriefingInput, generate_briefing};
use crate::callsign::CallsignGenerator;
use crate::config::GeneratorConfig;
use crate::environment::generate_environment;
use crate::error::{GenerationError, Result};
use crate::flight_plan::{build_flight_plan, build_objectives};
use crate::log::GenerationLog;
use crate::run::RunContext;
use crate::units::UnitGroupGenerator;

/// Library definitions a template refers to
struct Definitions<'l> {
    theater: &'l TheaterDefinition,
    coalitions: PerCoalition<&'l CoalitionDefinition>,
    objective: &'l ObjectiveDefinition,
    features: Vec<&'l FeatureDefinition>,
    language: &'l LanguageDefinition,
}

/// Generates missions from templates against one definition library
pub struct MissionGenerator<'l> {
    library: &'l Library,
    config: GeneratorConfig,
}

impl<'l> MissionGenerator<'l> {
    pub const fn new(library: &'l Library, config: GeneratorConfig) -> Self {
        Self { library, config }
    }

    /// Generate one mission
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] when the template cannot be turned
    /// into a complete mission. The caller may retry with another template.
    pub fn generate(&self, template: &MissionTemplate) -> Result<Mission> {
        let span = tracing::info_span!("generate", theater = %template.theater);
        let _guard = span.enter();

        match self.run(template) {
            Ok(mission) => {
                tracing::info!(
                    mission_id = %mission.mission_id,
                    seed = mission.seed,
                    objectives = mission.objectives.len(),
                    groups = mission.unit_groups.len(),
                    "Mission generated"
                );
                Ok(mission)
            }
            Err(err) => {
                tracing::error!(code = err.error_code(), error = %err, "Mission generation failed");
                Err(err)
            }
        }
    }

    fn run(&self, template: &MissionTemplate) -> Result<Mission> {
        // Validate template
        template.validate()?;

        // Resolve definitions
        let defs = self.resolve_definitions(template)?;
        let player = template.player_coalition;
        let countries = assign_countries(defs.coalitions, player)?;

        let seed = template.seed.unwrap_or_else(rand::random);
        let mut log = GenerationLog::new();
        log.info(format!(
            "Generating {} mission on {} (seed {seed})",
            defs.objective.display_name, defs.theater.display_name
        ));

        let mut ctx = RunContext::new(
            self.library,
            template,
            defs.theater,
            defs.coalitions,
            countries,
            self.config.spawn_search,
            seed,
            log,
        );
        let objective_count = template.objective_count.resolve(&mut ctx.rng);

        // Environment
        let environment = generate_environment(&template.environment, defs.theater, &mut ctx.rng);
        ctx.log.info(format!(
            "Date {} at {:02}:{:02}, weather {:?}, wind {:?}",
            environment.date,
            environment.start_hour_minute().0,
            environment.start_hour_minute().1,
            environment.weather_level,
            environment.wind_level
        ));

        // Start airbase
        let start = select_start_airbase(&mut ctx)?;
        let home = start.coordinates;
        ctx.log.info(format!("Start airbase: {}", start.name));

        // Flight plan
        let objectives = build_objectives(
            &ctx.spawns,
            &mut ctx.exclusion,
            &mut ctx.rng,
            defs.objective,
            objective_count,
            template.objective_distance,
            home,
        )?;
        let flight_plan = build_flight_plan(
            &objectives,
            defs.objective,
            template.flight_plan.transit_waypoints,
            home,
            &mut ctx.rng,
        );
        ctx.log.info(format!(
            "{} objective(s), flight plan {:.0} nm",
            objectives.len(),
            flight_plan.total_distance_nm()
        ));

        // Map center & bullseye
        let objective_points: Vec<Coordinates> = objectives.iter().map(|o| o.coordinates).collect();
        let target_area = Coordinates::centroid(&objective_points).unwrap_or(home);
        let map_center = home.lerp(&target_area, 0.5);
        let bullseye = PerCoalition::from_fn(|c| if c == player { map_center } else { target_area });

        // Airbase coalitions
        ctx.airbase_coalitions =
            assign_airbase_coalitions(defs.theater, template.country_coalitions, start, player);

        // Units
        let situation = template.situation;
        let mut units = UnitGroupGenerator::new(CallsignGenerator::new(PerCoalition::from_fn(|c| {
            defs.coalitions[c].callsign_style
        })));
        units.add_player_flight_groups(&mut ctx, start)?;
        let objective_defense =
            units.add_objective_groups(&mut ctx, defs.objective, &objectives, situation.objective_defense)?;
        units.add_support_aircraft(&mut ctx, home);
        let enemy_air_defense =
            units.add_air_defense(&mut ctx, Side::Enemy, situation.enemy_air_defense, &objectives, home);
        let friendly_air_defense =
            units.add_air_defense(&mut ctx, Side::Ally, situation.friendly_air_defense, &objectives, home);
        let enemy_cap =
            units.add_combat_air_patrol(&mut ctx, Side::Enemy, situation.enemy_cap, &objectives, home);
        let friendly_cap =
            units.add_combat_air_patrol(&mut ctx, Side::Ally, situation.friendly_cap, &objectives, home);
        units.add_features(&mut ctx, &defs.features, &objectives);
        let unit_groups = units.into_groups();

        let resolved = ResolvedSettings {
            objective_count,
            enemy_air_defense,
            enemy_cap,
            friendly_air_defense,
            friendly_cap,
            objective_defense,
        };
        ctx.log.info(format!(
            "{} unit groups, enemy air defense {}, enemy CAP {}",
            unit_groups.len(),
            enemy_air_defense.as_str(),
            enemy_cap.as_str()
        ));

        // Briefing
        let start_airbase = MissionAirbase {
            node_id: start.id.clone(),
            name: start.name.clone(),
            coordinates: start.coordinates,
            atc_frequency_mhz: start.atc_frequency_mhz,
        };
        let player_groups: Vec<&UnitGroup> = unit_groups
            .iter()
            .filter(|g| g.role == GroupRole::PlayerFlight)
            .collect();
        let briefing = generate_briefing(
            &BriefingInput {
                library: self.library,
                language: defs.language,
                unit_system: template
                    .briefing
                    .unit_system
                    .unwrap_or(defs.coalitions[player].unit_system),
                mission_name: template.briefing.mission_name.as_deref(),
                objective: defs.objective,
                objectives: &objectives,
                features: &defs.features,
                airbase: &start_airbase,
                flight_plan: &flight_plan,
                environment: &environment,
                resolved: &resolved,
                player_groups: &player_groups,
            },
            &mut ctx.rng,
        )?;
        ctx.log.info(format!("Briefing: {}", briefing.title));

        ctx.media_files
            .extend(defs.objective.media_files.iter().cloned());

        let RunContext {
            countries,
            airbase_coalitions,
            log,
            media_files,
            ..
        } = ctx;

        Ok(Mission {
            mission_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            seed,
            theater_id: defs.theater.id.clone(),
            coalitions: PerCoalition::from_fn(|c| defs.coalitions[c].id.clone()),
            countries,
            coalition_player: player,
            start_airbase,
            airbase_coalitions,
            resolved,
            objectives,
            flight_plan,
            map_center,
            bullseye,
            unit_groups,
            environment,
            briefing,
            realism: template.realism,
            media_files,
            log: log.into_lines(),
        })
    }

    fn resolve_definitions(&self, template: &MissionTemplate) -> Result<Definitions<'l>> {
        let theater = self.lookup::<TheaterDefinition>(&template.theater)?;
        let blue = self.lookup::<CoalitionDefinition>(&template.coalitions.blue)?;
        let red = self.lookup::<CoalitionDefinition>(&template.coalitions.red)?;
        let objective = self.lookup::<ObjectiveDefinition>(&template.objective_type)?;

        let features = template
            .objective_features
            .iter()
            .map(|id| self.lookup::<FeatureDefinition>(id))
            .collect::<Result<Vec<_>>>()?;

        for flight in &template.player_flight_groups {
            let aircraft = self.lookup::<UnitDefinition>(&flight.aircraft)?;
            if !aircraft.player_controllable {
                return Err(GenerationError::NoPlayerAircraft(aircraft.id.clone()));
            }
        }

        let language_id = template
            .briefing
            .language
            .as_deref()
            .or(self.config.default_language.as_deref())
            .unwrap_or(self.library.defaults().language.as_str());
        let language = self.lookup::<LanguageDefinition>(language_id)?;

        Ok(Definitions {
            theater,
            coalitions: PerCoalition::new(blue, red),
            objective,
            features,
            language,
        })
    }

    fn lookup<T: LibraryTable>(&self, id: &str) -> Result<&'l T> {
        self.library
            .get::<T>(id)
            .ok_or_else(|| GenerationError::UnknownDefinition {
                kind: T::KIND,
                id: id.to_string(),
            })
    }
}

/// Country lists for both coalitions, sharing none.
///
/// Countries claimed by both sides stay with the player's coalition. The
/// run fails when the other coalition is left without a country.
pub fn assign_countries(
    coalitions: PerCoalition<&CoalitionDefinition>,
    player: Coalition,
) -> Result<PerCoalition<Vec<String>>> {
    let own = unique_countries(&coalitions[player].countries, &[]);
    if own.is_empty() {
        return Err(GenerationError::InvalidTemplate(format!(
            "coalition '{}' lists no country",
            coalitions[player].id
        )));
    }

    let other = unique_countries(&coalitions[player.opposite()].countries, &own);
    if other.is_empty() {
        return Err(GenerationError::CoalitionsShareCountries {
            blue: coalitions.blue.id.clone(),
            red: coalitions.red.id.clone(),
        });
    }

    Ok(PerCoalition::from_fn(|c| {
        if c == player {
            own.clone()
        } else {
            other.clone()
        }
    }))
}

fn unique_countries(countries: &[String], taken: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for country in countries {
        let country = country.trim();
        let seen = |list: &[String]| list.iter().any(|c| c.eq_ignore_ascii_case(country));
        if !country.is_empty() && !seen(taken) && !seen(&unique) {
            unique.push(country.to_string());
        }
    }
    unique
}

/// The template's airbase, a random airbase of the player's coalition, or
/// any airbase as a last resort
fn select_start_airbase<'a>(ctx: &mut RunContext<'a>) -> Result<&'a TheaterNode> {
    let template = ctx.template;
    if let Some(id) = &template.start_airbase {
        return ctx
            .spawns
            .airbase(id)
            .ok_or_else(|| GenerationError::UnknownDefinition {
                kind: "airbase",
                id: id.clone(),
            });
    }

    let (rule, player) = (template.country_coalitions, ctx.player);
    if let Some(airbase) = ctx
        .spawns
        .random_airbase(&mut ctx.rng, |n| rule.apply(n.default_coalition) == Some(player))
    {
        return Ok(airbase);
    }

    ctx.log.warn(format!(
        "No airbase belongs to the {} coalition, picking any airbase",
        player.as_str()
    ));
    ctx.spawns
        .random_airbase(&mut ctx.rng, |_| true)
        .ok_or_else(|| GenerationError::NoAirbase {
            coalition: player,
            theater: ctx.theater.id.clone(),
        })
}

/// Owning coalition of each non-neutral airbase; the start airbase always
/// belongs to the player
pub fn assign_airbase_coalitions(
    theater: &TheaterDefinition,
    rule: CountryCoalitionRule,
    start: &TheaterNode,
    player: Coalition,
) -> BTreeMap<String, Coalition> {
    let mut coalitions: BTreeMap<String, Coalition> = theater
        .airbases()
        .filter_map(|n| rule.apply(n.default_coalition).map(|c| (n.id.clone(), c)))
        .collect();
    coalitions.insert(start.id.clone(), player);
    coalitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use mission_domain::{
        Amount, FlightPlan, LogLevel, ObjectiveCount, ObjectiveDistance, ResolvedAmount,
        WaypointKind, WeatherLevel,
    };
    use std::collections::HashSet;

    fn generate(template: &MissionTemplate) -> Result<Mission> {
        let library = test_support::library();
        MissionGenerator::new(&library, GeneratorConfig::default()).generate(template)
    }

    #[test]
    fn test_scenario_blue_two_strike_objectives() {
        let mut template = test_support::template();
        template.objective_count = ObjectiveCount::Fixed(2);
        template.objective_distance = ObjectiveDistance::Medium;

        let mission = generate(&template).unwrap();

        assert_eq!(mission.coalition_player, Coalition::Blue);
        assert_eq!(mission.objectives.len(), 2);
        assert_eq!(mission.resolved.objective_count, 2);

        let order: Vec<usize> = mission.flight_plan.objective_waypoints().map(|(i, _)| i).collect();
        assert_eq!(order, vec![0, 1]);
        assert_eq!(
            mission.airbase_coalitions.get(&mission.start_airbase.node_id),
            Some(&Coalition::Blue)
        );
        assert!(mission.player_groups().count() >= 1);
        assert!(!mission.log.is_empty());
    }

    #[test]
    fn test_countries_are_disjoint_and_non_empty() {
        let mission = generate(&test_support::template()).unwrap();
        let blue: HashSet<_> = mission.countries.blue.iter().collect();
        let red: HashSet<_> = mission.countries.red.iter().collect();
        assert!(!blue.is_empty());
        assert!(!red.is_empty());
        assert!(blue.is_disjoint(&red));
        for group in &mission.unit_groups {
            assert!(mission.countries[group.coalition].contains(&group.country));
        }
    }

    #[test]
    fn test_shared_countries_stay_with_player() {
        let library = test_support::library();
        let usa = library.get::<CoalitionDefinition>("usa").unwrap();
        let mut nato = library.get::<CoalitionDefinition>("russia").unwrap().clone();
        nato.countries = vec!["UK".to_string(), "Georgia".to_string()];

        let countries = assign_countries(PerCoalition::new(usa, &nato), Coalition::Red).unwrap();
        assert_eq!(countries.red, vec!["UK".to_string(), "Georgia".to_string()]);
        assert!(!countries.blue.iter().any(|c| c == "UK"));

        nato.countries = usa.countries.clone();
        let err = assign_countries(PerCoalition::new(usa, &nato), Coalition::Blue).unwrap_err();
        assert!(matches!(err, GenerationError::CoalitionsShareCountries { .. }));
    }

    #[test]
    fn test_player_airbase_under_inverted_rule() {
        for rule in [
            CountryCoalitionRule::Inverted,
            CountryCoalitionRule::AllRed,
            CountryCoalitionRule::Default,
        ] {
            let mut template = test_support::template();
            template.country_coalitions = rule;
            let mission = generate(&template).unwrap();
            assert_eq!(
                mission.airbase_coalitions.get(&mission.start_airbase.node_id),
                Some(&Coalition::Blue),
                "rule {rule:?}"
            );
        }

        let mut template = test_support::template();
        template.country_coalitions = CountryCoalitionRule::AllRed;
        template.start_airbase = Some("Batumi".to_string());
        let mission = generate(&template).unwrap();
        assert_eq!(mission.airbase_coalitions.get("batumi"), Some(&Coalition::Blue));
        assert_eq!(mission.airbase_coalitions.get("kobuleti"), Some(&Coalition::Red));
    }

    #[test]
    fn test_no_spawn_point_used_twice() {
        let mut template = test_support::template();
        template.objective_count = ObjectiveCount::Fixed(3);
        template.situation.enemy_air_defense = Amount::High;
        template.situation.friendly_air_defense = Amount::High;
        template.situation.objective_defense = Amount::High;
        template.objective_features = vec!["convoy".to_string()];

        let mission = generate(&template).unwrap();

        let mut seen = HashSet::new();
        let ids = mission
            .objectives
            .iter()
            .map(|o| &o.spawn_point_id)
            .chain(
                mission
                    .unit_groups
                    .iter()
                    .filter(|g| !matches!(g.role, GroupRole::ObjectiveTarget { .. }))
                    .filter_map(|g| g.spawn_point_id.as_ref()),
            );
        for id in ids {
            assert!(seen.insert(id), "spawn point {id} used twice");
        }
    }

    #[test]
    fn test_flight_plan_distance_recomputes() {
        let mut template = test_support::template();
        template.flight_plan.transit_waypoints = true;
        let mission = generate(&template).unwrap();

        let plan = &mission.flight_plan;
        let recomputed = FlightPlan::route_distance(&plan.home(), plan.waypoints());
        assert!((recomputed - plan.total_distance_m()).abs() < 1e-6);
        assert_eq!(plan.waypoints().first().unwrap().kind, WaypointKind::Transit);
        assert_eq!(plan.waypoints().last().unwrap().kind, WaypointKind::Transit);
    }

    #[test]
    fn test_resolved_amounts_match_briefing() {
        let library = test_support::library();
        let language = library.get::<LanguageDefinition>("english").unwrap();
        let generator = MissionGenerator::new(&library, GeneratorConfig::default());

        for seed in 0..8 {
            let mut template = test_support::template();
            template.seed = Some(seed);
            template.situation.enemy_air_defense = Amount::Random;
            template.situation.enemy_cap = Amount::Random;

            let mission = generator.generate(&template).unwrap();
            let air_defense = language
                .get(&format!(
                    "RemarkEnemyAirDefense{}",
                    mission.resolved.enemy_air_defense.as_str()
                ))
                .unwrap();
            let cap = language
                .get(&format!("RemarkEnemyCap{}", mission.resolved.enemy_cap.as_str()))
                .unwrap();
            assert!(mission.briefing.remarks.iter().any(|r| r == air_defense));
            assert!(mission.briefing.remarks.iter().any(|r| r == cap));

            let cap_groups = mission
                .groups_for(Coalition::Red)
                .filter(|g| g.role == GroupRole::CombatAirPatrol)
                .count();
            assert_eq!(cap_groups, mission.resolved.enemy_cap.level());
        }
    }

    #[test]
    fn test_same_seed_same_mission() {
        let library = test_support::library();
        let generator = MissionGenerator::new(&library, GeneratorConfig::default());
        let template = test_support::template();

        let a = generator.generate(&template).unwrap();
        let b = generator.generate(&template).unwrap();

        assert_ne!(a.mission_id, b.mission_id);
        assert_eq!(a.seed, b.seed);
        assert_eq!(a.objectives, b.objectives);
        assert_eq!(a.unit_groups, b.unit_groups);
        assert_eq!(a.environment, b.environment);
        assert_eq!(a.briefing, b.briefing);
    }

    #[test]
    fn test_random_seed_is_recorded() {
        let mut template = test_support::template();
        template.seed = None;
        let mission = generate(&template).unwrap();

        template.seed = Some(mission.seed);
        let replay = generate(&template).unwrap();
        assert_eq!(mission.objectives, replay.objectives);
    }

    #[test]
    fn test_zero_objectives_invalid() {
        let mut template = test_support::template();
        template.objective_count = ObjectiveCount::Fixed(0);
        assert!(matches!(
            generate(&template),
            Err(GenerationError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_too_many_objectives_fail() {
        let mut template = test_support::template();
        template.objective_type = "antiship".to_string();
        template.objective_count = ObjectiveCount::Fixed(3);

        let err = generate(&template).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::NoObjectiveSpawnPoint { index: 2, .. }
        ));
        assert_eq!(err.error_code(), "NO_OBJECTIVE_SPAWN_POINT");
    }

    #[test]
    fn test_unknown_definitions() {
        let mut template = test_support::template();
        template.theater = "nevada".to_string();
        assert!(matches!(
            generate(&template),
            Err(GenerationError::UnknownDefinition { kind: "theater", .. })
        ));

        let mut template = test_support::template();
        template.player_flight_groups[0].aircraft = "su27".to_string();
        assert!(matches!(
            generate(&template),
            Err(GenerationError::NoPlayerAircraft(_))
        ));

        let library = test_support::library();
        let config = GeneratorConfig {
            default_language: Some("klingon".to_string()),
            ..GeneratorConfig::default()
        };
        let err = MissionGenerator::new(&library, config)
            .generate(&test_support::template())
            .unwrap_err();
        assert!(matches!(err, GenerationError::UnknownDefinition { kind: "language", .. }));
    }

    #[test]
    fn test_random_weather_favours_calm_levels() {
        let library = test_support::library();
        let generator = MissionGenerator::new(&library, GeneratorConfig::default());
        let mut calm = 0;
        let mut storm = 0;

        for seed in 0..120 {
            let mut template = test_support::template();
            template.seed = Some(seed);
            template.environment.weather = WeatherLevel::Random;
            let mission = generator.generate(&template).unwrap();
            match mission.environment.weather_level {
                WeatherLevel::Clear | WeatherLevel::LightClouds => calm += 1,
                WeatherLevel::Precipitation | WeatherLevel::Storm => storm += 1,
                _ => {}
            }
        }
        assert!(calm > storm, "calm {calm}, storm {storm}");
    }

    #[test]
    fn test_degraded_categories_are_logged() {
        let mut template = test_support::template();
        template.situation.friendly_air_defense = Amount::High;
        let mission = generate(&template).unwrap();

        assert_eq!(mission.resolved.friendly_air_defense, ResolvedAmount::High);
        assert!(mission.log.iter().any(|l| l.level == LogLevel::Warning));
    }

    #[test]
    fn test_bundled_data_generates() {
        let library = Library::from_json_str(include_str!("../../../data/library.json")).unwrap();
        let mut template: MissionTemplate =
            serde_json::from_str(include_str!("../../../data/template.json")).unwrap();
        template.seed = Some(7);

        let mission = MissionGenerator::new(&library, GeneratorConfig::default())
            .generate(&template)
            .unwrap();
        assert_eq!(mission.player_groups().count(), 2);
        assert_eq!(mission.objectives.len(), 2);
        assert!(mission.briefing.plain_text.contains("== "));
    }

    #[test]
    fn test_media_files_collected() {
        let mut template = test_support::template();
        template.objective_features = vec!["convoy".to_string()];
        let mission = generate(&template).unwrap();
        assert!(mission.media_files.contains("radio_strike.ogg"));
        assert!(mission.media_files.contains("convoy.ogg"));
    }
}
