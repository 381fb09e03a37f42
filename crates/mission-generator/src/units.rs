//! # Unit Group Generation
//!
//! Places every unit group of a mission. Player flights and objective
//! targets are mandatory and fail the run when they cannot be placed. All
//! other categories are optional: when no unit or spawn point is available
//! the addition is skipped with a warning in the generation log.
//!
//! ```text
//! player flights ─▶ objective targets/defense ─▶ support ─▶ air defense ─▶ CAP ─▶ features
//!   (fatal)            (target fatal)            (optional, degrade gracefully)
//! ```

use mission_domain::{
    Amount, Callsign, Coalition, Coordinates, FeatureDefinition, GroupRole, METERS_PER_NM,
    MissionObjective, MissionUnit, ObjectiveDefinition, ResolvedAmount, Side, Skill,
    SpawnPointType, TheaterNode, UnitDefinition, UnitFamily, UnitGroup, ValueRange,
};

use crate::callsign::{CallsignGenerator, CallsignKind};
use crate::error::{GenerationError, Result};
use crate::run::RunContext;
use crate::spawn::{SpawnQuery, SpawnSelection};

/// Short, medium and long range air defense tiers
const AIR_DEFENSE_TIERS: [AirDefenseTier; 3] = [
    AirDefenseTier {
        family: UnitFamily::VehicleSamShort,
        spawn_types: &[SpawnPointType::LandSmall, SpawnPointType::LandMedium],
        distance_nm: ValueRange { min: 1.0, max: 5.0 },
    },
    AirDefenseTier {
        family: UnitFamily::VehicleSamMedium,
        spawn_types: &[SpawnPointType::LandMedium, SpawnPointType::LandLarge],
        distance_nm: ValueRange { min: 5.0, max: 15.0 },
    },
    AirDefenseTier {
        family: UnitFamily::VehicleSamLong,
        spawn_types: &[SpawnPointType::LandMedium, SpawnPointType::LandLarge],
        distance_nm: ValueRange { min: 15.0, max: 30.0 },
    },
];

const DEFENSE_SPAWN_TYPES: &[SpawnPointType] = &[SpawnPointType::LandSmall, SpawnPointType::LandMedium];
const DEFENSE_DISTANCE_NM: ValueRange<f64> = ValueRange { min: 0.5, max: 3.0 };
const SUPPORT_DISTANCE_NM: ValueRange<f64> = ValueRange { min: 20.0, max: 40.0 };
const CAP_PATROL_DISTANCE_NM: ValueRange<f64> = ValueRange { min: 5.0, max: 15.0 };
const CAP_FLIGHT_SIZE: u32 = 2;
const DEFAULT_CRUISE_ALTITUDE_FT: f64 = 25_000.0;

struct AirDefenseTier {
    family: UnitFamily,
    spawn_types: &'static [SpawnPointType],
    distance_nm: ValueRange<f64>,
}

/// Number of short, medium and long range sites for an amount
pub const fn air_defense_counts(amount: ResolvedAmount) -> [usize; 3] {
    match amount {
        ResolvedAmount::None => [0, 0, 0],
        ResolvedAmount::Low => [1, 0, 0],
        ResolvedAmount::Average => [2, 1, 0],
        ResolvedAmount::High => [3, 1, 1],
    }
}

/// Everything needed to append one group
struct GroupSpec<'u> {
    coalition: Coalition,
    role: GroupRole,
    coordinates: Coordinates,
    destination: Option<Coordinates>,
    spawn_point_id: Option<String>,
    airbase_id: Option<String>,
    altitude_ft: f64,
    callsign: Option<Callsign>,
    unit: &'u UnitDefinition,
    /// Copies of the unit definition; each copy spawns all its type names
    copies: u32,
    lead_skill: Skill,
    wing_skill: Skill,
}

/// Short-lived, per-run builder of unit groups
pub struct UnitGroupGenerator {
    callsigns: CallsignGenerator,
    next_group_id: u32,
    next_unit_id: u32,
    groups: Vec<UnitGroup>,
}

impl UnitGroupGenerator {
    pub fn new(callsigns: CallsignGenerator) -> Self {
        Self {
            callsigns,
            next_group_id: 1,
            next_unit_id: 1,
            groups: Vec::new(),
        }
    }

    pub fn groups(&self) -> &[UnitGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<UnitGroup> {
        self.groups
    }

    /// One group per template entry, parked at the start airbase
    pub fn add_player_flight_groups(
        &mut self,
        ctx: &mut RunContext<'_>,
        airbase: &TheaterNode,
    ) -> Result<()> {
        let (library, template) = (ctx.library, ctx.template);

        for (i, flight) in template.player_flight_groups.iter().enumerate() {
            let aircraft = library
                .get::<UnitDefinition>(&flight.aircraft)
                .ok_or_else(|| GenerationError::UnknownDefinition {
                    kind: "unit",
                    id: flight.aircraft.clone(),
                })?;
            if !aircraft.player_controllable {
                return Err(GenerationError::NoPlayerAircraft(flight.aircraft.clone()));
            }

            let callsign = self
                .callsigns
                .next(ctx.player, CallsignKind::Flight, &mut ctx.rng)?;

            let (lead_skill, wing_skill) = match (template.multiplayer, i) {
                (true, _) => (Skill::Client, Skill::Client),
                (false, 0) => (Skill::Player, Skill::High),
                (false, _) => (Skill::High, Skill::High),
            };

            let group = self.push_group(
                ctx,
                GroupSpec {
                    coalition: ctx.player,
                    role: GroupRole::PlayerFlight,
                    coordinates: airbase.coordinates,
                    destination: None,
                    spawn_point_id: None,
                    airbase_id: Some(airbase.id.clone()),
                    altitude_ft: airbase.elevation_ft,
                    callsign: Some(callsign),
                    unit: aircraft,
                    copies: u32::from(flight.count),
                    lead_skill,
                    wing_skill,
                },
            );
            ctx.log.info(format!(
                "Player flight {} ({}x {}) at {}",
                group.name, flight.count, aircraft.display_name, airbase.name
            ));
        }

        Ok(())
    }

    /// A target group on every objective, plus defense groups around it
    pub fn add_objective_groups(
        &mut self,
        ctx: &mut RunContext<'_>,
        objective: &ObjectiveDefinition,
        objectives: &[MissionObjective],
        defense: Amount,
    ) -> Result<ResolvedAmount> {
        let resolved = defense.resolve(&mut ctx.rng);
        let coalition = objective.target_side.coalition(ctx.player);

        for placed in objectives {
            let unit = ctx
                .pick_unit(coalition, &objective.target_families)
                .ok_or_else(|| GenerationError::NoUnitsForFamily {
                    family: objective
                        .target_families
                        .first()
                        .copied()
                        .unwrap_or(UnitFamily::StaticStructure),
                    coalition: ctx.coalitions[coalition].id.clone(),
                })?;

            let skill = ctx.ai_skill(coalition);
            self.push_group(
                ctx,
                GroupSpec {
                    coalition,
                    role: GroupRole::ObjectiveTarget {
                        objective: placed.index,
                    },
                    coordinates: placed.coordinates,
                    destination: None,
                    spawn_point_id: Some(placed.spawn_point_id.clone()),
                    airbase_id: None,
                    altitude_ft: if is_aircraft(unit) {
                        placed.altitude_hint_ft
                    } else {
                        0.0
                    },
                    callsign: None,
                    unit,
                    copies: placed.group_size_hint,
                    lead_skill: skill,
                    wing_skill: skill,
                },
            );

            for _ in 0..resolved.level() {
                if objective.defense_families.is_empty() {
                    break;
                }
                let Some(unit) = ctx.pick_unit(coalition, &objective.defense_families) else {
                    ctx.log.warn(format!(
                        "No defense unit available for objective {}",
                        placed.name
                    ));
                    break;
                };
                let Some(selection) =
                    place_near(ctx, DEFENSE_SPAWN_TYPES, placed.coordinates, DEFENSE_DISTANCE_NM)
                else {
                    ctx.log.warn(format!(
                        "No spawn point left for the defense of objective {}",
                        placed.name
                    ));
                    break;
                };
                let skill = ctx.ai_skill(coalition);
                self.push_group(
                    ctx,
                    ground_group(
                        coalition,
                        GroupRole::ObjectiveDefense {
                            objective: placed.index,
                        },
                        &selection,
                        unit,
                        1,
                        skill,
                    ),
                );
            }
        }

        Ok(resolved)
    }

    /// Tanker and AWACS orbiting near the home airbase, when requested
    pub fn add_support_aircraft(&mut self, ctx: &mut RunContext<'_>, home: Coordinates) {
        let support = ctx.template.support;
        let requested = [
            (support.tanker, UnitFamily::PlaneTanker, CallsignKind::Tanker, GroupRole::Tanker),
            (support.awacs, UnitFamily::PlaneAwacs, CallsignKind::Awacs, GroupRole::Awacs),
        ];

        for (_, family, kind, role) in requested.into_iter().filter(|r| r.0) {
            let coalition = ctx.player;
            let Some(unit) = ctx.pick_unit(coalition, &[family]) else {
                ctx.log.warn(format!("No {family:?} unit available, support skipped"));
                continue;
            };
            let callsign = match self.callsigns.next(coalition, kind, &mut ctx.rng) {
                Ok(callsign) => callsign,
                Err(err) => {
                    ctx.log.warn(format!("Support aircraft skipped: {err}"));
                    continue;
                }
            };

            let position = home.random_offset(&mut ctx.rng, SUPPORT_DISTANCE_NM.scaled(METERS_PER_NM));
            let group = self.push_group(
                ctx,
                GroupSpec {
                    coalition,
                    role,
                    coordinates: position,
                    destination: Some(home),
                    spawn_point_id: None,
                    airbase_id: None,
                    altitude_ft: cruise_altitude(unit),
                    callsign: Some(callsign),
                    unit,
                    copies: 1,
                    lead_skill: Skill::High,
                    wing_skill: Skill::High,
                },
            );
            ctx.log.info(format!("{} on station ({})", group.name, unit.display_name));
        }
    }

    /// Surface-to-air sites; enemy sites cover the objectives, friendly
    /// sites cover the home airbase
    pub fn add_air_defense(
        &mut self,
        ctx: &mut RunContext<'_>,
        side: Side,
        amount: Amount,
        objectives: &[MissionObjective],
        home: Coordinates,
    ) -> ResolvedAmount {
        let resolved = amount.resolve(&mut ctx.rng);
        let coalition = side.coalition(ctx.player);
        let mut placed_sites = 0;

        for (tier, count) in AIR_DEFENSE_TIERS.iter().zip(air_defense_counts(resolved)) {
            for i in 0..count {
                let center = match side {
                    Side::Enemy if !objectives.is_empty() => {
                        objectives[i % objectives.len()].coordinates
                    }
                    _ => home,
                };

                let Some(unit) = ctx.pick_unit(coalition, &[tier.family]) else {
                    ctx.log.warn(format!(
                        "No {:?} unit for the {} coalition, air defense site skipped",
                        tier.family,
                        coalition.as_str()
                    ));
                    break;
                };
                let Some(selection) = place_near(ctx, tier.spawn_types, center, tier.distance_nm)
                else {
                    ctx.log.warn(format!(
                        "No spawn point left for a {:?} site, skipped",
                        tier.family
                    ));
                    break;
                };

                let skill = ctx.ai_skill(coalition);
                self.push_group(
                    ctx,
                    ground_group(coalition, GroupRole::AirDefense, &selection, unit, 1, skill),
                );
                placed_sites += 1;
            }
        }

        tracing::debug!(
            coalition = coalition.as_str(),
            amount = resolved.as_str(),
            placed_sites,
            "Air defense placed"
        );
        resolved
    }

    /// Two-ship fighter patrols launched from the nearest airbase of the
    /// side, patrolling around the objectives' center
    pub fn add_combat_air_patrol(
        &mut self,
        ctx: &mut RunContext<'_>,
        side: Side,
        amount: Amount,
        objectives: &[MissionObjective],
        home: Coordinates,
    ) -> ResolvedAmount {
        let resolved = amount.resolve(&mut ctx.rng);
        let coalition = side.coalition(ctx.player);
        if resolved.level() == 0 {
            return resolved;
        }

        let points: Vec<Coordinates> = objectives.iter().map(|o| o.coordinates).collect();
        let center = Coordinates::centroid(&points).unwrap_or(home);

        let owned = &ctx.airbase_coalitions;
        let Some(airbase) = ctx
            .spawns
            .nearest_airbase(&center, |n| owned.get(&n.id) == Some(&coalition))
        else {
            ctx.log.warn(format!(
                "No airbase for the {} coalition, combat air patrol skipped",
                coalition.as_str()
            ));
            return resolved;
        };

        for _ in 0..resolved.level() {
            let Some(unit) = ctx.pick_unit(coalition, &[UnitFamily::PlaneFighter]) else {
                ctx.log.warn(format!(
                    "No fighter for the {} coalition, combat air patrol skipped",
                    coalition.as_str()
                ));
                break;
            };
            let callsign = match self.callsigns.next(coalition, CallsignKind::Flight, &mut ctx.rng) {
                Ok(callsign) => callsign,
                Err(err) => {
                    ctx.log.warn(format!("Combat air patrol skipped: {err}"));
                    break;
                }
            };

            let patrol = center.random_offset(&mut ctx.rng, CAP_PATROL_DISTANCE_NM.scaled(METERS_PER_NM));
            let skill = ctx.ai_skill(coalition);
            self.push_group(
                ctx,
                GroupSpec {
                    coalition,
                    role: GroupRole::CombatAirPatrol,
                    coordinates: airbase.coordinates,
                    destination: Some(patrol),
                    spawn_point_id: None,
                    airbase_id: Some(airbase.id.clone()),
                    altitude_ft: cruise_altitude(unit),
                    callsign: Some(callsign),
                    unit,
                    copies: CAP_FLIGHT_SIZE,
                    lead_skill: skill,
                    wing_skill: skill,
                },
            );
        }

        resolved
    }

    /// Feature groups around every objective
    pub fn add_features(
        &mut self,
        ctx: &mut RunContext<'_>,
        features: &[&FeatureDefinition],
        objectives: &[MissionObjective],
    ) {
        for feature in features {
            let coalition = feature.side.coalition(ctx.player);

            for placed in objectives {
                let Some(unit) = ctx.pick_unit(coalition, &feature.families) else {
                    ctx.log.warn(format!("No unit for feature {}, skipped", feature.id));
                    break;
                };
                let Some(selection) = place_near(
                    ctx,
                    &feature.spawn_point_types,
                    placed.coordinates,
                    feature.spawn_distance_nm,
                ) else {
                    ctx.log.warn(format!(
                        "No spawn point for feature {} near objective {}",
                        feature.id, placed.name
                    ));
                    continue;
                };

                let copies = feature.unit_count.random(&mut ctx.rng).max(1);
                let skill = ctx.ai_skill(coalition);
                let mut spec = ground_group(
                    coalition,
                    GroupRole::Feature {
                        objective: placed.index,
                    },
                    &selection,
                    unit,
                    copies,
                    skill,
                );
                if is_aircraft(unit) {
                    spec.altitude_ft = cruise_altitude(unit);
                }
                self.push_group(ctx, spec);
                ctx.media_files.extend(feature.media_files.iter().cloned());
            }
        }
    }

    fn push_group(&mut self, ctx: &RunContext<'_>, spec: GroupSpec<'_>) -> &UnitGroup {
        let group_id = self.next_group_id;
        self.next_group_id += 1;

        let name = spec
            .callsign
            .as_ref()
            .map_or_else(|| format!("{} {group_id}", role_label(spec.role)), Callsign::group_name);

        let type_names: Vec<&str> = if spec.unit.type_names.is_empty() {
            vec![spec.unit.id.as_str()]
        } else {
            spec.unit.type_names.iter().map(String::as_str).collect()
        };

        let mut units = Vec::new();
        for _ in 0..spec.copies {
            for type_name in &type_names {
                let position = units.len() + 1;
                units.push(MissionUnit {
                    unit_id: self.next_unit_id,
                    name: spec
                        .callsign
                        .as_ref()
                        .map_or_else(|| format!("{name}-{position}"), |c| c.unit_name(position)),
                    definition_id: spec.unit.id.clone(),
                    type_name: (*type_name).to_string(),
                    skill: if position == 1 {
                        spec.lead_skill
                    } else {
                        spec.wing_skill
                    },
                });
                self.next_unit_id += 1;
            }
        }

        self.groups.push(UnitGroup {
            group_id,
            name,
            coalition: spec.coalition,
            country: ctx.country(spec.coalition),
            role: spec.role,
            coordinates: spec.coordinates,
            destination: spec.destination,
            spawn_point_id: spec.spawn_point_id,
            airbase_id: spec.airbase_id,
            altitude_ft: spec.altitude_ft,
            callsign: spec.callsign,
            units,
        });

        let group = &self.groups[self.groups.len() - 1];
        tracing::debug!(
            group_id,
            name = %group.name,
            coalition = group.coalition.as_str(),
            role = ?group.role,
            units = group.units.len(),
            "Unit group added"
        );
        group
    }
}

fn place_near<'a>(
    ctx: &mut RunContext<'a>,
    types: &[SpawnPointType],
    center: Coordinates,
    distance_nm: ValueRange<f64>,
) -> Option<SpawnSelection<'a>> {
    let query = SpawnQuery::of_types(types).around(center, distance_nm.scaled(METERS_PER_NM));
    ctx.spawns
        .random_spawn_point(&mut ctx.rng, &mut ctx.exclusion, &query)
}

fn ground_group<'u>(
    coalition: Coalition,
    role: GroupRole,
    selection: &SpawnSelection<'_>,
    unit: &'u UnitDefinition,
    copies: u32,
    skill: Skill,
) -> GroupSpec<'u> {
    GroupSpec {
        coalition,
        role,
        coordinates: selection.point.coordinates,
        destination: None,
        spawn_point_id: Some(selection.point.id.clone()),
        airbase_id: None,
        altitude_ft: 0.0,
        callsign: None,
        unit,
        copies,
        lead_skill: skill,
        wing_skill: skill,
    }
}

fn is_aircraft(unit: &UnitDefinition) -> bool {
    unit.families.iter().any(|f| f.is_aircraft())
}

fn cruise_altitude(unit: &UnitDefinition) -> f64 {
    unit.aircraft
        .map_or(DEFAULT_CRUISE_ALTITUDE_FT, |a| a.cruise_altitude_ft)
}

const fn role_label(role: GroupRole) -> &'static str {
    match role {
        GroupRole::PlayerFlight => "Flight",
        GroupRole::ObjectiveTarget { .. } => "Target",
        GroupRole::ObjectiveDefense { .. } => "Defense",
        GroupRole::AirDefense => "Air defense",
        GroupRole::CombatAirPatrol => "CAP",
        GroupRole::Tanker => "Tanker",
        GroupRole::Awacs => "AWACS",
        GroupRole::Feature { .. } => "Feature",
    }
}
