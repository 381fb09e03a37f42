//! Objective placement and flight plan assembly.

use std::collections::HashSet;

use mission_domain::{
    Coordinates, FlightPlan, METERS_PER_NM, MissionObjective, MissionWaypoint, ObjectiveDefinition,
    ObjectiveDistance, ValueRange, WaypointKind,
};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{GenerationError, Result};
use crate::spawn::{ExclusionSet, SpawnIndex, SpawnQuery};

/// Range factor applied to every objective after the first
pub const FOLLOW_UP_RANGE_FACTOR: f64 = 0.25;

/// Transit waypoint offset, as a share of its leg length
const TRANSIT_INACCURACY: ValueRange<f64> = ValueRange { min: 0.05, max: 0.15 };

static CODENAMES: &[&str] = &[
    "Anvil", "Bastion", "Cobalt", "Dagger", "Ember", "Falcon", "Granite", "Hammer", "Iron",
    "Javelin", "Kestrel", "Lancer", "Mantis", "Nomad", "Onyx", "Python", "Quarry", "Raptor",
    "Sabre", "Talon", "Umbra", "Viper", "Warden", "Yankee", "Zephyr",
];

/// Place `count` objectives, each on its own spawn point.
///
/// The first objective is searched around `start` within the requested
/// distance; every following one around the previous objective within a
/// quarter of that distance.
pub fn build_objectives<R: Rng + ?Sized>(
    spawns: &SpawnIndex<'_>,
    exclusion: &mut ExclusionSet,
    rng: &mut R,
    objective: &ObjectiveDefinition,
    count: u8,
    distance: ObjectiveDistance,
    start: Coordinates,
) -> Result<Vec<MissionObjective>> {
    let range_nm = distance.range_nm().unwrap_or_else(|| {
        ObjectiveDistance::CONCRETE
            .choose(rng)
            .and_then(|d| d.range_nm())
            .unwrap_or(ValueRange { min: 40.0, max: 80.0 })
    });

    let mut codenames = Codenames::default();
    let mut objectives: Vec<MissionObjective> = Vec::with_capacity(usize::from(count));
    let mut reference = start;

    for index in 0..usize::from(count) {
        let range_nm = if index == 0 {
            range_nm
        } else {
            range_nm.scaled(FOLLOW_UP_RANGE_FACTOR)
        };

        let query = SpawnQuery::of_types(&objective.spawn_point_types)
            .around(reference, range_nm.scaled(METERS_PER_NM));
        let selection = spawns
            .random_spawn_point(rng, exclusion, &query)
            .ok_or_else(|| GenerationError::NoObjectiveSpawnPoint {
                index,
                objective_type: objective.id.clone(),
                min_nm: range_nm.min,
                max_nm: range_nm.max,
            })?;

        let placed = MissionObjective {
            index,
            name: codenames.next(rng),
            objective_type: objective.id.clone(),
            node_id: selection.node.id.clone(),
            node_name: selection.node.name.clone(),
            spawn_point_id: selection.point.id.clone(),
            coordinates: selection.point.coordinates,
            altitude_hint_ft: objective.waypoint_altitude_ft.random(rng),
            group_size_hint: objective.target_group_size.random(rng).max(1),
        };

        tracing::debug!(
            index,
            objective = %placed.name,
            node = %placed.node_id,
            distance_nm = reference.distance_to_nm(&placed.coordinates),
            "Objective placed"
        );

        reference = placed.coordinates;
        objectives.push(placed);
    }

    Ok(objectives)
}

/// Ordered waypoints: optional ingress transit, one per objective, optional
/// egress transit. Objective waypoints are offset from the spawn point by
/// the objective's inaccuracy range.
pub fn build_waypoints<R: Rng + ?Sized>(
    objectives: &[MissionObjective],
    objective: &ObjectiveDefinition,
    transit: bool,
    home: Coordinates,
    rng: &mut R,
) -> Vec<MissionWaypoint> {
    let inaccuracy_m = objective.waypoint_inaccuracy_nm.scaled(METERS_PER_NM);

    let mut waypoints: Vec<MissionWaypoint> = objectives
        .iter()
        .map(|o| MissionWaypoint {
            name: o.name.to_uppercase(),
            coordinates: o.coordinates.random_offset(rng, inaccuracy_m),
            altitude_ft: o.altitude_hint_ft,
            kind: WaypointKind::Objective { index: o.index },
        })
        .collect();

    if transit {
        if let (Some(first), Some(last)) = (waypoints.first().cloned(), waypoints.last().cloned()) {
            let ingress = transit_waypoint("INGRESS", home, &first, rng);
            let egress = transit_waypoint("EGRESS", home, &last, rng);
            waypoints.insert(0, ingress);
            waypoints.push(egress);
        }
    }

    waypoints
}

/// Assemble objectives and waypoints into a flight plan
pub fn build_flight_plan<R: Rng + ?Sized>(
    objectives: &[MissionObjective],
    objective: &ObjectiveDefinition,
    transit: bool,
    home: Coordinates,
    rng: &mut R,
) -> FlightPlan {
    FlightPlan::new(home, build_waypoints(objectives, objective, transit, home, rng))
}

fn transit_waypoint<R: Rng + ?Sized>(
    name: &str,
    home: Coordinates,
    toward: &MissionWaypoint,
    rng: &mut R,
) -> MissionWaypoint {
    let leg = home.distance_to(&toward.coordinates);
    MissionWaypoint {
        name: name.to_string(),
        coordinates: home
            .lerp(&toward.coordinates, 0.5)
            .random_offset(rng, TRANSIT_INACCURACY.scaled(leg)),
        altitude_ft: toward.altitude_ft,
        kind: WaypointKind::Transit,
    }
}

/// Codenames without repeats within one run
#[derive(Debug, Default)]
struct Codenames {
    used: HashSet<String>,
}

impl Codenames {
    fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        let free: Vec<&str> = CODENAMES
            .iter()
            .copied()
            .filter(|name| !self.used.contains(*name))
            .collect();
        let name = free.choose(rng).map_or_else(
            || format!("Objective {}", self.used.len() + 1),
            |name| (*name).to_string(),
        );
        self.used.insert(name.clone());
        name
    }
}
