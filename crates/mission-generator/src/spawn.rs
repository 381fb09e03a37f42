//! Theater spatial index: spawn point and airbase queries.
//!
//! The index only borrows a theater and holds no mutable state. The set of
//! spawn points already used by a run lives in an [`ExclusionSet`] owned by
//! that run and passed into every query.

use std::collections::HashSet;

use mission_domain::{Coordinates, SpawnPoint, SpawnPointType, TheaterDefinition, TheaterNode, ValueRange};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::SpawnSearchConfig;

/// Spawn point ids consumed during one generation run
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    ids: HashSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns `false` if the id was already excluded
    pub fn insert(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Filter for [`SpawnIndex::random_spawn_point`]
#[derive(Debug, Clone, Copy)]
pub struct SpawnQuery<'q> {
    pub types: &'q [SpawnPointType],
    /// Reference point and allowed distance from it, in meters
    pub around: Option<(Coordinates, ValueRange<f64>)>,
}

impl<'q> SpawnQuery<'q> {
    pub const fn of_types(types: &'q [SpawnPointType]) -> Self {
        Self { types, around: None }
    }

    #[must_use]
    pub const fn around(mut self, reference: Coordinates, distance_m: ValueRange<f64>) -> Self {
        self.around = Some((reference, distance_m));
        self
    }
}

/// A selected spawn point with the node that owns it
#[derive(Debug, Clone, Copy)]
pub struct SpawnSelection<'a> {
    pub node: &'a TheaterNode,
    pub point: &'a SpawnPoint,
}

pub struct SpawnIndex<'a> {
    theater: &'a TheaterDefinition,
    config: SpawnSearchConfig,
}

impl<'a> SpawnIndex<'a> {
    pub const fn new(theater: &'a TheaterDefinition, config: SpawnSearchConfig) -> Self {
        Self { theater, config }
    }

    /// Pick a random free spawn point matching `query` and exclude it.
    ///
    /// When nothing matches, the distance range is widened geometrically and
    /// the query retried, up to the configured number of expansions.
    pub fn random_spawn_point<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        exclusion: &mut ExclusionSet,
        query: &SpawnQuery<'_>,
    ) -> Option<SpawnSelection<'a>> {
        let mut range = query.around.map(|(_, range)| range);

        for expansion in 0..=self.config.max_expansions {
            let candidates = self.candidates(exclusion, query.types, query.around.map(|a| a.0), range);

            if let Some(&(node, point)) = candidates.choose(rng) {
                exclusion.insert(&point.id);
                if expansion > 0 {
                    tracing::debug!(
                        spawn_point = %point.id,
                        expansion,
                        "Spawn point found after widening the search range"
                    );
                }
                return Some(SpawnSelection { node, point });
            }

            // Without a distance constraint widening changes nothing
            let Some(current) = range else { break };
            range = Some(current.widened(self.config.expansion_factor));
        }

        tracing::debug!(types = ?query.types, "No spawn point matches the query");
        None
    }

    fn candidates(
        &self,
        exclusion: &ExclusionSet,
        types: &[SpawnPointType],
        reference: Option<Coordinates>,
        range: Option<ValueRange<f64>>,
    ) -> Vec<(&'a TheaterNode, &'a SpawnPoint)> {
        self.theater
            .spawn_points()
            .filter(|(_, sp)| types.contains(&sp.point_type))
            .filter(|(_, sp)| !exclusion.contains(&sp.id))
            .filter(|(_, sp)| match (reference, range) {
                (Some(reference), Some(range)) => {
                    range.contains(reference.distance_to(&sp.coordinates))
                }
                _ => true,
            })
            .collect()
    }

    pub fn airbase(&self, id: &str) -> Option<&'a TheaterNode> {
        self.theater.node(id).filter(|n| n.is_airbase())
    }

    pub fn random_airbase<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        filter: impl Fn(&TheaterNode) -> bool,
    ) -> Option<&'a TheaterNode> {
        let airbases: Vec<_> = self.theater.airbases().filter(|n| filter(n)).collect();
        airbases.choose(rng).copied()
    }

    pub fn nearest_airbase(
        &self,
        point: &Coordinates,
        filter: impl Fn(&TheaterNode) -> bool,
    ) -> Option<&'a TheaterNode> {
        self.theater
            .airbases()
            .filter(|n| filter(n))
            .min_by(|a, b| {
                a.coordinates
                    .distance_to(point)
                    .total_cmp(&b.coordinates.distance_to(point))
            })
    }
}
