//! Per-run generation state.
//!
//! A [`RunContext`] is created at the start of every generation and dropped
//! at its end. It owns everything a run mutates (RNG, spawn exclusions, log,
//! media list) and borrows everything else from the library.

use std::collections::{BTreeMap, BTreeSet};

use mission_domain::{
    Coalition, CoalitionDefinition, MissionTemplate, PerCoalition, Skill, TheaterDefinition,
    UnitDefinition, UnitFamily,
};
use mission_library::Library;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::SpawnSearchConfig;
use crate::log::GenerationLog;
use crate::spawn::{ExclusionSet, SpawnIndex};

pub struct RunContext<'a> {
    pub library: &'a Library,
    pub template: &'a MissionTemplate,
    pub theater: &'a TheaterDefinition,
    pub coalitions: PerCoalition<&'a CoalitionDefinition>,
    /// Disjoint country lists, never empty
    pub countries: PerCoalition<Vec<String>>,
    pub player: Coalition,
    pub spawns: SpawnIndex<'a>,
    /// Filled once the start airbase is known
    pub airbase_coalitions: BTreeMap<String, Coalition>,
    pub exclusion: ExclusionSet,
    pub rng: StdRng,
    pub log: GenerationLog,
    pub media_files: BTreeSet<String>,
}

impl<'a> RunContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        library: &'a Library,
        template: &'a MissionTemplate,
        theater: &'a TheaterDefinition,
        coalitions: PerCoalition<&'a CoalitionDefinition>,
        countries: PerCoalition<Vec<String>>,
        spawn_search: SpawnSearchConfig,
        seed: u64,
        log: GenerationLog,
    ) -> Self {
        Self {
            library,
            template,
            theater,
            coalitions,
            countries,
            player: template.player_coalition,
            spawns: SpawnIndex::new(theater, spawn_search),
            airbase_coalitions: BTreeMap::new(),
            exclusion: ExclusionSet::new(),
            rng: StdRng::seed_from_u64(seed),
            log,
            media_files: BTreeSet::new(),
        }
    }

    pub fn country(&self, coalition: Coalition) -> String {
        self.countries[coalition].first().cloned().unwrap_or_default()
    }

    /// Pick a unit of any of `families` for `coalition`.
    ///
    /// The coalition's own unit lists are preferred; any library unit of a
    /// matching family is used when the coalition lists none.
    pub fn pick_unit(
        &mut self,
        coalition: Coalition,
        families: &[UnitFamily],
    ) -> Option<&'a UnitDefinition> {
        let library = self.library;
        let definition = self.coalitions[coalition];
        let preferred: Vec<&'a UnitDefinition> = families
            .iter()
            .filter_map(|family| definition.units.get(family))
            .flatten()
            .filter_map(|id| library.get::<UnitDefinition>(id))
            .filter(|unit| families.iter().any(|f| unit.has_family(*f)))
            .collect();

        if let Some(unit) = preferred.choose(&mut self.rng) {
            return Some(*unit);
        }

        let fallback: Vec<&'a UnitDefinition> = families
            .iter()
            .flat_map(|family| library.units_with_family(*family))
            .collect();
        let unit = fallback.choose(&mut self.rng).copied();
        if let Some(unit) = unit {
            tracing::debug!(
                coalition = coalition.as_str(),
                unit = %unit.id,
                "Coalition lists no unit for the requested families, using library unit"
            );
        }
        unit
    }

    /// Skill of AI units on `coalition`
    pub fn ai_skill(&mut self, coalition: Coalition) -> Skill {
        if coalition == self.player {
            Skill::High
        } else {
            *[Skill::Average, Skill::Good, Skill::High]
                .choose(&mut self.rng)
                .unwrap_or(&Skill::Average)
        }
    }
}
