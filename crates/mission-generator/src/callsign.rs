//! Radio callsign allocation, unique per coalition within one run.

use std::collections::HashSet;

use mission_domain::{Callsign, CallsignStyle, Coalition, PerCoalition};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{GenerationError, Result};

const FLIGHT_NAMES: &[&str] = &[
    "Enfield",
    "Springfield",
    "Uzi",
    "Colt",
    "Dodge",
    "Ford",
    "Chevy",
    "Pontiac",
];
const TANKER_NAMES: &[&str] = &["Texaco", "Arco", "Shell"];
const AWACS_NAMES: &[&str] = &["Overlord", "Magic", "Wizard", "Focus", "Darkstar"];

/// Flight numbers available for each NATO callsign name
const FLIGHT_NUMBERS: std::ops::RangeInclusive<u8> = 1..=9;

/// Three-digit numeric callsigns
const NUMERIC_RANGE: std::ops::RangeInclusive<u16> = 100..=999;

/// What the callsign is for; NATO names differ by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallsignKind {
    Flight,
    Tanker,
    Awacs,
}

impl CallsignKind {
    const fn names(self) -> &'static [&'static str] {
        match self {
            Self::Flight => FLIGHT_NAMES,
            Self::Tanker => TANKER_NAMES,
            Self::Awacs => AWACS_NAMES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallsignGenerator {
    styles: PerCoalition<CallsignStyle>,
    used: PerCoalition<HashSet<Callsign>>,
}

impl CallsignGenerator {
    pub fn new(styles: PerCoalition<CallsignStyle>) -> Self {
        Self {
            styles,
            used: PerCoalition::default(),
        }
    }

    /// Draw a callsign not yet used by `coalition`
    pub fn next<R: Rng + ?Sized>(
        &mut self,
        coalition: Coalition,
        kind: CallsignKind,
        rng: &mut R,
    ) -> Result<Callsign> {
        let used = &self.used[coalition];

        let free: Vec<Callsign> = match self.styles[coalition] {
            CallsignStyle::Nato => kind
                .names()
                .iter()
                .flat_map(|name| {
                    FLIGHT_NUMBERS.map(move |flight| Callsign::Nato {
                        name: (*name).to_string(),
                        flight,
                    })
                })
                .filter(|c| !used.contains(c))
                .collect(),
            CallsignStyle::Russian => NUMERIC_RANGE
                .map(|number| Callsign::Numeric { number })
                .filter(|c| !used.contains(c))
                .collect(),
        };

        let callsign = free
            .choose(rng)
            .cloned()
            .ok_or(GenerationError::CallsignsExhausted(coalition))?;
        self.used[coalition].insert(callsign.clone());
        Ok(callsign)
    }
}
