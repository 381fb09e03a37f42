//! # Mission Generator
//!
//! Procedural generation of combat flight missions from a user template
//! and a read-only definition library.
//!
//! ## Pipeline
//!
//! - Environment: date, time of day, weather and wind
//! - Start airbase and objective placement on theater spawn points
//! - Flight plan with optional transit waypoints
//! - Unit groups: player flights, targets, air defense, CAP, support, features
//! - Localized briefing in plain text and HTML
//!
//! Every run is deterministic for a given seed.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod briefing;
pub mod callsign;
pub mod config;
pub mod environment;
pub mod error;
pub mod flight_plan;
pub mod generator;
pub mod log;
pub mod run;
pub mod spawn;
pub mod units;

#[cfg(test)]
mod test_support;

pub use config::{GeneratorConfig, LogFormat, SpawnSearchConfig};
pub use error::{GenerationError, Result};
pub use generator::MissionGenerator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
