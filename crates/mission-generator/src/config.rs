//! # Generator Configuration
//!
//! Environment-based configuration for the generation pipeline and the CLI.

use std::env;

/// Default geometric growth of the spawn search range per expansion
pub const DEFAULT_EXPANSION_FACTOR: f64 = 1.1;

/// Default number of range expansions before a spawn query gives up
pub const DEFAULT_MAX_EXPANSIONS: u32 = 32;

/// Log output format of the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Spawn point search tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnSearchConfig {
    /// Each retry divides the lower bound and multiplies the upper bound by this
    pub expansion_factor: f64,

    /// Retries after the first, unsuccessful, query
    pub max_expansions: u32,
}

impl Default for SpawnSearchConfig {
    fn default() -> Self {
        Self {
            expansion_factor: DEFAULT_EXPANSION_FACTOR,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }
}

/// Generator configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Spawn point search tuning
    pub spawn_search: SpawnSearchConfig,

    /// Briefing language used when the template names none; the library
    /// default applies when this is unset too
    pub default_language: Option<String>,

    /// Logging level / filter directive
    pub log_level: String,

    /// Logging output format
    pub log_format: LogFormat,
}

impl GeneratorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = SpawnSearchConfig::default();

        let expansion_factor = lookup("MISSION_SPAWN_EXPANSION_FACTOR")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|f| *f > 1.0)
            .unwrap_or(defaults.expansion_factor);

        let max_expansions = lookup("MISSION_SPAWN_MAX_EXPANSIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_expansions);

        Self {
            spawn_search: SpawnSearchConfig {
                expansion_factor,
                max_expansions,
            },

            default_language: lookup("MISSION_DEFAULT_LANGUAGE").filter(|v| !v.trim().is_empty()),

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            log_format: lookup("LOG_FORMAT")
                .map(|v| {
                    if v.eq_ignore_ascii_case("json") {
                        LogFormat::Json
                    } else {
                        LogFormat::Pretty
                    }
                })
                .unwrap_or_default(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
