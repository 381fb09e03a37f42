//! # Generation Error Types
//!
//! Recoverable failures of a single generation run. The caller may retry
//! with an adjusted template; library construction failures live in
//! [`mission_library::LibraryError`] instead.

use mission_domain::{Coalition, DomainError, UnitFamily};
use thiserror::Error;

/// Generation-level errors
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Unknown {kind} '{id}'")]
    UnknownDefinition { kind: &'static str, id: String },

    #[error("Aircraft '{0}' is not player-controllable")]
    NoPlayerAircraft(String),

    #[error("Coalitions '{blue}' and '{red}' share all their countries")]
    CoalitionsShareCountries { blue: String, red: String },

    #[error("No airbase available for the {coalition:?} coalition in theater '{theater}'")]
    NoAirbase { coalition: Coalition, theater: String },

    #[error(
        "No spawn point found for objective #{index} ({objective_type}) between {min_nm:.0} and {max_nm:.0} nm"
    )]
    NoObjectiveSpawnPoint {
        index: usize,
        objective_type: String,
        min_nm: f64,
        max_nm: f64,
    },

    #[error("No unit available for family {family:?} in coalition '{coalition}'")]
    NoUnitsForFamily { family: UnitFamily, coalition: String },

    #[error("No callsign left for the {0:?} coalition")]
    CallsignsExhausted(Coalition),

    #[error("Missing localized string '{key}' in language '{language}'")]
    MissingLocalization { language: String, key: String },
}

impl GenerationError {
    /// Error code for logs and machine-readable output
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTemplate(_) => "INVALID_TEMPLATE",
            Self::UnknownDefinition { .. } => "UNKNOWN_DEFINITION",
            Self::NoPlayerAircraft(_) => "NO_PLAYER_AIRCRAFT",
            Self::CoalitionsShareCountries { .. } => "COALITIONS_SHARE_COUNTRIES",
            Self::NoAirbase { .. } => "NO_AIRBASE",
            Self::NoObjectiveSpawnPoint { .. } => "NO_OBJECTIVE_SPAWN_POINT",
            Self::NoUnitsForFamily { .. } => "NO_UNITS_FOR_FAMILY",
            Self::CallsignsExhausted(_) => "CALLSIGNS_EXHAUSTED",
            Self::MissingLocalization { .. } => "MISSING_LOCALIZATION",
        }
    }
}

impl From<DomainError> for GenerationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::MissingLocalization { language, key } => {
                Self::MissingLocalization { language, key }
            }
            other => Self::InvalidTemplate(other.to_string()),
        }
    }
}

/// Result type alias for generation steps
pub type Result<T> = std::result::Result<T, GenerationError>;
