//! Library error types.
//!
//! Every variant is fatal to the process: a library that fails to build
//! must never reach the generation pipeline.

use std::path::PathBuf;

use mission_domain::DomainError;
use thiserror::Error;

/// Definition library errors
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Failed to read definition bundle {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed definition bundle: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate {kind} definition '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Required default {kind} definition '{id}' not found")]
    MissingDefault { kind: &'static str, id: String },

    #[error("Default player aircraft '{0}' is not player-controllable")]
    DefaultAircraftNotControllable(String),

    #[error("Invalid {kind} definition '{id}': {source}")]
    InvalidDefinition {
        kind: &'static str,
        id: String,
        #[source]
        source: DomainError,
    },
}

pub type Result<T> = std::result::Result<T, LibraryError>;
