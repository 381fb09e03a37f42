//! # Mission Definition Library
//!
//! Read-only lookup tables of typed definitions (theaters, units,
//! coalitions, objectives, languages, objective features), keyed by
//! case-insensitive id.
//!
//! ## Lifecycle
//!
//! ```text
//! ┌──────────────────────┐     ┌──────────────────────┐     ┌──────────────────────┐
//! │  JSON bundle file    │ ──▶ │  startup checks      │ ──▶ │  Library (read-only) │
//! │  (DefinitionBundle)  │     │  (fatal on failure)  │     │  shared by all runs  │
//! └──────────────────────┘     └──────────────────────┘     └──────────────────────┘
//! ```
//!
//! The library is built once. Construction either fully succeeds or returns
//! a [`LibraryError`], which the process treats as fatal. Nothing mutates a
//! library after construction, so it can be shared freely between runs
//! (`&Library` or `Arc<Library>`).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mission_library::Library;
//! use mission_domain::TheaterDefinition;
//!
//! let library = Library::load("data/library.json")?;
//! let theater = library.get::<TheaterDefinition>("Caucasus");
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod library;
pub mod table;

pub use error::{LibraryError, Result};
pub use library::{DefinitionBundle, Library, LibraryDefaults};
pub use table::{DefinitionTable, LibraryTable};
