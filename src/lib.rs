//! A grid-indexed proximity and age matching engine for a population of
//! people.
//!
//! Bulk-load a population with [`engine::MatchingEngine::add_person`] (or
//! [`loader::load_csv`] / [`testdata::generate`]), then find people near a
//! given position and age with [`engine::MatchingEngine::find_matching`].
//! The `wire`/`proto` modules and the `pplmed`/`pplmec` binaries (behind
//! the `binary` feature) expose the engine over a small TCP protocol.

pub mod cell;
pub mod engine;
pub mod error;
pub mod grid;
pub mod person;
pub mod pool;
pub mod proto;
pub mod spiral;
pub mod wire;

#[cfg(feature = "csv")]
pub mod loader;
#[cfg(feature = "rand")]
pub mod testdata;

pub use engine::{Config, MatchingEngine};
pub use error::{Error, Result};
pub use person::{GeoPosition, Person, PersonId};
