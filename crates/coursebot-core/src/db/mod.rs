//! Database layer for coursebot
//!
//! Provides SQLite-based storage with:
//! - Named document collections with JSON metadata
//! - Embedding BLOBs for brute-force nearest-neighbour search

mod documents;
mod schema;
mod stats;
pub mod vectors;

pub use documents::CollectionModel;
pub use schema::Database;
pub use stats::{CollectionStats, DatabaseStats};
