//! This module acquires map tiles around a position, caches their payloads
//! and merges them into a shared map graph.

mod cache;
mod config;
mod loader;
mod merge;
mod source;

pub use cache::TileCache;
pub use config::{LoaderConfig, MAX_TILE_RADIUS};
pub use loader::{LoadReport, TileLoader};
pub use merge::MergeOutcome;
pub use source::{FixtureTileSource, HttpTileSource, MemoryTileSource, TileSource, expand_template};
