//! Geospatial map and path subsystem for pedestrian guidance.
//!
//! The crate converts between geodetic, UTM and slippy-tile coordinates,
//! acquires map tiles around a GPS fix into a navigable graph, builds routes
//! over that graph and persists maps and routes as JSON.

pub mod error;
pub mod loading;
pub mod model;
pub mod persistence;
pub mod prelude;
pub mod recognition;
pub mod routing;
pub mod transform;

pub use error::Error;
pub use loading::{LoadReport, LoaderConfig, TileCache, TileLoader, TileSource};
pub use model::{Edge, EdgeKind, GeoPoint, MapGraph, Node, NodeKind, SharedMap};
pub use routing::{Path, build_path, build_path_shared};
pub use transform::{LocalFrame, TileKey};

/// Stable node identifier taken from the map data
pub type NodeId = u64;

/// Zoom level the map service is queried at unless configured otherwise
pub const DEFAULT_ZOOM: u8 = 19;
