//! Data model for the pedestrian map
//!
//! Contains the point type, graph components and the graph container with
//! its shared single-writer handle.

pub mod components;
pub mod graph;
pub mod point;
pub mod shared;
mod to_geojson;

pub use components::{Edge, EdgeKind, Node, NodeKind};
pub use graph::MapGraph;
pub use point::GeoPoint;
pub use shared::SharedMap;

pub(crate) use to_geojson::feature;
