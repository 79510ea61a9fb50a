use geo::LineString;
use geojson::{Feature, Geometry, Value as GeoJsonValue};
use serde_json::json;

use crate::model::feature;
use crate::{EdgeKind, Error, GeoPoint, NodeId};

/// Route produced by the path builder or read back from storage.
///
/// Waypoints run from the requested start over the traversed nodes to the
/// requested goal. `nodes` and `edge_kinds` are empty when the path was
/// stored without them.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    waypoints: Vec<GeoPoint>,
    nodes: Vec<NodeId>,
    edge_kinds: Vec<EdgeKind>,
}

impl Path {
    pub fn new(waypoints: Vec<GeoPoint>, nodes: Vec<NodeId>, edge_kinds: Vec<EdgeKind>) -> Self {
        Self {
            waypoints,
            nodes,
            edge_kinds,
        }
    }

    /// Path known only by its waypoints
    pub fn from_waypoints(waypoints: Vec<GeoPoint>) -> Self {
        Self::new(waypoints, Vec::new(), Vec::new())
    }

    pub fn waypoints(&self) -> &[GeoPoint] {
        &self.waypoints
    }

    /// Ids of the traversed graph nodes, in order
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Kind of each traversed edge, one fewer than `nodes`
    pub fn edge_kinds(&self) -> &[EdgeKind] {
        &self.edge_kinds
    }

    pub fn start(&self) -> Option<GeoPoint> {
        self.waypoints.first().copied()
    }

    pub fn goal(&self) -> Option<GeoPoint> {
        self.waypoints.last().copied()
    }

    /// Number of waypoints
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Great-circle length in metres along the waypoints
    pub fn length(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].haversine_to(pair[1]))
            .sum()
    }

    /// `LineString` feature of the waypoints
    pub fn to_geojson(&self) -> Result<Feature, Error> {
        let line: LineString<f64> = self.waypoints.iter().map(GeoPoint::to_geo).collect();
        let edge_kinds: Vec<String> = self.edge_kinds.iter().map(ToString::to_string).collect();
        feature(json!({
            "type": "Feature",
            "geometry": Geometry::new(GeoJsonValue::from(&line)),
            "properties": {
                "feature_type": "path",
                "length": self.length(),
                "nodes": self.nodes,
                "edge_kinds": edge_kinds,
            }
        }))
    }
}
