use geo::LineString;
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use super::MapGraph;
use crate::Error;

impl MapGraph {
    /// Exports nodes, edges and points of interest as a `GeoJSON`
    /// `FeatureCollection` for visualization.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let mut features = Vec::with_capacity(self.node_count() + self.edge_count());

        let mut nodes: Vec<_> = self.nodes().collect();
        nodes.sort_by_key(|node| node.id);
        for node in nodes {
            let geometry = Geometry::new(GeoJsonValue::from(&node.location.to_geo()));
            features.push(feature(json!({
                "type": "Feature",
                "geometry": geometry,
                "properties": {
                    "feature_type": "node",
                    "id": node.id,
                    "kind": node.kind.to_string(),
                }
            }))?);
        }

        let mut edges: Vec<_> = self.edges().collect();
        edges.sort();
        for edge in edges {
            let (a, b) = edge.endpoints();
            let (Some(na), Some(nb)) = (self.node_at(a), self.node_at(b)) else {
                continue;
            };
            let line = LineString::from(vec![na.location.to_geo(), nb.location.to_geo()]);
            features.push(feature(json!({
                "type": "Feature",
                "geometry": Geometry::new(GeoJsonValue::from(&line)),
                "properties": {
                    "feature_type": "edge",
                    "node_a": a,
                    "node_b": b,
                    "kind": edge.kind.to_string(),
                    "length": self.edge_length(&edge)?,
                }
            }))?);
        }

        for (name, points) in self.pois() {
            for point in points {
                features.push(feature(json!({
                    "type": "Feature",
                    "geometry": Geometry::new(GeoJsonValue::from(&point.to_geo())),
                    "properties": {
                        "feature_type": "poi",
                        "name": name,
                    }
                }))?);
            }
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }
}

pub(crate) fn feature(value: serde_json::Value) -> Result<Feature, Error> {
    Feature::from_json_value(value).map_err(|e| Error::MalformedDocument(e.to_string()))
}
