//! Wire records shared by tile payloads and persisted map files

use serde::{Deserialize, Serialize};

use crate::{EdgeKind, Error, GeoPoint, MapGraph, NodeId, NodeKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    #[serde(rename = "nodeA")]
    pub node_a: NodeId,
    #[serde(rename = "nodeB")]
    pub node_b: NodeId,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiRecord {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Map document: a tile payload or a saved map.
///
/// Unknown fields are ignored and missing arrays read as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
    #[serde(default)]
    pub pois: Vec<PoiRecord>,
}

impl NodeRecord {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::from_lat_lon(self.lat, self.lon)
    }
}

impl PoiRecord {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::from_lat_lon(self.lat, self.lon)
    }
}

fn check_coordinate(what: &str, lat: f64, lon: f64) -> Result<(), Error> {
    if GeoPoint::from_lat_lon(lat, lon).is_valid_geodetic() {
        Ok(())
    } else {
        Err(Error::MalformedDocument(format!(
            "{what} has invalid coordinates ({lat}, {lon})"
        )))
    }
}

impl MapDocument {
    /// Parses and validates a document.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedDocument`] on syntax errors, missing or mistyped
    /// fields and out-of-range coordinates.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let document: MapDocument = serde_json::from_str(text)?;
        document.validate()?;
        Ok(document)
    }

    /// Record-level checks that do not depend on other documents
    pub fn validate(&self) -> Result<(), Error> {
        for node in &self.nodes {
            check_coordinate(&format!("node {}", node.id), node.lat, node.lon)?;
        }
        for poi in &self.pois {
            check_coordinate(&format!("POI '{}'", poi.name), poi.lat, poi.lon)?;
        }
        Ok(())
    }

    /// Full snapshot of a graph, records sorted for stable output
    pub fn from_graph(graph: &MapGraph) -> Self {
        let mut nodes: Vec<NodeRecord> = graph
            .nodes()
            .map(|node| NodeRecord {
                id: node.id,
                lat: node.location.lat(),
                lon: node.location.lon(),
                kind: node.kind,
            })
            .collect();
        nodes.sort_by_key(|node| node.id);

        let mut edges: Vec<_> = graph.edges().collect();
        edges.sort();
        let edges = edges
            .into_iter()
            .map(|edge| {
                let (node_a, node_b) = edge.endpoints();
                EdgeRecord {
                    node_a,
                    node_b,
                    kind: edge.kind,
                }
            })
            .collect();

        let pois = graph
            .pois()
            .flat_map(|(name, points)| {
                points.iter().map(move |point| PoiRecord {
                    name: name.to_string(),
                    lat: point.lat(),
                    lon: point.lon(),
                })
            })
            .collect();

        Self { nodes, edges, pois }
    }

    /// Builds a standalone graph from this document, all or nothing.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedDocument`] for duplicate node ids or edges that
    /// reference undeclared nodes.
    pub fn into_graph(self) -> Result<MapGraph, Error> {
        self.validate()?;
        let mut graph = MapGraph::new();

        for node in &self.nodes {
            if !graph.add_node(crate::Node::new(node.id, node.location(), node.kind)) {
                return Err(Error::MalformedDocument(format!(
                    "duplicate node id {}",
                    node.id
                )));
            }
        }
        for edge in &self.edges {
            graph
                .add_edge(edge.node_a, edge.node_b, edge.kind)
                .map_err(|e| Error::MalformedDocument(format!("edge {edge:?}: {e}")))?;
        }
        for poi in self.pois {
            let location = poi.location();
            graph.add_poi(poi.name, location);
        }

        Ok(graph)
    }
}
