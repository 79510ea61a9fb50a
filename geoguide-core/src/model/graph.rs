//! Navigable map graph: nodes, undirected typed edges and named points of interest

use std::collections::BTreeMap;

use geo::{Rect, coord};
use hashbrown::HashMap;
use petgraph::{
    stable_graph::{NodeIndex, StableUnGraph},
    visit::{EdgeRef, IntoEdgeReferences},
};

use super::components::{Edge, EdgeKind, Node, NodeKind};
use crate::{Error, GeoPoint, NodeId};

/// In-memory map of a loaded region.
///
/// Node ids are stable keys taken from the map data, so re-adding a node
/// with a known id is a no-op rather than a duplicate.
#[derive(Debug, Clone, Default)]
pub struct MapGraph {
    graph: StableUnGraph<Node, EdgeKind>,
    index: HashMap<NodeId, NodeIndex>,
    pois: BTreeMap<String, Vec<GeoPoint>>,
}

impl MapGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, returns `false` if a node with that id already exists
    /// (the existing node is kept unchanged).
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        let idx = self.graph.add_node(node);
        self.index.insert(node.id, idx);
        true
    }

    /// Adds a node under a freshly assigned id: one past the largest id in
    /// use, or the lowest free id once `NodeId::MAX` is taken.
    pub fn insert_node(&mut self, location: GeoPoint, kind: NodeKind) -> NodeId {
        let id = match self.index.keys().max() {
            None => 0,
            Some(&max) => max.checked_add(1).unwrap_or_else(|| {
                (0..NodeId::MAX)
                    .find(|id| !self.index.contains_key(id))
                    .unwrap_or(NodeId::MAX)
            }),
        };
        self.add_node(Node::new(id, location, kind));
        id
    }

    /// Connects two existing nodes.
    ///
    /// Returns `Ok(false)` when the same pair is already connected by an edge
    /// of the same kind.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] if either endpoint is absent.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, kind: EdgeKind) -> Result<bool, Error> {
        let ia = self.index_of(a).ok_or(Error::UnknownNode(a))?;
        let ib = self.index_of(b).ok_or(Error::UnknownNode(b))?;

        if self.graph.edges_connecting(ia, ib).any(|e| *e.weight() == kind) {
            return Ok(false);
        }
        self.graph.add_edge(ia, ib, kind);
        Ok(true)
    }

    /// Removes one edge, returns whether it existed
    pub fn remove_edge(&mut self, edge: &Edge) -> bool {
        let (a, b) = edge.endpoints();
        let (Some(ia), Some(ib)) = (self.index_of(a), self.index_of(b)) else {
            return false;
        };
        let found = self
            .graph
            .edges_connecting(ia, ib)
            .find(|e| *e.weight() == edge.kind)
            .map(|e| e.id());

        match found {
            Some(edge_idx) => self.graph.remove_edge(edge_idx).is_some(),
            None => false,
        }
    }

    /// Removes a node that no edge references any more.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] if absent, [`Error::NodeInUse`] while edges
    /// still reference it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, Error> {
        let idx = self.index_of(id).ok_or(Error::UnknownNode(id))?;
        let in_use = self.graph.edges(idx).count();
        if in_use > 0 {
            return Err(Error::NodeInUse(id, in_use));
        }
        self.index.remove(&id);
        self.graph.remove_node(idx).ok_or(Error::UnknownNode(id))
    }

    /// Records a point of interest. A name may own several locations.
    pub fn add_poi(&mut self, name: impl Into<String>, point: GeoPoint) {
        self.pois.entry(name.into()).or_default().push(point);
    }

    pub fn node_at(&self, id: NodeId) -> Option<&Node> {
        self.index_of(id).and_then(|idx| self.graph.node_weight(idx))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Known locations of the named point of interest, empty if unknown
    pub fn pois_by_name(&self, name: &str) -> &[GeoPoint] {
        self.pois.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Adjacent nodes together with the connecting edge, ordered by neighbour
    /// id and edge kind.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] if `id` is absent.
    pub fn neighbors(&self, id: NodeId) -> Result<Vec<(Node, Edge)>, Error> {
        let idx = self.index_of(id).ok_or(Error::UnknownNode(id))?;
        let mut result: Vec<(Node, Edge)> = self
            .graph
            .edges(idx)
            .map(|e| {
                let other = if e.source() == idx { e.target() } else { e.source() };
                let node = self.graph[other];
                (node, Edge::new(id, node.id, *e.weight()))
            })
            .collect();
        result.sort_by(|(na, ea), (nb, eb)| na.id.cmp(&nb.id).then(ea.kind.cmp(&eb.kind)));
        Ok(result)
    }

    /// Great-circle length of an edge in metres, derived from its endpoints
    pub fn edge_length(&self, edge: &Edge) -> Result<f64, Error> {
        let (a, b) = edge.endpoints();
        let na = self.node_at(a).ok_or(Error::UnknownNode(a))?;
        let nb = self.node_at(b).ok_or(Error::UnknownNode(b))?;
        Ok(na.location.haversine_to(nb.location))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of POI locations across all names
    pub fn poi_count(&self) -> usize {
        self.pois.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0 && self.pois.is_empty()
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.index.clear();
        self.pois.clear();
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.graph.edge_references().map(|e| {
            Edge::new(self.graph[e.source()].id, self.graph[e.target()].id, *e.weight())
        })
    }

    pub fn pois(&self) -> impl Iterator<Item = (&str, &[GeoPoint])> {
        self.pois.iter().map(|(name, points)| (name.as_str(), points.as_slice()))
    }

    /// Geodetic bounding box of all nodes (`x` = lon, `y` = lat)
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let mut nodes = self.nodes();
        let first = nodes.next()?.location;
        let (mut min, mut max) = (first, first);
        for node in nodes {
            let p = node.location;
            min = GeoPoint::from_lat_lon(min.lat().min(p.lat()), min.lon().min(p.lon()));
            max = GeoPoint::from_lat_lon(max.lat().max(p.lat()), max.lon().max(p.lon()));
        }
        Some(Rect::new(
            coord! { x: min.lon(), y: min.lat() },
            coord! { x: max.lon(), y: max.lat() },
        ))
    }

    pub(crate) fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.index.get(&id).copied()
    }

    /// POI check used by idempotent merges
    pub(crate) fn has_poi(&self, name: &str, point: GeoPoint) -> bool {
        self.pois_by_name(name).contains(&point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: NodeId, lat: f64, lon: f64) -> Node {
        Node::new(id, GeoPoint::from_lat_lon(lat, lon), NodeKind::Basic)
    }

    fn sample() -> MapGraph {
        let mut graph = MapGraph::new();
        graph.add_node(node(1, 0.0, 0.0));
        graph.add_node(node(2, 0.0, 0.001));
        graph.add_node(node(3, 0.0, 0.002));
        graph.add_edge(1, 2, EdgeKind::Sidewalk).unwrap();
        graph.add_edge(2, 3, EdgeKind::Sidewalk).unwrap();
        graph
    }

    #[test]
    fn duplicate_node_ids_are_ignored() {
        let mut graph = sample();
        assert!(!graph.add_node(node(1, 5.0, 5.0)));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.node_at(1).unwrap().location, GeoPoint::from_lat_lon(0.0, 0.0));
    }

    #[test]
    fn inserted_nodes_get_fresh_ids() {
        let mut graph = sample();
        let id = graph.insert_node(GeoPoint::from_lat_lon(1.0, 1.0), NodeKind::Door);
        assert_eq!(id, 4);
        assert_eq!(graph.node_at(4).unwrap().kind, NodeKind::Door);
        assert_eq!(MapGraph::new().insert_node(GeoPoint::default(), NodeKind::Basic), 0);
    }

    #[test]
    fn inserted_node_after_largest_id_takes_a_gap() {
        let mut graph = sample();
        assert!(graph.add_node(node(NodeId::MAX, 1.0, 1.0)));

        let id = graph.insert_node(GeoPoint::from_lat_lon(2.0, 2.0), NodeKind::Basic);
        assert_eq!(id, 0);
        assert_eq!(graph.node_at(0).unwrap().location, GeoPoint::from_lat_lon(2.0, 2.0));

        let next = graph.insert_node(GeoPoint::from_lat_lon(3.0, 3.0), NodeKind::Basic);
        assert_eq!(next, 4);
        assert_eq!(graph.node_count(), 6);
    }

    #[test]
    fn edges_require_known_nodes() {
        let mut graph = sample();
        assert!(matches!(
            graph.add_edge(1, 42, EdgeKind::Street),
            Err(Error::UnknownNode(42))
        ));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn parallel_edges_need_distinct_kinds() {
        let mut graph = sample();
        assert!(!graph.add_edge(2, 1, EdgeKind::Sidewalk).unwrap());
        assert!(graph.add_edge(2, 1, EdgeKind::Crosswalk).unwrap());
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.remove_edge(&Edge::new(1, 2, EdgeKind::Crosswalk)));
        assert!(!graph.remove_edge(&Edge::new(1, 2, EdgeKind::Crosswalk)));
    }

    #[test]
    fn referenced_nodes_cannot_be_removed() {
        let mut graph = sample();
        assert!(matches!(graph.remove_node(2), Err(Error::NodeInUse(2, 2))));
        assert!(matches!(graph.remove_node(9), Err(Error::UnknownNode(9))));

        assert!(graph.remove_edge(&Edge::new(2, 3, EdgeKind::Sidewalk)));
        let removed = graph.remove_node(3).unwrap();
        assert_eq!(removed.id, 3);
        assert!(graph.node_at(3).is_none());
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn neighbors_are_sorted() {
        let mut graph = sample();
        graph.add_edge(2, 1, EdgeKind::Crosswalk).unwrap();
        let neighbors = graph.neighbors(2).unwrap();
        let ids: Vec<_> = neighbors.iter().map(|(n, e)| (n.id, e.kind)).collect();
        assert_eq!(
            ids,
            vec![
                (1, EdgeKind::Sidewalk),
                (1, EdgeKind::Crosswalk),
                (3, EdgeKind::Sidewalk)
            ]
        );
        assert!(matches!(graph.neighbors(77), Err(Error::UnknownNode(77))));
    }

    #[test]
    fn pois_allow_multiple_locations() {
        let mut graph = MapGraph::new();
        graph.add_poi("UST", GeoPoint::from_lat_lon(36.0, 127.0));
        graph.add_poi("UST", GeoPoint::from_lat_lon(36.1, 127.0));
        assert_eq!(graph.pois_by_name("UST").len(), 2);
        assert!(graph.pois_by_name("ust").is_empty());
        assert_eq!(graph.poi_count(), 2);
    }

    #[test]
    fn edge_length_follows_endpoints() {
        let graph = sample();
        let length = graph.edge_length(&Edge::new(1, 2, EdgeKind::Sidewalk)).unwrap();
        // 0.001 degree of longitude on the equator
        assert!((length - 111.2).abs() < 0.5, "length was {length}");
    }

    #[test]
    fn bounds_cover_all_nodes() {
        let bounds = sample().bounds().unwrap();
        assert_eq!(bounds.min().x, 0.0);
        assert_eq!(bounds.max().x, 0.002);
        assert!(MapGraph::new().bounds().is_none());
    }
}
