use rstar::{RTree, primitives::GeomWithData};

use crate::{Error, GeoPoint, LocalFrame, MapGraph, NodeId};

type IndexedNode = GeomWithData<[f64; 2], NodeId>;

/// Nearest-node lookup over a graph projected into one planar frame
pub(crate) struct SnapIndex {
    frame: LocalFrame,
    tree: RTree<IndexedNode>,
}

impl SnapIndex {
    pub(crate) fn build(graph: &MapGraph, frame: LocalFrame) -> Result<Self, Error> {
        let mut points = Vec::with_capacity(graph.node_count());
        for node in graph.nodes() {
            let local = frame.to_local(node.location)?;
            // Far outside the frame's zone the series stops converging
            if local.x().is_finite() && local.y().is_finite() {
                points.push(IndexedNode::new([local.x(), local.y()], node.id));
            }
        }
        Ok(Self {
            frame,
            tree: RTree::bulk_load(points),
        })
    }

    /// Closest node to a geodetic point, ties resolved to the lower id
    pub(crate) fn nearest(&self, point: GeoPoint) -> Result<Option<NodeId>, Error> {
        let local = self.frame.to_local(point)?;
        let query = [local.x(), local.y()];

        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        let Some((first, best)) = candidates.next() else {
            return Ok(None);
        };
        let nearest = candidates
            .take_while(|(_, distance_2)| *distance_2 <= best)
            .map(|(node, _)| node.data)
            .fold(first.data, NodeId::min);
        Ok(Some(nearest))
    }
}
