use log::trace;

use crate::persistence::document::{EdgeRecord, MapDocument};
use crate::{MapGraph, Node};

/// Counts of what a merge actually changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub nodes_added: usize,
    pub edges_added: usize,
    pub pois_added: usize,
    /// Edges whose endpoints are not (yet) part of the graph
    pub deferred_edges: Vec<EdgeRecord>,
}

impl MergeOutcome {
    pub fn is_noop(&self) -> bool {
        self.nodes_added == 0
            && self.edges_added == 0
            && self.pois_added == 0
            && self.deferred_edges.is_empty()
    }
}

impl MapGraph {
    /// Merges a tile or map document into the graph.
    ///
    /// Merging is idempotent: known node ids keep their current record,
    /// an edge already present with the same kind is skipped and a POI with
    /// the same name and position is stored once. Edges that reference
    /// unknown nodes are returned in [`MergeOutcome::deferred_edges`] instead
    /// of failing the merge.
    pub fn merge_document(&mut self, document: &MapDocument) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        for record in &document.nodes {
            if self.add_node(Node::new(record.id, record.location(), record.kind)) {
                outcome.nodes_added += 1;
            }
        }

        for record in &document.edges {
            if !self.contains_node(record.node_a) || !self.contains_node(record.node_b) {
                trace!(
                    "Deferring edge {}-{}, endpoint not loaded",
                    record.node_a, record.node_b
                );
                outcome.deferred_edges.push(record.clone());
                continue;
            }
            if let Ok(true) = self.add_edge(record.node_a, record.node_b, record.kind) {
                outcome.edges_added += 1;
            }
        }

        for record in &document.pois {
            let location = record.location();
            if !self.has_poi(&record.name, location) {
                self.add_poi(record.name.clone(), location);
                outcome.pois_added += 1;
            }
        }

        outcome
    }

    /// Retries edges deferred by earlier merges.
    ///
    /// Returns the number of edges added and the records that still
    /// reference missing nodes.
    pub fn resolve_deferred(&mut self, edges: Vec<EdgeRecord>) -> (usize, Vec<EdgeRecord>) {
        let mut added = 0;
        let mut dangling = Vec::new();
        for record in edges {
            match self.add_edge(record.node_a, record.node_b, record.kind) {
                Ok(true) => added += 1,
                Ok(false) => {}
                Err(_) => dangling.push(record),
            }
        }
        (added, dangling)
    }
}
