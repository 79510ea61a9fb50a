use std::{cmp::Ordering, collections::BinaryHeap};

use hashbrown::{HashMap, HashSet};

use crate::{EdgeKind, Error, MapGraph, NodeId};

#[derive(Copy, Clone, Debug)]
struct State {
    cost: f64,
    node: NodeId,
}

// Min-heap by cost, equal costs pop the lower node id first
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

/// Node sequence found by the search, with the kind of every traversed edge
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Route {
    pub(crate) nodes: Vec<NodeId>,
    pub(crate) edge_kinds: Vec<EdgeKind>,
    pub(crate) cost: f64,
}

/// Shortest route between two nodes, weights are edge lengths in metres.
///
/// Returns `Ok(None)` when `target` is unreachable. Among equally short
/// predecessors the one with the lower id wins, so the result does not depend
/// on insertion order.
pub(crate) fn shortest_route(
    graph: &MapGraph,
    start: NodeId,
    target: NodeId,
) -> Result<Option<Route>, Error> {
    if !graph.contains_node(start) {
        return Err(Error::UnknownNode(start));
    }
    if !graph.contains_node(target) {
        return Err(Error::UnknownNode(target));
    }

    let estimated_nodes = graph.node_count().min(1000);
    let mut distances: HashMap<NodeId, f64> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<NodeId, (NodeId, EdgeKind)> =
        HashMap::with_capacity(estimated_nodes);
    let mut settled: HashSet<NodeId> = HashSet::with_capacity(estimated_nodes);
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        if !settled.insert(node) {
            continue;
        }
        if node == target {
            break;
        }

        let Some(here) = graph.node_at(node).map(|n| n.location) else {
            continue;
        };

        // Sorted by (neighbour id, kind): a parallel edge keeps its lowest kind
        for (next, edge) in graph.neighbors(node)? {
            if settled.contains(&next.id) {
                continue;
            }
            let next_cost = cost + here.haversine_to(next.location);

            match distances.entry(next.id) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    predecessors.insert(next.id, (node, edge.kind));
                    heap.push(State {
                        cost: next_cost,
                        node: next.id,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        predecessors.insert(next.id, (node, edge.kind));
                        heap.push(State {
                            cost: next_cost,
                            node: next.id,
                        });
                    } else if next_cost == *entry.get()
                        && predecessors
                            .get(&next.id)
                            .is_some_and(|&(previous, _)| node < previous)
                    {
                        predecessors.insert(next.id, (node, edge.kind));
                    }
                }
            }
        }
    }

    if !settled.contains(&target) {
        return Ok(None);
    }

    let mut nodes = vec![target];
    let mut edge_kinds = Vec::new();
    let mut current = target;
    while current != start {
        let Some(&(previous, kind)) = predecessors.get(&current) else {
            return Ok(None);
        };
        nodes.push(previous);
        edge_kinds.push(kind);
        current = previous;
    }
    nodes.reverse();
    edge_kinds.reverse();

    Ok(Some(Route {
        nodes,
        edge_kinds,
        cost: distances.get(&target).copied().unwrap_or_default(),
    }))
}
