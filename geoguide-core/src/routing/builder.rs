use log::debug;

use super::Path;
use super::dijkstra::shortest_route;
use super::snap::SnapIndex;
use crate::{Error, GeoPoint, LocalFrame, MapGraph, SharedMap};

fn check_input(point: GeoPoint) -> Result<(), Error> {
    if point.is_valid_geodetic() {
        Ok(())
    } else {
        Err(Error::InvalidCoordinate {
            lat: point.lat(),
            lon: point.lon(),
        })
    }
}

/// Builds a walking route from `start` to `goal` over `graph`.
///
/// Both points are snapped to their nearest node, measured in the UTM zone
/// of `start`. The waypoints are `start`, the traversed node locations and
/// `goal`; an endpoint that coincides with its snapped node is not repeated.
///
/// # Errors
///
/// - [`Error::InvalidCoordinate`] for points outside the geodetic range
/// - [`Error::NoRoute`] when the graph is empty or the snapped nodes are not
///   connected
pub fn build_path(start: GeoPoint, goal: GeoPoint, graph: &MapGraph) -> Result<Path, Error> {
    check_input(start)?;
    check_input(goal)?;

    let index = SnapIndex::build(graph, LocalFrame::around(start))?;
    let (Some(from), Some(to)) = (index.nearest(start)?, index.nearest(goal)?) else {
        return Err(Error::NoRoute);
    };
    debug!("Snapped start to node {from}, goal to node {to}");

    let route = shortest_route(graph, from, to)?.ok_or(Error::NoRoute)?;

    let mut waypoints = Vec::with_capacity(route.nodes.len() + 2);
    waypoints.push(start);
    for id in &route.nodes {
        let location = graph.node_at(*id).ok_or(Error::UnknownNode(*id))?.location;
        if waypoints.last() != Some(&location) {
            waypoints.push(location);
        }
    }
    if waypoints.last() != Some(&goal) {
        waypoints.push(goal);
    }

    debug!(
        "Route over {} nodes, {:.1} m between snapped nodes",
        route.nodes.len(),
        route.cost
    );
    Ok(Path::new(waypoints, route.nodes, route.edge_kinds))
}

/// [`build_path`] against a shared map, holding the read lock throughout
pub fn build_path_shared(start: GeoPoint, goal: GeoPoint, map: &SharedMap) -> Result<Path, Error> {
    let graph = map.read()?;
    build_path(start, goal, &graph)
}
