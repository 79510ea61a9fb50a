use geoguide_core::persistence::{map_from_str, path_from_str, path_to_string};
use geoguide_core::prelude::*;

fn campus() -> MapGraph {
    let mut graph = MapGraph::new();
    graph.add_node(Node::new(100, GeoPoint::from_lat_lon(36.3720, 127.3600), NodeKind::Basic));
    graph.add_node(Node::new(101, GeoPoint::from_lat_lon(36.3725, 127.3600), NodeKind::Crossing));
    graph.add_node(Node::new(102, GeoPoint::from_lat_lon(36.3725, 127.3607), NodeKind::Door));
    graph.add_edge(100, 101, EdgeKind::Sidewalk).unwrap();
    graph.add_edge(101, 102, EdgeKind::Crosswalk).unwrap();
    graph.add_edge(101, 102, EdgeKind::Street).unwrap();
    graph.add_poi("main gate", GeoPoint::from_lat_lon(36.3719, 127.3600));
    graph.add_poi("main gate", GeoPoint::from_lat_lon(36.3721, 127.3601));
    graph
}

#[test]
fn map_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("campus.json");
    save_map(&campus(), &file).unwrap();

    let restored = load_map(&file).unwrap();
    assert_eq!(restored.node_count(), 3);
    assert_eq!(restored.edge_count(), 3);
    assert_eq!(restored.pois_by_name("main gate").len(), 2);
    assert_eq!(restored.node_at(102).unwrap().kind, NodeKind::Door);
    assert!(restored.pois_by_name("Main Gate").is_empty());
}

#[test]
fn invalid_map_documents_are_rejected_whole() {
    for text in [
        // duplicate id
        r#"{"nodes": [
            {"id": 1, "lat": 0.0, "lon": 0.0, "kind": 0},
            {"id": 1, "lat": 1.0, "lon": 0.0, "kind": 0}
        ]}"#,
        // dangling edge
        r#"{"nodes": [{"id": 1, "lat": 0.0, "lon": 0.0, "kind": 0}],
            "edges": [{"nodeA": 1, "nodeB": 9, "kind": 0}]}"#,
        // unknown kind code
        r#"{"nodes": [{"id": 1, "lat": 0.0, "lon": 0.0, "kind": 7}]}"#,
        // latitude out of range
        r#"{"pois": [{"name": "x", "lat": -91.0, "lon": 0.0}]}"#,
    ] {
        assert!(
            matches!(map_from_str(text), Err(Error::MalformedDocument(_))),
            "accepted {text}"
        );
    }
}

#[test]
fn load_map_into_replaces_contents() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("campus.json");
    save_map(&campus(), &file).unwrap();

    let mut stale = MapGraph::new();
    stale.add_node(Node::new(7, GeoPoint::default(), NodeKind::Elevator));
    let shared = SharedMap::new(stale);

    load_map_into(&file, &shared).unwrap();
    let graph = shared.read().unwrap();
    assert!(!graph.contains_node(7));
    assert_eq!(graph.node_count(), 3);
}

#[test]
fn path_file_round_trip() {
    let graph = campus();
    let start = GeoPoint::from_lat_lon(36.3719, 127.3600);
    let goal = GeoPoint::from_lat_lon(36.3726, 127.3607);
    let path = build_path(start, goal, &graph).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("route.json");
    save_path(&path, &file).unwrap();
    let restored = load_path(&file).unwrap();

    assert_eq!(restored.waypoints(), path.waypoints());
    assert_eq!(restored.nodes(), path.nodes());
    assert_eq!(restored.edge_kinds(), path.edge_kinds());
}

#[test]
fn stored_path_carries_metadata() {
    let path = Path::from_waypoints(vec![
        GeoPoint::from_lat_lon(36.0, 127.0),
        GeoPoint::from_lat_lon(36.1, 127.1),
    ]);
    let text = path_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert!(value["created"].is_string());
    assert_eq!(value["start"]["lat"], 36.0);
    assert_eq!(value["goal"]["lon"], 127.1);
    assert_eq!(path_from_str(&text).unwrap(), path);
}
