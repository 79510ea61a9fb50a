use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use geoguide_core::prelude::*;

/// Square grid of `side * side` nodes roughly 10 m apart
fn grid(side: u64) -> MapGraph {
    let mut graph = MapGraph::new();
    let id = |row: u64, col: u64| row * side + col;
    for row in 0..side {
        for col in 0..side {
            let location =
                GeoPoint::from_lat_lon(36.37 + row as f64 * 1e-4, 127.36 + col as f64 * 1e-4);
            graph.add_node(Node::new(id(row, col), location, NodeKind::Basic));
        }
    }
    for row in 0..side {
        for col in 0..side {
            if col + 1 < side {
                let _ = graph.add_edge(id(row, col), id(row, col + 1), EdgeKind::Sidewalk);
            }
            if row + 1 < side {
                let _ = graph.add_edge(id(row, col), id(row + 1, col), EdgeKind::Street);
            }
        }
    }
    graph
}

fn transforms(c: &mut Criterion) {
    c.bench_function("geodetic_to_utm", |b| {
        b.iter(|| geodetic_to_utm(black_box(37.5665), black_box(126.9780), None));
    });
    c.bench_function("utm_round_trip", |b| {
        b.iter(|| {
            let utm = geodetic_to_utm(black_box(-33.8688), black_box(151.2093), None)?;
            utm.to_geodetic()
        });
    });
    c.bench_function("geodetic_to_tile", |b| {
        b.iter(|| geodetic_to_tile(black_box(127.36), black_box(36.37), DEFAULT_ZOOM));
    });
}

fn routing(c: &mut Criterion) {
    let graph = grid(60);
    let start = GeoPoint::from_lat_lon(36.37, 127.36);
    let goal = GeoPoint::from_lat_lon(36.3759, 127.3659);

    c.bench_function("build_path_grid_60", |b| {
        b.iter(|| build_path(black_box(start), black_box(goal), &graph));
    });
}

criterion_group!(benches, transforms, routing);
criterion_main!(benches);
