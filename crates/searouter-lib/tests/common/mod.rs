//! Common test utilities and graph builders.
//!
//! Every builder derives edge weights that are never shorter than the
//! great-circle distance between their endpoints, so the geometric heuristics
//! stay admissible on the generated graphs.

#![allow(dead_code)]

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use searouter_lib::{
    great_circle_distance, Coordinate, Distance, EdgeRecord, Graph, LandmarkTable, RouteAlgorithm,
    Router, RouterConfig, RoutingResult, SearchEngine, VertexId,
};

/// Path to the shared fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Path to the small `.fmi` fixture.
pub fn small_sea_path() -> PathBuf {
    fixtures_dir().join("small_sea.fmi")
}

fn undirected(edges: &mut Vec<EdgeRecord>, from: VertexId, to: VertexId, weight: Distance) {
    edges.push(EdgeRecord::new(from, to, weight));
    edges.push(EdgeRecord::new(to, from, weight));
}

/// Weight that never undercuts the geodesic between `from` and `to`.
pub fn geodesic_weight(coordinates: &[Coordinate], from: VertexId, to: VertexId) -> Distance {
    let meters = great_circle_distance(coordinates[from as usize], coordinates[to as usize]);
    meters.ceil() as Distance + 1
}

/// Cycle of `count` vertices with weight 1 on every edge.
///
/// Vertices sit a few centimetres apart so any chord is far below one meter.
pub fn ring(count: u32) -> Graph {
    let coordinates = (0..count)
        .map(|index| {
            let angle = std::f64::consts::TAU * f64::from(index) / f64::from(count);
            Coordinate::new(1e-7 * angle.sin(), 1e-7 * angle.cos())
        })
        .collect();
    let mut edges = Vec::new();
    for vertex in 0..count {
        undirected(&mut edges, vertex, (vertex + 1) % count, 1);
    }
    Graph::from_edges(coordinates, edges).expect("valid ring")
}

/// Two disjoint triangles: `{0, 1, 2}` and `{3, 4, 5}`.
pub fn two_triangles() -> Graph {
    let coordinates = vec![
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 0.01),
        Coordinate::new(0.01, 0.0),
        Coordinate::new(1.0, 1.0),
        Coordinate::new(1.0, 1.01),
        Coordinate::new(1.01, 1.0),
    ];
    let mut edges = Vec::new();
    for (from, to) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)] {
        let weight = geodesic_weight(&coordinates, from, to);
        undirected(&mut edges, from, to, weight);
    }
    Graph::from_edges(coordinates, edges).expect("valid graph")
}

/// Hub `0` with leaves `1`, `2`, `3` at weights 10, 20 and 30.
pub fn star() -> Graph {
    let coordinates = vec![
        Coordinate::new(0.0, 0.0),
        Coordinate::new(5e-5, 0.0),
        Coordinate::new(0.0, 1e-4),
        Coordinate::new(-2e-4, 0.0),
    ];
    let mut edges = Vec::new();
    for (leaf, weight) in [(1, 10), (2, 20), (3, 30)] {
        undirected(&mut edges, 0, leaf, weight);
    }
    Graph::from_edges(coordinates, edges).expect("valid star")
}

/// `rows x cols` lattice with `spacing` degrees between neighbours.
pub fn lattice(rows: u32, cols: u32, spacing: f64) -> Graph {
    let coordinates: Vec<Coordinate> = (0..rows)
        .flat_map(|row| {
            (0..cols).map(move |col| {
                Coordinate::new(f64::from(row) * spacing, f64::from(col) * spacing)
            })
        })
        .collect();
    let mut edges = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let vertex = row * cols + col;
            if col + 1 < cols {
                let weight = geodesic_weight(&coordinates, vertex, vertex + 1);
                undirected(&mut edges, vertex, vertex + 1, weight);
            }
            if row + 1 < rows {
                let weight = geodesic_weight(&coordinates, vertex, vertex + cols);
                undirected(&mut edges, vertex, vertex + cols, weight);
            }
        }
    }
    Graph::from_edges(coordinates, edges).expect("valid lattice")
}

/// Random geometric graph: vertices scattered over a few degrees, a random
/// spanning path plus `extra_edges` random chords, each weight stretched by a
/// random factor of up to `max_stretch` over the geodesic.
///
/// With `islands > 1` the vertices are split into that many disconnected groups.
pub fn random_geometric(
    seed: u64,
    vertex_count: u32,
    extra_edges: usize,
    max_stretch: f64,
    islands: u32,
) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let coordinates: Vec<Coordinate> = (0..vertex_count)
        .map(|_| Coordinate::new(rng.gen_range(30.0..34.0), rng.gen_range(-20.0..-15.0)))
        .collect();
    let island_of = |vertex: VertexId| vertex % islands;

    let mut edges = Vec::new();
    let connect = |rng: &mut StdRng, from: VertexId, to: VertexId, edges: &mut Vec<EdgeRecord>| {
        let base = geodesic_weight(&coordinates, from, to);
        let stretch = rng.gen_range(1.0..=max_stretch);
        undirected(edges, from, to, (f64::from(base) * stretch).ceil() as Distance);
    };

    for island in 0..islands {
        let members: Vec<VertexId> = (0..vertex_count).filter(|&v| island_of(v) == island).collect();
        for pair in members.windows(2) {
            connect(&mut rng, pair[0], pair[1], &mut edges);
        }
    }
    let mut added = 0;
    while added < extra_edges {
        let from = rng.gen_range(0..vertex_count);
        let to = rng.gen_range(0..vertex_count);
        if from == to || island_of(from) != island_of(to) {
            continue;
        }
        connect(&mut rng, from, to, &mut edges);
        added += 1;
    }
    Graph::from_edges(coordinates, edges).expect("valid random graph")
}

/// Random graph with every vertex at the same position and weights spanning
/// two orders of magnitude. Geometric guidance degenerates to zero, leaving the
/// bidirectional stopping rules to carry correctness on their own.
pub fn adversarial(seed: u64, vertex_count: u32, edge_count: usize) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let coordinates = vec![Coordinate::new(12.0, 45.0); vertex_count as usize];
    let mut edges = Vec::new();
    for vertex in 1..vertex_count {
        let parent = rng.gen_range(0..vertex);
        undirected(&mut edges, parent, vertex, rng.gen_range(1..=200));
    }
    for _ in 0..edge_count {
        let from = rng.gen_range(0..vertex_count);
        let to = rng.gen_range(0..vertex_count);
        if from != to {
            let weight = if rng.gen_bool(0.3) {
                rng.gen_range(1..=3)
            } else {
                rng.gen_range(50..=500)
            };
            undirected(&mut edges, from, to, weight);
        }
    }
    Graph::from_edges(coordinates, edges).expect("valid adversarial graph")
}

/// Landmark table anchored at evenly spread vertex ids.
pub fn spread_landmarks(graph: &Graph, count: usize) -> LandmarkTable {
    let vertex_count = graph.vertex_count();
    let step = (vertex_count / count.max(1)).max(1);
    let anchors = (0..vertex_count)
        .step_by(step)
        .take(count)
        .map(|vertex| vertex as VertexId)
        .collect();
    LandmarkTable::from_anchors(graph, anchors).expect("landmarks build")
}

/// Ground-truth distances from `source` computed by plain Dijkstra.
pub fn true_distances(graph: &Graph, source: VertexId) -> Vec<Distance> {
    SearchEngine::dijkstra(graph)
        .route_to_all_vertices(source)
        .expect("source in range")
}

/// One router per algorithm, in `RouteAlgorithm::ALL` order.
pub fn all_routers<'g>(graph: &'g Graph, landmarks: &'g LandmarkTable) -> Vec<SearchEngine<'g>> {
    RouteAlgorithm::ALL
        .into_iter()
        .map(|algorithm| {
            SearchEngine::new(graph, algorithm, Some(landmarks), RouterConfig::default())
                .expect("router builds")
        })
        .collect()
}

/// Route `(start, target)` with every algorithm.
pub fn route_with_all(
    graph: &Graph,
    landmarks: &LandmarkTable,
    start: VertexId,
    target: VertexId,
) -> Vec<RoutingResult> {
    all_routers(graph, landmarks)
        .iter_mut()
        .map(|router| router.route(start, target).expect("route succeeds"))
        .collect()
}
