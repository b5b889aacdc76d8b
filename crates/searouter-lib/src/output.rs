use std::fmt::Write;

use serde::Serialize;
use serde_json::{json, Value};

use crate::graph::{Coordinate, Distance, Graph, VertexId};
use crate::landmarks::LandmarkTable;
use crate::result::RoutingResult;
use crate::search::RouteAlgorithm;

/// Vertex visited by a route, with its position.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteStep {
    pub index: usize,
    pub vertex: VertexId,
    pub lat: f64,
    pub lon: f64,
}

/// Structured representation of a routing result that consumers can serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub algorithm: RouteAlgorithm,
    pub start: VertexId,
    pub target: VertexId,
    pub found: bool,
    /// Total length in meters; `None` when no route exists.
    pub distance: Option<Distance>,
    pub hops: usize,
    pub elapsed_ms: f64,
    pub heap_pops: usize,
    pub steps: Vec<RouteStep>,
}

impl RouteSummary {
    /// Attach vertex coordinates to a routing result.
    pub fn from_result(
        graph: &Graph,
        start: VertexId,
        target: VertexId,
        result: &RoutingResult,
    ) -> Self {
        let steps = result
            .path
            .iter()
            .enumerate()
            .map(|(index, &vertex)| {
                let Coordinate { lat, lon } = graph.coordinate(vertex);
                RouteStep {
                    index,
                    vertex,
                    lat,
                    lon,
                }
            })
            .collect();

        Self {
            algorithm: result.algorithm,
            start,
            target,
            found: result.found,
            distance: result.found.then_some(result.distance),
            hops: result.hop_count(),
            elapsed_ms: result.elapsed.as_secs_f64() * 1000.0,
            heap_pops: result.heap_pops,
            steps,
        }
    }

    /// Plain-text rendering: a header line followed by one line per vertex.
    pub fn render_plain(&self) -> String {
        let mut buffer = String::new();
        match self.distance {
            Some(distance) => {
                let _ = writeln!(
                    buffer,
                    "Route: {} -> {} ({:.3} km, {} hops, algorithm: {})",
                    self.start,
                    self.target,
                    f64::from(distance) / 1000.0,
                    self.hops,
                    self.algorithm
                );
            }
            None => {
                let _ = writeln!(
                    buffer,
                    "No route: {} -> {} (algorithm: {})",
                    self.start, self.target, self.algorithm
                );
            }
        }
        for step in &self.steps {
            let _ = writeln!(
                buffer,
                "{:>4}: {} ({:.5}, {:.5})",
                step.index, step.vertex, step.lat, step.lon
            );
        }
        let _ = writeln!(
            buffer,
            "computed in {:.3} ms with {} heap pops",
            self.elapsed_ms, self.heap_pops
        );
        buffer
    }

    /// GeoJSON `Feature` with a `LineString` geometry (coordinates are `[lon, lat]`).
    pub fn to_geojson(&self) -> Value {
        let coordinates: Vec<[f64; 2]> = self.steps.iter().map(|s| [s.lon, s.lat]).collect();
        json!({
            "type": "Feature",
            "geometry": {
                "type": "LineString",
                "coordinates": coordinates,
            },
            "properties": {
                "algorithm": self.algorithm,
                "start": self.start,
                "target": self.target,
                "found": self.found,
                "distance": self.distance,
                "hops": self.hops,
            }
        })
    }
}

/// GeoJSON `FeatureCollection` with one `Point` per landmark anchor.
pub fn landmarks_geojson(table: &LandmarkTable, graph: &Graph) -> Value {
    let features: Vec<Value> = table
        .anchors()
        .iter()
        .enumerate()
        .map(|(landmark, &vertex)| {
            let Coordinate { lat, lon } = graph.coordinate(vertex);
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [lon, lat] },
                "properties": { "landmark": landmark, "vertex": vertex }
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}
