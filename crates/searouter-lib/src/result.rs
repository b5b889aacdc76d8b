//! Routing results and path reconstruction from predecessor arrays.

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::graph::{Distance, Graph, VertexId, INFINITE_DISTANCE, NO_VERTEX};
use crate::search::RouteAlgorithm;

/// Outcome of one point-to-point query.
///
/// When no path exists `found` is false, `path` is empty and `distance` holds
/// [`INFINITE_DISTANCE`].
#[derive(Debug, Clone, Serialize)]
pub struct RoutingResult {
    pub algorithm: RouteAlgorithm,
    pub found: bool,
    pub path: Vec<VertexId>,
    pub distance: Distance,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    /// Frontier pops across both directions.
    pub heap_pops: usize,
}

impl RoutingResult {
    pub fn found(
        algorithm: RouteAlgorithm,
        path: Vec<VertexId>,
        distance: Distance,
        elapsed: Duration,
        heap_pops: usize,
    ) -> Self {
        Self {
            algorithm,
            found: true,
            path,
            distance,
            elapsed,
            heap_pops,
        }
    }

    pub fn not_found(algorithm: RouteAlgorithm, elapsed: Duration, heap_pops: usize) -> Self {
        Self {
            algorithm,
            found: false,
            path: Vec::new(),
            distance: INFINITE_DISTANCE,
            elapsed,
            heap_pops,
        }
    }

    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Whether `result.path` is a chain of existing edges whose weights sum to
/// `result.distance`. A not-found result must carry an empty path and the
/// infinite sentinel.
pub fn validate_path(graph: &Graph, result: &RoutingResult) -> bool {
    if !result.found {
        return result.path.is_empty() && result.distance == INFINITE_DISTANCE;
    }
    path_distance(graph, &result.path) == Some(result.distance)
}

/// Total weight of `path`, or `None` if two consecutive vertices share no edge.
///
/// Uses the lightest parallel edge between each pair.
pub fn path_distance(graph: &Graph, path: &[VertexId]) -> Option<Distance> {
    if path.is_empty() {
        return None;
    }
    path.windows(2).try_fold(0 as Distance, |total, pair| {
        let weight = graph.edge_weight(pair[0], pair[1])?;
        total.checked_add(weight)
    })
}

/// Follow predecessors from `from` until the search root.
fn walk_back(predecessor: &[VertexId], from: VertexId) -> Vec<VertexId> {
    let mut chain = vec![from];
    let mut current = from;
    while predecessor[current as usize] != NO_VERTEX {
        current = predecessor[current as usize];
        chain.push(current);
    }
    chain
}

/// Source-to-target path of a unidirectional search that settled `target`.
pub(crate) fn unidirectional_path(predecessor: &[VertexId], target: VertexId) -> Vec<VertexId> {
    let mut path = walk_back(predecessor, target);
    path.reverse();
    path
}

/// Join the forward chain ending at `forward_end` with the backward chain
/// starting at `backward_end`.
///
/// The backward search's predecessors point toward the target, so walking them
/// already yields forward order. A meeting at a single vertex appears once.
pub(crate) fn bidirectional_path(
    forward_predecessor: &[VertexId],
    backward_predecessor: &[VertexId],
    forward_end: VertexId,
    backward_end: VertexId,
) -> Vec<VertexId> {
    let mut path = unidirectional_path(forward_predecessor, forward_end);
    let tail = walk_back(backward_predecessor, backward_end);
    let skip = usize::from(forward_end == backward_end);
    path.extend(tail.into_iter().skip(skip));
    path
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Coordinate, EdgeRecord};

    fn path_graph() -> Graph {
        let coordinates = (0..4)
            .map(|index| Coordinate::new(0.0, index as f64))
            .collect();
        let mut edges = Vec::new();
        for (from, to, weight) in [(0, 1, 5), (1, 2, 7), (2, 3, 11)] {
            edges.push(EdgeRecord::new(from, to, weight));
            edges.push(EdgeRecord::new(to, from, weight));
        }
        Graph::from_edges(coordinates, edges).expect("valid graph")
    }

    #[test]
    fn unidirectional_path_runs_source_to_target() {
        let predecessor = vec![NO_VERTEX, 0, 1, 2];
        assert_eq!(unidirectional_path(&predecessor, 3), vec![0, 1, 2, 3]);
    }

    #[test]
    fn bidirectional_path_joins_across_edge() {
        // forward tree rooted at 0, backward tree rooted at 3
        let forward = vec![NO_VERTEX, 0, NO_VERTEX, NO_VERTEX];
        let backward = vec![NO_VERTEX, NO_VERTEX, 3, NO_VERTEX];
        assert_eq!(bidirectional_path(&forward, &backward, 1, 2), vec![0, 1, 2, 3]);
    }

    #[test]
    fn bidirectional_path_at_single_meeting_vertex() {
        let forward = vec![NO_VERTEX, 0, 1, NO_VERTEX];
        let backward = vec![NO_VERTEX, NO_VERTEX, 3, NO_VERTEX];
        assert_eq!(bidirectional_path(&forward, &backward, 2, 2), vec![0, 1, 2, 3]);
    }

    #[test]
    fn path_distance_sums_edges() {
        let graph = path_graph();
        assert_eq!(path_distance(&graph, &[0, 1, 2, 3]), Some(23));
        assert_eq!(path_distance(&graph, &[2]), Some(0));
        assert_eq!(path_distance(&graph, &[0, 2]), None);
        assert_eq!(path_distance(&graph, &[]), None);
    }

    #[test]
    fn not_found_result_is_consistent() {
        let graph = path_graph();
        let result = RoutingResult::not_found(RouteAlgorithm::Dijkstra, Duration::ZERO, 3);
        assert!(!result.found);
        assert_eq!(result.distance, INFINITE_DISTANCE);
        assert!(validate_path(&graph, &result));
    }

    #[test]
    fn validate_path_rejects_wrong_distance() {
        let graph = path_graph();
        let mut result = RoutingResult::found(
            RouteAlgorithm::Dijkstra,
            vec![0, 1, 2],
            12,
            Duration::ZERO,
            3,
        );
        assert!(validate_path(&graph, &result));
        result.distance = 13;
        assert!(!validate_path(&graph, &result));
        result.path = vec![0, 2];
        assert!(!validate_path(&graph, &result));
    }

    #[test]
    fn serializes_elapsed_as_milliseconds() {
        let result = RoutingResult::found(
            RouteAlgorithm::AStar,
            vec![0, 1],
            5,
            Duration::from_millis(2),
            4,
        );
        let json = serde_json::to_value(&result).expect("serializes");
        assert_eq!(json["elapsed_ms"], serde_json::json!(2.0));
        assert_eq!(json["algorithm"], "a-star");
        assert_eq!(json["path"], serde_json::json!([0, 1]));
    }
}
