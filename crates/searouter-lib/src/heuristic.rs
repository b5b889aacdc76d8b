//! Lower-bound distance estimates that guide A*-style searches.
//!
//! A [`Heuristic`] is prepared once per query for one search direction and
//! answers "at least how far is `vertex` from this direction's goal". The
//! search state memoises every answer, so implementations may do real work.

use crate::geodesic::great_circle_distance;
use crate::graph::{Coordinate, Distance, Graph, VertexId, INFINITE_DISTANCE};
use crate::landmarks::LandmarkTable;

/// Per-direction remaining-distance estimate.
pub trait Heuristic {
    fn estimate(&self, vertex: VertexId) -> f64;
}

impl<H: Heuristic + ?Sized> Heuristic for &H {
    #[inline]
    fn estimate(&self, vertex: VertexId) -> f64 {
        (**self).estimate(vertex)
    }
}

/// Estimate of zero everywhere; turns A* into Dijkstra.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zero;

impl Heuristic for Zero {
    #[inline]
    fn estimate(&self, _vertex: VertexId) -> f64 {
        0.0
    }
}

/// Great-circle distance to a fixed goal vertex.
#[derive(Debug, Clone, Copy)]
pub struct GreatCircle<'g> {
    graph: &'g Graph,
    goal: Coordinate,
}

impl<'g> GreatCircle<'g> {
    pub fn new(graph: &'g Graph, goal: VertexId) -> Self {
        Self {
            graph,
            goal: graph.coordinate(goal),
        }
    }
}

impl Heuristic for GreatCircle<'_> {
    #[inline]
    fn estimate(&self, vertex: VertexId) -> f64 {
        great_circle_distance(self.graph.coordinate(vertex), self.goal)
    }
}

/// Triangle-inequality bound `max |d(L, v) - d(L, goal)|` over active landmarks.
///
/// Landmarks that cannot reach the goal are dropped up front; a landmark that
/// cannot reach `vertex` contributes nothing for that vertex.
#[derive(Debug, Clone)]
pub struct LandmarkBound<'a> {
    rows: Vec<(&'a [Distance], Distance)>,
}

impl<'a> LandmarkBound<'a> {
    pub fn new(table: &'a LandmarkTable, active: &[usize], goal: VertexId) -> Self {
        let rows = active
            .iter()
            .map(|&landmark| table.distances(landmark))
            .map(|row| (row, row[goal as usize]))
            .filter(|&(_, to_goal)| to_goal != INFINITE_DISTANCE)
            .collect();
        Self { rows }
    }

    /// Number of landmarks contributing to the bound.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Heuristic for LandmarkBound<'_> {
    fn estimate(&self, vertex: VertexId) -> f64 {
        self.rows
            .iter()
            .map(|&(row, to_goal)| (row[vertex as usize], to_goal))
            .filter(|&(to_vertex, _)| to_vertex != INFINITE_DISTANCE)
            .map(|(to_vertex, to_goal)| to_vertex.abs_diff(to_goal))
            .max()
            .unwrap_or(0) as f64
    }
}

/// Average of a forward estimate and a negated reverse estimate.
///
/// With `own` the estimate toward this direction's goal and `other` the
/// estimate toward the opposite terminal, the potential is
/// `(own(v) - other(v)) / 2`. The forward and backward potentials built this
/// way sum to zero at every vertex, so both searches see the same reduced
/// edge costs.
#[derive(Debug, Clone, Copy)]
pub struct Symmetrized<O, T> {
    own: O,
    other: T,
}

impl<O, T> Symmetrized<O, T> {
    pub fn new(own: O, other: T) -> Self {
        Self { own, other }
    }
}

impl<O: Heuristic, T: Heuristic> Heuristic for Symmetrized<O, T> {
    #[inline]
    fn estimate(&self, vertex: VertexId) -> f64 {
        (self.own.estimate(vertex) - self.other.estimate(vertex)) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeRecord;

    fn line_graph() -> Graph {
        let coordinates = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(0.0, 2.0),
        ];
        let edges = vec![
            EdgeRecord::new(0, 1, 111_200),
            EdgeRecord::new(1, 0, 111_200),
            EdgeRecord::new(1, 2, 111_200),
            EdgeRecord::new(2, 1, 111_200),
        ];
        Graph::from_edges(coordinates, edges).expect("valid graph")
    }

    #[test]
    fn great_circle_is_zero_at_goal() {
        let graph = line_graph();
        let heuristic = GreatCircle::new(&graph, 2);
        assert_eq!(heuristic.estimate(2), 0.0);
        assert!(heuristic.estimate(0) > heuristic.estimate(1));
        assert!(heuristic.estimate(0) <= 222_400.0);
    }

    #[test]
    fn symmetrized_potentials_cancel() {
        let graph = line_graph();
        let forward = Symmetrized::new(GreatCircle::new(&graph, 2), GreatCircle::new(&graph, 0));
        let backward = Symmetrized::new(GreatCircle::new(&graph, 0), GreatCircle::new(&graph, 2));
        for vertex in 0..3 {
            let sum = forward.estimate(vertex) + backward.estimate(vertex);
            assert!(sum.abs() < 1e-9, "vertex {vertex} sums to {sum}");
        }
    }

    #[test]
    fn landmark_bound_uses_largest_difference() {
        let table = LandmarkTable::from_rows(
            vec![0, 2],
            vec![vec![0, 5, 12], vec![12, 7, 0]],
        )
        .expect("rectangular rows");
        let bound = LandmarkBound::new(&table, &[0, 1], 2);
        assert_eq!(bound.len(), 2);
        assert_eq!(bound.estimate(0), 12.0);
        assert_eq!(bound.estimate(1), 7.0);
        assert_eq!(bound.estimate(2), 0.0);
    }

    #[test]
    fn landmark_bound_skips_unreachable_entries() {
        let table = LandmarkTable::from_rows(
            vec![0, 2],
            vec![
                vec![0, 4, INFINITE_DISTANCE, 9],
                vec![INFINITE_DISTANCE, INFINITE_DISTANCE, 0, INFINITE_DISTANCE],
            ],
        )
        .expect("rectangular rows");
        let bound = LandmarkBound::new(&table, &[0, 1], 3);
        assert_eq!(bound.len(), 1);
        assert_eq!(bound.estimate(0), 9.0);
        assert_eq!(bound.estimate(2), 0.0);
    }
}
