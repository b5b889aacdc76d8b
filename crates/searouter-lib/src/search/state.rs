use crate::frontier::Frontier;
use crate::graph::{Distance, VertexId, INFINITE_DISTANCE, NO_VERTEX};
use crate::heuristic::Heuristic;

/// Per-direction search arrays, allocated once and reset between queries.
///
/// Only vertices recorded in `touched` ever leave their initial values, so a
/// reset costs time proportional to the previous query's search space.
#[derive(Debug, Clone)]
pub(crate) struct SearchState {
    pub(crate) distance: Vec<Distance>,
    pub(crate) key: Vec<f64>,
    pub(crate) predecessor: Vec<VertexId>,
    pub(crate) settled: Vec<bool>,
    estimate: Vec<f64>,
    touched: Vec<VertexId>,
    frontier: Frontier,
}

impl SearchState {
    pub(crate) fn new(vertex_count: usize) -> Self {
        Self {
            distance: vec![INFINITE_DISTANCE; vertex_count],
            key: vec![f64::INFINITY; vertex_count],
            predecessor: vec![NO_VERTEX; vertex_count],
            settled: vec![false; vertex_count],
            estimate: vec![f64::NAN; vertex_count],
            touched: Vec::new(),
            frontier: Frontier::new(vertex_count),
        }
    }

    pub(crate) fn reset(&mut self) {
        for vertex in self.touched.drain(..) {
            let index = vertex as usize;
            self.distance[index] = INFINITE_DISTANCE;
            self.key[index] = f64::INFINITY;
            self.predecessor[index] = NO_VERTEX;
            self.settled[index] = false;
            self.estimate[index] = f64::NAN;
        }
        self.frontier.reset();
    }

    /// Start this direction's search at `source`.
    pub(crate) fn seed<H: Heuristic>(&mut self, source: VertexId, heuristic: &H) {
        self.reset();
        self.relax(source, 0, NO_VERTEX, heuristic);
    }

    pub(crate) fn has_frontier(&self) -> bool {
        !self.frontier.is_empty()
    }

    /// Pop the vertex with the smallest key and mark it settled.
    pub(crate) fn settle_next(&mut self) -> Option<VertexId> {
        let vertex = self.frontier.pop_min(&self.key)?;
        self.settled[vertex as usize] = true;
        Some(vertex)
    }

    /// Offer `distance` as a new tentative distance for `vertex` via `via`.
    ///
    /// Returns `true` when the label improved.
    pub(crate) fn relax<H: Heuristic>(
        &mut self,
        vertex: VertexId,
        distance: Distance,
        via: VertexId,
        heuristic: &H,
    ) -> bool {
        let index = vertex as usize;
        if distance >= self.distance[index] {
            return false;
        }
        if self.distance[index] == INFINITE_DISTANCE {
            self.touched.push(vertex);
        }
        if self.estimate[index].is_nan() {
            self.estimate[index] = heuristic.estimate(vertex);
        }
        self.distance[index] = distance;
        self.predecessor[index] = via;
        self.key[index] = distance as f64 + self.estimate[index];
        self.frontier.insert_or_decrease(vertex, &self.key);
        true
    }

    /// Whether `vertex` has been popped by this direction.
    #[inline]
    pub(crate) fn is_settled(&self, vertex: VertexId) -> bool {
        self.settled[vertex as usize]
    }
}
