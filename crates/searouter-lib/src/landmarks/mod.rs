//! Landmark preprocessing and per-query activation for ALT search.
//!
//! A [`LandmarkTable`] holds, for every landmark, the exact shortest-path
//! distance from its anchor vertex to every vertex of the graph. Tables are
//! produced offline by one of the [`LandmarkStrategy`] selectors followed by
//! one Dijkstra one-to-all run per landmark (in parallel), and are persisted
//! through the cache functions in this module.
//!
//! At query time a [`LandmarkSelector`] ranks all landmarks by the bound
//! `|d(L, start) - d(L, target)|` and activates the best `k`.

mod cache;
mod strategy;

pub use cache::{
    landmark_cache_path, load_or_build, verify_landmark_cache, CacheStatus, CACHE_VERSION,
};
pub use strategy::{LandmarkStrategy, LandmarkStrategyKind};

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::graph::{Distance, Graph, VertexId, INFINITE_DISTANCE};
use crate::search::{Router, SearchEngine};

/// Precomputed landmark distance rows for one graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkTable {
    strategy: Option<LandmarkStrategy>,
    graph_fingerprint: [u8; 32],
    vertex_count: usize,
    anchors: Vec<VertexId>,
    distances: Vec<Vec<Distance>>,
}

impl LandmarkTable {
    /// Select landmarks with `strategy` and compute their distance rows.
    pub fn build(graph: &Graph, strategy: &LandmarkStrategy) -> Result<Self> {
        let started = Instant::now();
        let selection = strategy.select_with_rows(graph)?;
        let anchors = selection.anchors;
        if anchors.is_empty() {
            return Err(Error::LandmarkSelection {
                message: format!("{} strategy placed no landmarks", strategy.kind()),
            });
        }
        info!(
            strategy = %strategy.kind(),
            landmarks = anchors.len(),
            "selected landmarks"
        );

        let distances = match selection.distances {
            Some(rows) => rows,
            None => precompute_distances(graph, &anchors)?,
        };
        info!(
            landmarks = anchors.len(),
            vertices = graph.vertex_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "precomputed landmark distances"
        );

        Ok(Self {
            strategy: Some(strategy.clone()),
            graph_fingerprint: graph.fingerprint(),
            vertex_count: graph.vertex_count(),
            anchors,
            distances,
        })
    }

    /// Compute rows for explicitly chosen anchors.
    pub fn from_anchors(graph: &Graph, anchors: Vec<VertexId>) -> Result<Self> {
        for &anchor in &anchors {
            graph.check_vertex(anchor)?;
        }
        let distances = precompute_distances(graph, &anchors)?;
        Ok(Self {
            strategy: None,
            graph_fingerprint: graph.fingerprint(),
            vertex_count: graph.vertex_count(),
            anchors,
            distances,
        })
    }

    /// Assemble a table from rows computed elsewhere.
    ///
    /// The table is not tied to any graph fingerprint. Every row must have the
    /// same length and there must be one row per anchor.
    pub fn from_rows(anchors: Vec<VertexId>, distances: Vec<Vec<Distance>>) -> Result<Self> {
        if anchors.len() != distances.len() {
            return Err(Error::MalformedLandmarks {
                reason: format!(
                    "{} anchors but {} distance rows",
                    anchors.len(),
                    distances.len()
                ),
            });
        }
        let vertex_count = distances.first().map_or(0, Vec::len);
        if let Some(landmark) = distances.iter().position(|row| row.len() != vertex_count) {
            return Err(Error::MalformedLandmarks {
                reason: format!(
                    "row {landmark} has {} entries, expected {vertex_count}",
                    distances[landmark].len()
                ),
            });
        }
        Ok(Self {
            strategy: None,
            graph_fingerprint: [0; 32],
            vertex_count,
            anchors,
            distances,
        })
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn anchors(&self) -> &[VertexId] {
        &self.anchors
    }

    pub fn anchor(&self, landmark: usize) -> VertexId {
        self.anchors[landmark]
    }

    /// Distance row of `landmark`, indexed by vertex.
    pub fn distances(&self, landmark: usize) -> &[Distance] {
        &self.distances[landmark]
    }

    pub fn strategy(&self) -> Option<&LandmarkStrategy> {
        self.strategy.as_ref()
    }

    pub fn graph_fingerprint(&self) -> &[u8; 32] {
        &self.graph_fingerprint
    }

    pub fn graph_fingerprint_hex(&self) -> String {
        hex::encode(self.graph_fingerprint)
    }

    /// Whether the table was computed on `graph`.
    pub fn matches(&self, graph: &Graph) -> bool {
        self.vertex_count == graph.vertex_count() && self.graph_fingerprint == graph.fingerprint()
    }

    /// Lower bound on `d(u, v)` from one landmark; zero when either is unreachable.
    pub fn lower_bound(&self, landmark: usize, u: VertexId, v: VertexId) -> Distance {
        let row = &self.distances[landmark];
        let (du, dv) = (row[u as usize], row[v as usize]);
        if du == INFINITE_DISTANCE || dv == INFINITE_DISTANCE {
            0
        } else {
            du.abs_diff(dv)
        }
    }

    /// The `k` landmarks with the tightest bound for `(start, target)`, best first.
    pub fn top_landmarks(&self, start: VertexId, target: VertexId, k: usize) -> Vec<usize> {
        LandmarkSelector::new(k)
            .select(self, start, target)
            .to_vec()
    }
}

/// One Dijkstra one-to-all per anchor, spread over the rayon pool.
///
/// Each worker owns a private engine; the graph is only read.
fn precompute_distances(graph: &Graph, anchors: &[VertexId]) -> Result<Vec<Vec<Distance>>> {
    anchors
        .par_iter()
        .map_init(
            || SearchEngine::dijkstra(graph),
            |engine, &anchor| engine.route_to_all_vertices(anchor),
        )
        .collect()
}

/// Landmark rank: larger bound first, then lower landmark id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ranked {
    bound: Distance,
    landmark: usize,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bound
            .cmp(&other.bound)
            .then_with(|| other.landmark.cmp(&self.landmark))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reusable top-k landmark ranking.
///
/// Keeps a bounded heap of the `k` best landmarks seen so far, so a query
/// costs `O(L log k)`. Equal bounds prefer the lower landmark id, which makes
/// the active set a pure function of the table and the query pair.
#[derive(Debug, Clone, Default)]
pub struct LandmarkSelector {
    k: usize,
    heap: BinaryHeap<Reverse<Ranked>>,
    active: Vec<usize>,
}

impl LandmarkSelector {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k + 1),
            active: Vec::with_capacity(k),
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Landmarks activated by the last [`select`](Self::select), best first.
    pub fn active(&self) -> &[usize] {
        &self.active
    }

    /// Rank every landmark of `table` for `(start, target)` and keep the best `k`.
    pub fn select(&mut self, table: &LandmarkTable, start: VertexId, target: VertexId) -> &[usize] {
        self.heap.clear();
        self.active.clear();
        if self.k == 0 {
            return &self.active;
        }

        for landmark in 0..table.len() {
            let ranked = Ranked {
                bound: table.lower_bound(landmark, start, target),
                landmark,
            };
            if self.heap.len() < self.k {
                self.heap.push(Reverse(ranked));
            } else if self
                .heap
                .peek()
                .is_some_and(|Reverse(worst)| ranked > *worst)
            {
                self.heap.pop();
                self.heap.push(Reverse(ranked));
            }
        }

        while let Some(Reverse(ranked)) = self.heap.pop() {
            self.active.push(ranked.landmark);
        }
        self.active.reverse();
        &self.active
    }
}
