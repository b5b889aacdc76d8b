//! Shortest-path search over the sea graph.
//!
//! This module provides:
//! - [`RouteAlgorithm`] - the supported search variants
//! - [`Router`] - the capability every variant exposes (`route`, `route_to_all_vertices`)
//! - [`SearchEngine`] - the single parameterised engine behind every variant
//! - [`build_router`] - factory returning a boxed router for an algorithm
//!
//! # Strategy Pattern
//!
//! All variants share one search loop. What differs is the directionality
//! (one or two frontiers), the heuristic strategy injected into that loop
//! (none, great-circle, landmarks), and whether the two directions use naive or
//! symmetrised potentials. [`RouteAlgorithm`] names the supported combinations.
//!
//! # Example
//!
//! ```ignore
//! use searouter_lib::{build_router, Graph, RouteAlgorithm, RouterConfig};
//!
//! let graph = Graph::load("ocean.fmi".as_ref())?;
//! let mut router = build_router(&graph, RouteAlgorithm::AStar, None, RouterConfig::default())?;
//! let result = router.route(0, 42)?;
//! println!("{} m over {} vertices", result.distance, result.path.len());
//! ```

mod engine;
mod state;

pub use engine::SearchEngine;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::{Distance, Graph, VertexId};
use crate::landmarks::LandmarkTable;
use crate::result::RoutingResult;

/// Default number of landmarks activated per ALT query.
pub const DEFAULT_ACTIVE_LANDMARKS: usize = 5;

/// Supported routing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum RouteAlgorithm {
    /// Unidirectional Dijkstra.
    Dijkstra,
    /// Unidirectional A* guided by great-circle distance.
    #[default]
    AStar,
    /// Dijkstra from both terminals, alternating one pop per side.
    BidirectionalDijkstra,
    /// Bidirectional A* with independent great-circle potentials per side.
    BidirectionalAStar,
    /// Bidirectional A* with averaged (symmetrised) great-circle potentials.
    ConsistentBidirectionalAStar,
    /// Bidirectional A* guided by per-query landmark bounds.
    Alt,
}

impl RouteAlgorithm {
    /// Every variant, in a stable order with the reference algorithm first.
    pub const ALL: [RouteAlgorithm; 6] = [
        RouteAlgorithm::Dijkstra,
        RouteAlgorithm::AStar,
        RouteAlgorithm::BidirectionalDijkstra,
        RouteAlgorithm::BidirectionalAStar,
        RouteAlgorithm::ConsistentBidirectionalAStar,
        RouteAlgorithm::Alt,
    ];

    pub fn is_bidirectional(self) -> bool {
        !matches!(self, RouteAlgorithm::Dijkstra | RouteAlgorithm::AStar)
    }

    pub fn requires_landmarks(self) -> bool {
        matches!(self, RouteAlgorithm::Alt)
    }

    fn as_str(self) -> &'static str {
        match self {
            RouteAlgorithm::Dijkstra => "dijkstra",
            RouteAlgorithm::AStar => "a-star",
            RouteAlgorithm::BidirectionalDijkstra => "bidirectional-dijkstra",
            RouteAlgorithm::BidirectionalAStar => "bidirectional-a-star",
            RouteAlgorithm::ConsistentBidirectionalAStar => "consistent-bidirectional-a-star",
            RouteAlgorithm::Alt => "alt",
        }
    }
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteAlgorithm {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        RouteAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == normalized)
            .ok_or_else(|| Error::UnknownAlgorithm {
                name: value.to_string(),
            })
    }
}

/// Tunables shared by every router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Landmarks activated per ALT query.
    pub active_landmarks: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            active_landmarks: DEFAULT_ACTIVE_LANDMARKS,
        }
    }
}

/// Point-to-point and one-to-all shortest-path capability.
///
/// Implementations keep per-query scratch state and are therefore not shared
/// between threads; run one router per in-flight query.
pub trait Router: Send {
    /// Variant implemented by this router.
    fn algorithm(&self) -> RouteAlgorithm;

    /// Shortest path from `start` to `target`.
    ///
    /// An unreachable target is reported through `found == false`, not as an error.
    fn route(&mut self, start: VertexId, target: VertexId) -> Result<RoutingResult>;

    /// Shortest distance from `anchor` to every vertex.
    fn route_to_all_vertices(&mut self, anchor: VertexId) -> Result<Vec<Distance>>;
}

/// Build a boxed router for `algorithm`.
///
/// Fails with [`Error::LandmarksRequired`] when `algorithm` is ALT and no
/// landmark table is supplied.
pub fn build_router<'g>(
    graph: &'g Graph,
    algorithm: RouteAlgorithm,
    landmarks: Option<&'g LandmarkTable>,
    config: RouterConfig,
) -> Result<Box<dyn Router + 'g>> {
    Ok(Box::new(SearchEngine::new(
        graph, algorithm, landmarks, config,
    )?))
}
