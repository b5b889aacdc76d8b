//! Sea-routing library entry points.
//!
//! This crate loads a directed sea graph into a compressed sparse row store,
//! precomputes landmark distance tables, and answers point-to-point
//! shortest-path queries with a family of search variants (Dijkstra, A*,
//! bidirectional Dijkstra, bidirectional A* with naive or symmetrised
//! potentials, and ALT). Higher-level consumers such as the CLI should only
//! depend on the functions exported here instead of reimplementing behavior.

pub mod error;
pub mod evaluation;
pub mod frontier;
pub mod geodesic;
pub mod graph;
pub mod heuristic;
pub mod landmarks;
pub mod output;
pub mod result;
pub mod search;
pub mod spatial;

pub use error::{Error, Result};
pub use evaluation::{evaluate, EvaluationReport, Mismatch, VariantReport};
pub use frontier::Frontier;
pub use geodesic::{great_circle_distance, EARTH_RADIUS_METERS};
pub use graph::{Coordinate, Distance, EdgeRecord, Graph, VertexId, INFINITE_DISTANCE, NO_VERTEX};
pub use heuristic::{GreatCircle, Heuristic, LandmarkBound, Symmetrized, Zero};
pub use landmarks::{
    landmark_cache_path, load_or_build, verify_landmark_cache, CacheStatus, LandmarkSelector,
    LandmarkStrategy, LandmarkStrategyKind, LandmarkTable, CACHE_VERSION,
};
pub use output::{landmarks_geojson, RouteStep, RouteSummary};
pub use result::{path_distance, validate_path, RoutingResult};
pub use search::{
    build_router, RouteAlgorithm, Router, RouterConfig, SearchEngine, DEFAULT_ACTIVE_LANDMARKS,
};
pub use spatial::SpatialIndex;
