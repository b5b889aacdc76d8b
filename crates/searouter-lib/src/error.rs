use std::path::PathBuf;

use thiserror::Error;

use crate::graph::VertexId;
use crate::search::RouteAlgorithm;

/// Convenient result alias for the sea-routing library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// CSR arrays violate the structural contract (offsets, destinations, lengths).
    #[error("malformed graph: {reason}")]
    MalformedGraph { reason: String },

    /// A graph text file could not be parsed.
    #[error("failed to parse graph at line {line}: {message}")]
    GraphParse { line: usize, message: String },

    /// A query referenced a vertex id outside the loaded graph.
    #[error("vertex {vertex} is out of range for a graph with {vertex_count} vertices")]
    VertexOutOfRange {
        vertex: VertexId,
        vertex_count: usize,
    },

    /// Raised when an algorithm name cannot be parsed.
    #[error("unknown routing algorithm: {name}")]
    UnknownAlgorithm { name: String },

    /// Raised when a landmark-guided router is requested without landmark tables.
    #[error("algorithm {algorithm} requires precomputed landmarks")]
    LandmarksRequired { algorithm: RouteAlgorithm },

    /// Raised when landmark tables were computed for a graph of another size.
    #[error("landmark tables cover {landmark_vertices} vertices but the graph has {graph_vertices}")]
    LandmarkGraphMismatch {
        landmark_vertices: usize,
        graph_vertices: usize,
    },

    /// Landmark rows disagree with each other or with their anchors.
    #[error("malformed landmark table: {reason}")]
    MalformedLandmarks { reason: String },

    /// Raised when a landmark selection strategy cannot place any landmark.
    #[error("landmark selection failed: {message}")]
    LandmarkSelection { message: String },

    /// Raised when loading a landmark cache from a file fails.
    #[error("failed to load landmark cache from {path}: {message}")]
    LandmarkCacheLoad { path: PathBuf, message: String },

    /// Raised when a landmark cache was computed for a different graph.
    #[error("landmark cache at {path} does not match the loaded graph")]
    LandmarkCacheMismatch { path: PathBuf },

    /// Raised when encoding a landmark cache or route output fails.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
