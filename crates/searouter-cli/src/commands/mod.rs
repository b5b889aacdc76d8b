// Module exports for CLI subcommands
//
// Each module handles one subcommand. main.rs parses arguments and dispatches
// to these handlers.

pub mod evaluate;
pub mod landmarks;
pub mod route;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use searouter_lib::{landmark_cache_path, load_or_build, Graph, LandmarkStrategy, LandmarkTable};

/// Graph and landmark locations resolved from the global options.
#[derive(Debug, Clone)]
pub struct GraphPaths {
    pub graph: PathBuf,
    pub landmarks: PathBuf,
}

impl GraphPaths {
    /// Use `landmarks` when given, otherwise `<graph>.landmarks.bin`.
    pub fn resolve(graph: &Path, landmarks: Option<&Path>) -> Self {
        Self {
            graph: graph.to_path_buf(),
            landmarks: landmarks
                .map(Path::to_path_buf)
                .unwrap_or_else(|| landmark_cache_path(graph)),
        }
    }

    pub fn load_graph(&self) -> Result<Graph> {
        Graph::load(&self.graph)
            .with_context(|| format!("failed to load graph from {}", self.graph.display()))
    }

    /// Reuse the landmark cache when it was computed on `graph`, whatever
    /// strategy produced it; otherwise build one with the default strategy.
    pub fn obtain_landmarks(&self, graph: &Graph) -> Result<LandmarkTable> {
        if let Ok(table) = LandmarkTable::load_for_graph(&self.landmarks, graph) {
            return Ok(table);
        }
        info!(
            path = %self.landmarks.display(),
            "no usable landmark cache, building with the default strategy"
        );
        load_or_build(&self.landmarks, graph, &LandmarkStrategy::default()).with_context(|| {
            format!(
                "failed to build landmark cache at {}",
                self.landmarks.display()
            )
        })
    }
}
