//! Route command handler for computing shortest sea paths between vertices.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use searouter_cli::output::{format_elapsed, render_route, OutputFormat};
use searouter_lib::{build_router, RouteAlgorithm, RouteSummary, RouterConfig, VertexId};

use super::GraphPaths;

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    /// Starting vertex id.
    pub from: VertexId,
    /// Destination vertex id.
    pub to: VertexId,
    pub algorithm: RouteAlgorithm,
    pub format: OutputFormat,
    /// Landmarks activated per ALT query.
    pub active_landmarks: usize,
}

/// Handle the route subcommand.
///
/// Loads the graph (and, for ALT, the landmark cache), runs one query and
/// prints the result. An unreachable target is reported, not treated as a failure.
pub fn handle_route_command(paths: &GraphPaths, args: &RouteCommandArgs) -> Result<()> {
    let started = Instant::now();
    let graph = paths.load_graph()?;
    let landmarks = if args.algorithm.requires_landmarks() {
        Some(paths.obtain_landmarks(&graph)?)
    } else {
        None
    };

    let config = RouterConfig {
        active_landmarks: args.active_landmarks,
    };
    let mut router = build_router(&graph, args.algorithm, landmarks.as_ref(), config)
        .context("failed to prepare router")?;
    let result = router
        .route(args.from, args.to)
        .with_context(|| format!("failed to route {} -> {}", args.from, args.to))?;

    let summary = RouteSummary::from_result(&graph, args.from, args.to, &result);
    print!("{}", render_route(&summary, args.format)?);

    debug!(total = %format_elapsed(started.elapsed()), "route command finished");
    Ok(())
}
