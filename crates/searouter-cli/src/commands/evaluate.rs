//! Evaluate command handler: cross-checks every router against Dijkstra.

use anyhow::{Context, Result};

use searouter_cli::output::print_json;
use searouter_lib::{evaluate, RouteAlgorithm};

use super::GraphPaths;

/// Exit code when any variant disagrees with the reference.
pub const MISMATCH_EXIT_CODE: i32 = 1;

/// Arguments for the evaluate command.
#[derive(Debug, Clone)]
pub struct EvaluateArgs {
    pub queries: usize,
    pub seed: u64,
    /// Algorithms to evaluate; empty means all of them.
    pub algorithms: Vec<RouteAlgorithm>,
    pub json: bool,
}

impl EvaluateArgs {
    fn algorithms(&self) -> Vec<RouteAlgorithm> {
        if self.algorithms.is_empty() {
            RouteAlgorithm::ALL.to_vec()
        } else {
            self.algorithms.clone()
        }
    }
}

/// Handle the evaluate subcommand.
pub fn handle_evaluate(paths: &GraphPaths, args: &EvaluateArgs) -> Result<()> {
    let graph = paths.load_graph()?;
    let algorithms = args.algorithms();
    let landmarks = if algorithms.iter().any(|a| a.requires_landmarks()) {
        Some(paths.obtain_landmarks(&graph)?)
    } else {
        None
    };

    let report = evaluate(
        &graph,
        landmarks.as_ref(),
        &algorithms,
        args.queries,
        args.seed,
    )
    .context("evaluation failed")?;

    if args.json {
        print_json(&report)?;
    } else {
        print!("{}", report.render_plain());
    }

    if report.has_mismatches() {
        std::process::exit(MISMATCH_EXIT_CODE);
    }
    Ok(())
}
