use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use searouter_cli::output::OutputFormat;
use searouter_lib::{LandmarkStrategyKind, RouteAlgorithm, VertexId, DEFAULT_ACTIVE_LANDMARKS};

mod commands;

use commands::evaluate::{handle_evaluate, EvaluateArgs};
use commands::landmarks::{
    handle_landmarks_build, handle_landmarks_verify, LandmarksBuildArgs, LandmarksVerifyArgs,
};
use commands::route::{handle_route_command, RouteCommandArgs};
use commands::GraphPaths;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sea-route shortest-path utilities")]
struct Cli {
    /// Graph file in `.fmi` text format.
    #[arg(long, env = "SEAROUTER_GRAPH", global = true)]
    graph: Option<PathBuf>,

    /// Landmark cache file (defaults to `<graph>.landmarks.bin`).
    #[arg(long, global = true)]
    landmarks: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the shortest route between two vertex ids.
    Route {
        /// Starting vertex id.
        #[arg(long = "from")]
        from: VertexId,
        /// Destination vertex id.
        #[arg(long = "to")]
        to: VertexId,
        /// Search variant.
        #[arg(long, value_enum, default_value_t = RouteAlgorithm::AStar)]
        algorithm: RouteAlgorithm,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Landmarks activated per ALT query.
        #[arg(long, default_value_t = DEFAULT_ACTIVE_LANDMARKS)]
        active_landmarks: usize,
    },
    /// Select landmarks, precompute their distances and save the cache.
    LandmarksBuild {
        /// Landmark selection strategy.
        #[arg(long, value_enum, default_value_t = LandmarkStrategyKind::Coastline)]
        strategy: LandmarkStrategyKind,
        /// Override the strategy's landmark count.
        #[arg(long)]
        count: Option<usize>,
        /// Override the strategy's seed.
        #[arg(long)]
        seed: Option<u64>,
        /// Rebuild even when the cache is fresh.
        #[arg(long)]
        force: bool,
        /// Also write landmark positions as a GeoJSON FeatureCollection.
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
    /// Check whether the landmark cache matches the graph.
    LandmarksVerify {
        /// Output in JSON format.
        #[arg(long)]
        json: bool,
    },
    /// Run random queries through every variant and compare with Dijkstra.
    Evaluate {
        /// Number of random queries.
        #[arg(long, default_value_t = 100)]
        queries: usize,
        /// Seed for query generation.
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Algorithms to evaluate (repeatable; defaults to all).
        #[arg(long = "algorithm", value_enum)]
        algorithms: Vec<RouteAlgorithm>,
        /// Output in JSON format.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let graph = cli
        .graph
        .ok_or_else(|| anyhow::anyhow!("no graph given; pass --graph or set SEAROUTER_GRAPH"))?;
    let paths = GraphPaths::resolve(&graph, cli.landmarks.as_deref());

    match cli.command {
        Command::Route {
            from,
            to,
            algorithm,
            format,
            active_landmarks,
        } => handle_route_command(
            &paths,
            &RouteCommandArgs {
                from,
                to,
                algorithm,
                format,
                active_landmarks,
            },
        ),
        Command::LandmarksBuild {
            strategy,
            count,
            seed,
            force,
            geojson,
        } => handle_landmarks_build(
            &paths,
            &LandmarksBuildArgs {
                strategy,
                count,
                seed,
                force,
                geojson,
            },
        ),
        Command::LandmarksVerify { json } => {
            handle_landmarks_verify(&paths, &LandmarksVerifyArgs { json })
        }
        Command::Evaluate {
            queries,
            seed,
            algorithms,
            json,
        } => handle_evaluate(
            &paths,
            &EvaluateArgs {
                queries,
                seed,
                algorithms,
                json,
            },
        ),
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
