//! Landmark cache build and verify command handlers.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;

use searouter_cli::output::{format_elapsed, print_json};
use searouter_lib::{
    landmarks_geojson, verify_landmark_cache, CacheStatus, Graph, LandmarkStrategy,
    LandmarkStrategyKind, LandmarkTable, CACHE_VERSION,
};

use super::GraphPaths;

/// Arguments for the landmarks-build command.
#[derive(Debug, Clone)]
pub struct LandmarksBuildArgs {
    pub strategy: LandmarkStrategyKind,
    /// Override the strategy's default landmark count.
    pub count: Option<usize>,
    /// Override the shuffle seed of seeded strategies.
    pub seed: Option<u64>,
    /// Rebuild even when a fresh cache exists.
    pub force: bool,
    /// Also export landmark positions as GeoJSON.
    pub geojson: Option<PathBuf>,
}

/// Arguments for the landmarks-verify command.
#[derive(Debug, Clone)]
pub struct LandmarksVerifyArgs {
    /// Output in JSON format instead of human-readable text.
    pub json: bool,
}

/// Exit codes for landmarks-verify.
pub mod exit_codes {
    pub const FRESH: i32 = 0;
    pub const STALE: i32 = 1;
    pub const MISSING: i32 = 2;
    pub const CORRUPT: i32 = 3;
}

impl LandmarksBuildArgs {
    fn strategy(&self) -> LandmarkStrategy {
        let mut strategy = LandmarkStrategy::with_defaults(self.strategy);
        if let Some(count) = self.count {
            strategy = strategy.with_count(count);
        }
        if let Some(seed) = self.seed {
            strategy = strategy.with_seed(seed);
        }
        strategy
    }
}

/// Handle the landmarks-build subcommand.
pub fn handle_landmarks_build(paths: &GraphPaths, args: &LandmarksBuildArgs) -> Result<()> {
    let started = Instant::now();
    let graph = paths.load_graph()?;

    if !args.force && verify_landmark_cache(&paths.landmarks, &graph).is_fresh() {
        println!(
            "Landmark cache already fresh at {}\nUse --force to rebuild.",
            paths.landmarks.display()
        );
        if let Some(target) = &args.geojson {
            let table = LandmarkTable::load(&paths.landmarks)?;
            export_geojson(&table, &graph, target)?;
        }
        return Ok(());
    }

    let strategy = args.strategy();
    println!(
        "Building {} landmarks for {} vertices...",
        strategy.kind(),
        graph.vertex_count()
    );
    let table = LandmarkTable::build(&graph, &strategy).context("failed to build landmarks")?;

    println!("Saving landmark cache to {}...", paths.landmarks.display());
    table
        .save(&paths.landmarks)
        .context("failed to save landmark cache")?;

    let file_size = fs::metadata(&paths.landmarks).map(|m| m.len()).unwrap_or(0);
    println!("Landmark cache built successfully:");
    println!("  Path: {}", paths.landmarks.display());
    println!("  Format: v{CACHE_VERSION}");
    println!("  Strategy: {}", strategy.kind());
    println!("  Landmarks: {}", table.len());
    println!("  Graph fingerprint: {}...", &table.graph_fingerprint_hex()[..16]);
    println!("  File size: {file_size} bytes");
    println!("  Elapsed: {}", format_elapsed(started.elapsed()));

    if let Some(target) = &args.geojson {
        export_geojson(&table, &graph, target)?;
    }
    Ok(())
}

fn export_geojson(table: &LandmarkTable, graph: &Graph, target: &Path) -> Result<()> {
    let collection = landmarks_geojson(table, graph);
    fs::write(target, serde_json::to_string_pretty(&collection)?)
        .with_context(|| format!("failed to write {}", target.display()))?;
    println!("Landmark positions written to {}", target.display());
    Ok(())
}

#[derive(Debug, Serialize)]
struct VerifyOutput<'a> {
    graph_path: String,
    landmarks_path: String,
    #[serde(flatten)]
    status: &'a CacheStatus,
    is_fresh: bool,
    recommended_action: Option<&'static str>,
}

/// Handle the landmarks-verify subcommand.
///
/// Exits with a non-zero code unless the cache is fresh for the graph.
pub fn handle_landmarks_verify(paths: &GraphPaths, args: &LandmarksVerifyArgs) -> Result<()> {
    let graph = paths.load_graph()?;
    let status = verify_landmark_cache(&paths.landmarks, &graph);

    let (recommended_action, exit_code) = match &status {
        CacheStatus::Fresh { .. } => (None, exit_codes::FRESH),
        CacheStatus::Stale => (Some("searouter-cli landmarks-build"), exit_codes::STALE),
        CacheStatus::Missing => (Some("searouter-cli landmarks-build"), exit_codes::MISSING),
        CacheStatus::Corrupt { .. } => (
            Some("searouter-cli landmarks-build --force"),
            exit_codes::CORRUPT,
        ),
    };

    let output = VerifyOutput {
        graph_path: paths.graph.display().to_string(),
        landmarks_path: paths.landmarks.display().to_string(),
        status: &status,
        is_fresh: status.is_fresh(),
        recommended_action,
    };

    if args.json {
        print_json(&output)?;
    } else {
        print_human_readable_status(&output);
    }

    if exit_code != exit_codes::FRESH {
        std::process::exit(exit_code);
    }
    Ok(())
}

fn print_human_readable_status(output: &VerifyOutput<'_>) {
    match output.status {
        CacheStatus::Fresh { landmarks } => {
            println!("✓ Landmark cache is fresh");
            println!("  Landmarks: {landmarks}");
            println!("  Path:      {}", output.landmarks_path);
        }
        CacheStatus::Stale => {
            println!("✗ Landmark cache is STALE");
            println!("  It was computed on a different graph than {}", output.graph_path);
        }
        CacheStatus::Missing => {
            println!("✗ Landmark cache not found");
            println!("  Expected: {}", output.landmarks_path);
        }
        CacheStatus::Corrupt { message } => {
            println!("✗ Landmark cache is unreadable");
            println!("  {message}");
        }
    }
    if let Some(action) = output.recommended_action {
        println!();
        println!("  Run '{action}' to regenerate");
    }
}
