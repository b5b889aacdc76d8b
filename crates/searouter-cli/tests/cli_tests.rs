//! Integration tests for the CLI subcommands.
//!
//! These tests use `assert_cmd` to verify CLI behavior including:
//! - route output in text, JSON and GeoJSON
//! - landmarks-build / landmarks-verify with fresh, stale, missing and corrupt caches
//! - evaluate exit codes

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Path to the small graph fixture.
fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/small_sea.fmi")
}

/// Temporary directory holding a copy of the fixture graph.
struct TestEnv {
    _temp_dir: TempDir,
    graph_path: PathBuf,
    landmarks_path: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let graph_path = temp_dir.path().join("small_sea.fmi");
        let landmarks_path = temp_dir.path().join("small_sea.fmi.landmarks.bin");
        fs::copy(fixture_path(), &graph_path).expect("copy fixture");

        Self {
            _temp_dir: temp_dir,
            graph_path,
            landmarks_path,
        }
    }

    fn cli(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("searouter-cli");
        cmd.env("RUST_LOG", "error")
            .env_remove("SEAROUTER_GRAPH")
            .arg("--graph")
            .arg(&self.graph_path);
        cmd
    }

    fn build_landmarks(&self) {
        self.cli()
            .args(["landmarks-build", "--strategy", "random", "--count", "4", "--seed", "2"])
            .assert()
            .success();
    }
}

// ============================================================================
// route
// ============================================================================

#[test]
fn route_prints_text_summary() {
    let env = TestEnv::new();
    env.cli()
        .args(["route", "--from", "0", "--to", "11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Route: 0 -> 11"))
        .stdout(predicate::str::contains("258.443 km"))
        .stdout(predicate::str::contains("algorithm: a-star"));
}

#[test]
fn route_json_reports_distance_and_path() {
    let env = TestEnv::new();
    let output = env
        .cli()
        .args([
            "route",
            "--from",
            "5",
            "--to",
            "6",
            "--algorithm",
            "bidirectional-dijkstra",
            "--format",
            "json",
        ])
        .output()
        .expect("runs");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["distance"], 163_985);
    assert_eq!(value["found"], true);
    assert_eq!(value["steps"][0]["vertex"], 5);
}

#[test]
fn route_geojson_is_a_line_string() {
    let env = TestEnv::new();
    env.cli()
        .args(["route", "--from", "0", "--to", "3", "--format", "geojson"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"LineString\""));
}

#[test]
fn unreachable_route_is_reported_not_failed() {
    let env = TestEnv::new();
    env.cli()
        .args(["route", "--from", "0", "--to", "12", "--algorithm", "dijkstra"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No route: 0 -> 12"));
}

#[test]
fn alt_route_builds_missing_landmarks() {
    let env = TestEnv::new();
    env.cli()
        .args(["route", "--from", "0", "--to", "11", "--algorithm", "alt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("258.443 km"));
    assert!(env.landmarks_path.exists());
}

#[test]
fn out_of_range_vertex_fails() {
    let env = TestEnv::new();
    env.cli()
        .args(["route", "--from", "0", "--to", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn missing_graph_option_fails() {
    let mut cmd = cargo_bin_cmd!("searouter-cli");
    cmd.env_remove("SEAROUTER_GRAPH")
        .args(["route", "--from", "0", "--to", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no graph given"));
}

// ============================================================================
// landmarks-build / landmarks-verify
// ============================================================================

#[test]
fn verify_reports_missing_cache() {
    let env = TestEnv::new();
    env.cli()
        .arg("landmarks-verify")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn build_then_verify_is_fresh() {
    let env = TestEnv::new();
    env.build_landmarks();

    env.cli()
        .args(["landmarks-verify", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"fresh\""))
        .stdout(predicate::str::contains("\"is_fresh\": true"));
}

#[test]
fn second_build_without_force_is_skipped() {
    let env = TestEnv::new();
    env.build_landmarks();

    env.cli()
        .arg("landmarks-build")
        .assert()
        .success()
        .stdout(predicate::str::contains("already fresh"));
}

#[test]
fn verify_detects_stale_cache() {
    let env = TestEnv::new();
    env.build_landmarks();

    let text = fs::read_to_string(&env.graph_path).expect("read graph");
    fs::write(&env.graph_path, text.replace("0 1 47820", "0 1 47821")).expect("write graph");

    env.cli()
        .arg("landmarks-verify")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("STALE"));
}

#[test]
fn verify_detects_corrupt_cache() {
    let env = TestEnv::new();
    env.build_landmarks();
    fs::write(&env.landmarks_path, b"garbage").expect("overwrite cache");

    env.cli()
        .args(["landmarks-verify", "--json"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("\"status\": \"corrupt\""));
}

#[test]
fn build_exports_geojson() {
    let env = TestEnv::new();
    let geojson = env.graph_path.with_file_name("landmarks.geojson");

    env.cli()
        .args(["landmarks-build", "--strategy", "random", "--count", "3"])
        .arg("--geojson")
        .arg(&geojson)
        .assert()
        .success();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&geojson).expect("geojson written"))
            .expect("valid json");
    assert_eq!(value["type"], "FeatureCollection");
    assert_eq!(value["features"].as_array().map(Vec::len), Some(3));
}

// ============================================================================
// evaluate
// ============================================================================

#[test]
fn evaluate_all_variants_agree() {
    let env = TestEnv::new();
    env.build_landmarks();

    env.cli()
        .args(["evaluate", "--queries", "30", "--seed", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("consistent-bidirectional-a-star"))
        .stdout(predicate::str::contains("Evaluated 30 queries"));
}

#[test]
fn evaluate_json_lists_requested_algorithms() {
    let env = TestEnv::new();
    let output = env
        .cli()
        .args([
            "evaluate",
            "--queries",
            "10",
            "--algorithm",
            "dijkstra",
            "--algorithm",
            "bidirectional-a-star",
            "--json",
        ])
        .output()
        .expect("runs");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["variants"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["variants"][1]["algorithm"], "bidirectional-a-star");
    assert_eq!(value["variants"][1]["mismatches"], 0);
}
