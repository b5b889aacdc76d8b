//! Cross-variant evaluation against a plain Dijkstra reference.

use std::fmt::Write;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::graph::{Distance, Graph, VertexId};
use crate::landmarks::LandmarkTable;
use crate::result::{validate_path, RoutingResult};
use crate::search::{build_router, RouteAlgorithm, Router, RouterConfig, SearchEngine};

/// Mismatches kept per variant for reporting.
const MAX_RECORDED_MISMATCHES: usize = 10;

/// A query on which a variant disagreed with the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub start: VertexId,
    pub target: VertexId,
    /// Reference distance, `None` when unreachable.
    pub expected: Option<Distance>,
    pub actual: Option<Distance>,
    /// Whether the returned path was a valid edge chain with the reported length.
    pub path_valid: bool,
}

/// Aggregates for one algorithm.
#[derive(Debug, Clone, Serialize)]
pub struct VariantReport {
    pub algorithm: RouteAlgorithm,
    pub queries: usize,
    pub mismatches: usize,
    pub average_elapsed_ms: f64,
    pub average_heap_pops: f64,
    /// The first few mismatching queries.
    pub samples: Vec<Mismatch>,
}

/// Outcome of [`evaluate`].
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub seed: u64,
    pub queries: usize,
    pub reachable: usize,
    pub variants: Vec<VariantReport>,
}

impl EvaluationReport {
    pub fn total_mismatches(&self) -> usize {
        self.variants.iter().map(|v| v.mismatches).sum()
    }

    pub fn has_mismatches(&self) -> bool {
        self.total_mismatches() > 0
    }

    /// Aligned text table, one row per variant.
    pub fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Evaluated {} queries (seed {}, {} reachable)",
            self.queries, self.seed, self.reachable
        );
        let _ = writeln!(
            buffer,
            "{:<32} {:>10} {:>12} {:>12}",
            "algorithm", "mismatches", "avg ms", "avg pops"
        );
        for variant in &self.variants {
            let _ = writeln!(
                buffer,
                "{:<32} {:>10} {:>12.3} {:>12.1}",
                variant.algorithm.to_string(),
                variant.mismatches,
                variant.average_elapsed_ms,
                variant.average_heap_pops
            );
            for sample in &variant.samples {
                let _ = writeln!(
                    buffer,
                    "    {} -> {}: expected {}, got {}{}",
                    sample.start,
                    sample.target,
                    format_distance(sample.expected),
                    format_distance(sample.actual),
                    if sample.path_valid { "" } else { " (invalid path)" }
                );
            }
        }
        buffer
    }
}

fn format_distance(distance: Option<Distance>) -> String {
    distance.map_or_else(|| "unreachable".to_string(), |d| d.to_string())
}

#[derive(Default)]
struct Accumulator {
    queries: usize,
    mismatches: usize,
    elapsed: Duration,
    heap_pops: usize,
    samples: Vec<Mismatch>,
}

impl Accumulator {
    fn record(
        &mut self,
        graph: &Graph,
        start: VertexId,
        target: VertexId,
        reference: &RoutingResult,
        result: &RoutingResult,
    ) {
        self.queries += 1;
        self.elapsed += result.elapsed;
        self.heap_pops += result.heap_pops;

        let path_valid = validate_path(graph, result);
        let agrees = result.found == reference.found
            && (!result.found || result.distance == reference.distance);
        if agrees && path_valid {
            return;
        }

        self.mismatches += 1;
        if self.samples.len() < MAX_RECORDED_MISMATCHES {
            self.samples.push(Mismatch {
                start,
                target,
                expected: reference.found.then_some(reference.distance),
                actual: result.found.then_some(result.distance),
                path_valid,
            });
        }
    }

    fn finish(self, algorithm: RouteAlgorithm) -> VariantReport {
        let divisor = self.queries.max(1) as f64;
        VariantReport {
            algorithm,
            queries: self.queries,
            mismatches: self.mismatches,
            average_elapsed_ms: self.elapsed.as_secs_f64() * 1000.0 / divisor,
            average_heap_pops: self.heap_pops as f64 / divisor,
            samples: self.samples,
        }
    }
}

/// Run `query_count` seeded random queries through every algorithm in
/// `algorithms` and compare each answer with plain Dijkstra.
///
/// A query counts as a mismatch when the found flag or the distance differs
/// from the reference, or when the returned path does not add up to the
/// reported distance. ALT requires `landmarks`.
pub fn evaluate(
    graph: &Graph,
    landmarks: Option<&LandmarkTable>,
    algorithms: &[RouteAlgorithm],
    query_count: usize,
    seed: u64,
) -> Result<EvaluationReport> {
    let vertex_count = graph.vertex_count();
    if vertex_count == 0 && query_count > 0 {
        return Err(Error::MalformedGraph {
            reason: "cannot draw queries from an empty graph".to_string(),
        });
    }

    let mut routers = algorithms
        .iter()
        .map(|&algorithm| build_router(graph, algorithm, landmarks, RouterConfig::default()))
        .collect::<Result<Vec<_>>>()?;
    let mut totals: Vec<Accumulator> = algorithms.iter().map(|_| Accumulator::default()).collect();
    let mut reference = SearchEngine::dijkstra(graph);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut reachable = 0;

    info!(
        queries = query_count,
        seed,
        algorithms = algorithms.len(),
        "starting evaluation"
    );

    for _ in 0..query_count {
        let start = rng.gen_range(0..vertex_count) as VertexId;
        let target = rng.gen_range(0..vertex_count) as VertexId;
        let expected = reference.route(start, target)?;
        if expected.found {
            reachable += 1;
        }

        for (router, total) in routers.iter_mut().zip(totals.iter_mut()) {
            let result = router.route(start, target)?;
            total.record(graph, start, target, &expected, &result);
        }
    }

    let variants: Vec<VariantReport> = algorithms
        .iter()
        .zip(totals)
        .map(|(&algorithm, total)| total.finish(algorithm))
        .collect();

    for variant in &variants {
        if variant.mismatches > 0 {
            warn!(
                algorithm = %variant.algorithm,
                mismatches = variant.mismatches,
                "variant disagrees with reference"
            );
        }
    }

    Ok(EvaluationReport {
        seed,
        queries: query_count,
        reachable,
        variants,
    })
}
