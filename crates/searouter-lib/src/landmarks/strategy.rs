//! Offline landmark selection strategies.
//!
//! Every strategy returns an ordered, duplicate-free list of anchor vertices.
//! Strategies differ only in how tight the resulting ALT bounds are, never in
//! correctness. All of them are deterministic for fixed parameters.

use std::collections::HashSet;
use std::f64::consts::PI;
use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geodesic::{geographic_midpoint, great_circle_distance};
use crate::graph::{Coordinate, Distance, Graph, VertexId, INFINITE_DISTANCE};
use crate::search::{Router, SearchEngine};
use crate::spatial::SpatialIndex;

const DEFAULT_RANDOM_COUNT: usize = 370;
const DEFAULT_RANDOM_SEED: u64 = 666;
const DEFAULT_GRID_SPACING_DEGREES: f64 = 13.0;
const DEFAULT_SPHERE_COUNT: usize = 418;
const DEFAULT_SNAP_RADIUS_METERS: f64 = 100_000.0;
const DEFAULT_COASTLINE_COUNT: usize = 508;
const DEFAULT_COASTLINE_SEPARATION_METERS: Distance = 1_000_000;
const DEFAULT_COASTLINE_MAX_DEGREE: usize = 3;
const DEFAULT_COASTLINE_SEED: u64 = 4_304_344;
const DEFAULT_MAX_AVOID_COUNT: usize = 300;
const DEFAULT_MAX_AVOID_START: Coordinate = Coordinate::new(10.08, 100.08);

/// Strategy family, without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum LandmarkStrategyKind {
    Random,
    Grid,
    Sphere,
    #[default]
    Coastline,
    MaxAvoid,
}

impl fmt::Display for LandmarkStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            LandmarkStrategyKind::Random => "random",
            LandmarkStrategyKind::Grid => "grid",
            LandmarkStrategyKind::Sphere => "sphere",
            LandmarkStrategyKind::Coastline => "coastline",
            LandmarkStrategyKind::MaxAvoid => "max-avoid",
        };
        f.write_str(value)
    }
}

/// Landmark selection strategy with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LandmarkStrategy {
    /// Uniform draws without repetition.
    Random { count: usize, seed: u64 },
    /// One landmark per lat/lon grid point that has a vertex nearby.
    Grid {
        spacing_degrees: f64,
        snap_radius_meters: f64,
    },
    /// Equal-area regular placement of `count` points on the sphere.
    Sphere {
        count: usize,
        snap_radius_meters: f64,
    },
    /// Low-degree vertices kept at least `min_separation_meters` apart by graph distance.
    Coastline {
        count: usize,
        min_separation_meters: Distance,
        max_degree: usize,
        seed: u64,
    },
    /// Repeatedly pick the vertex farthest from the midpoint of the chosen set.
    MaxAvoid { count: usize, start: Coordinate },
}

impl Default for LandmarkStrategy {
    fn default() -> Self {
        Self::with_defaults(LandmarkStrategyKind::default())
    }
}

impl LandmarkStrategy {
    /// Strategy of `kind` with its default parameters.
    pub fn with_defaults(kind: LandmarkStrategyKind) -> Self {
        match kind {
            LandmarkStrategyKind::Random => LandmarkStrategy::Random {
                count: DEFAULT_RANDOM_COUNT,
                seed: DEFAULT_RANDOM_SEED,
            },
            LandmarkStrategyKind::Grid => LandmarkStrategy::Grid {
                spacing_degrees: DEFAULT_GRID_SPACING_DEGREES,
                snap_radius_meters: DEFAULT_SNAP_RADIUS_METERS,
            },
            LandmarkStrategyKind::Sphere => LandmarkStrategy::Sphere {
                count: DEFAULT_SPHERE_COUNT,
                snap_radius_meters: DEFAULT_SNAP_RADIUS_METERS,
            },
            LandmarkStrategyKind::Coastline => LandmarkStrategy::Coastline {
                count: DEFAULT_COASTLINE_COUNT,
                min_separation_meters: DEFAULT_COASTLINE_SEPARATION_METERS,
                max_degree: DEFAULT_COASTLINE_MAX_DEGREE,
                seed: DEFAULT_COASTLINE_SEED,
            },
            LandmarkStrategyKind::MaxAvoid => LandmarkStrategy::MaxAvoid {
                count: DEFAULT_MAX_AVOID_COUNT,
                start: DEFAULT_MAX_AVOID_START,
            },
        }
    }

    pub fn kind(&self) -> LandmarkStrategyKind {
        match self {
            LandmarkStrategy::Random { .. } => LandmarkStrategyKind::Random,
            LandmarkStrategy::Grid { .. } => LandmarkStrategyKind::Grid,
            LandmarkStrategy::Sphere { .. } => LandmarkStrategyKind::Sphere,
            LandmarkStrategy::Coastline { .. } => LandmarkStrategyKind::Coastline,
            LandmarkStrategy::MaxAvoid { .. } => LandmarkStrategyKind::MaxAvoid,
        }
    }

    /// Requested landmark count; grid placement is bounded by its spacing instead.
    fn count(&self) -> Option<usize> {
        match self {
            LandmarkStrategy::Random { count, .. }
            | LandmarkStrategy::Sphere { count, .. }
            | LandmarkStrategy::Coastline { count, .. }
            | LandmarkStrategy::MaxAvoid { count, .. } => Some(*count),
            LandmarkStrategy::Grid { .. } => None,
        }
    }

    /// Override the landmark count; grid spacing is unaffected.
    pub fn with_count(mut self, value: usize) -> Self {
        match &mut self {
            LandmarkStrategy::Random { count, .. }
            | LandmarkStrategy::Sphere { count, .. }
            | LandmarkStrategy::Coastline { count, .. }
            | LandmarkStrategy::MaxAvoid { count, .. } => *count = value,
            LandmarkStrategy::Grid { .. } => {}
        }
        self
    }

    /// Override the shuffle seed of seeded strategies.
    pub fn with_seed(mut self, value: u64) -> Self {
        match &mut self {
            LandmarkStrategy::Random { seed, .. } | LandmarkStrategy::Coastline { seed, .. } => {
                *seed = value
            }
            LandmarkStrategy::Grid { .. }
            | LandmarkStrategy::Sphere { .. }
            | LandmarkStrategy::MaxAvoid { .. } => {}
        }
        self
    }

    /// Choose anchor vertices on `graph`.
    pub fn select(&self, graph: &Graph) -> Result<Vec<VertexId>> {
        Ok(self.select_with_rows(graph)?.anchors)
    }

    /// Choose anchors and keep any distance rows computed along the way.
    pub(crate) fn select_with_rows(&self, graph: &Graph) -> Result<Selection> {
        if graph.vertex_count() == 0 {
            return Err(Error::LandmarkSelection {
                message: "graph has no vertices".to_string(),
            });
        }

        let selection = match self {
            LandmarkStrategy::Random { count, seed } => {
                Selection::anchors_only(select_random(graph, *count, *seed))
            }
            LandmarkStrategy::Grid {
                spacing_degrees,
                snap_radius_meters,
            } => Selection::anchors_only(select_grid(
                graph,
                *spacing_degrees,
                *snap_radius_meters,
            )?),
            LandmarkStrategy::Sphere {
                count,
                snap_radius_meters,
            } => Selection::anchors_only(select_sphere(graph, *count, *snap_radius_meters)),
            LandmarkStrategy::Coastline {
                count,
                min_separation_meters,
                max_degree,
                seed,
            } => select_coastline(graph, *count, *min_separation_meters, *max_degree, *seed)?,
            LandmarkStrategy::MaxAvoid { count, start } => {
                Selection::anchors_only(select_max_avoid(graph, *count, *start)?)
            }
        };

        let selection = selection.deduped(self.count());
        debug!(
            strategy = %self.kind(),
            anchors = selection.anchors.len(),
            "landmark anchors chosen"
        );
        Ok(selection)
    }
}

/// Anchors chosen by a strategy.
///
/// `distances` holds one one-to-all row per anchor when the strategy already
/// computed them.
#[derive(Debug)]
pub(crate) struct Selection {
    pub(crate) anchors: Vec<VertexId>,
    pub(crate) distances: Option<Vec<Vec<Distance>>>,
}

impl Selection {
    fn anchors_only(anchors: Vec<VertexId>) -> Self {
        Self {
            anchors,
            distances: None,
        }
    }

    /// Drop repeated anchors (with their rows) and cap at `count`.
    fn deduped(self, count: Option<usize>) -> Self {
        let limit = count.unwrap_or(usize::MAX);
        let mut seen = HashSet::with_capacity(self.anchors.len());
        let mut anchors = Vec::with_capacity(self.anchors.len());
        let mut distances = self.distances.as_ref().map(|_| Vec::new());
        let mut rows = self.distances.into_iter().flatten();
        for anchor in self.anchors {
            let row = rows.next();
            if anchors.len() >= limit || !seen.insert(anchor) {
                continue;
            }
            anchors.push(anchor);
            if let (Some(kept), Some(row)) = (distances.as_mut(), row) {
                kept.push(row);
            }
        }
        Self { anchors, distances }
    }
}

fn select_random(graph: &Graph, count: usize, seed: u64) -> Vec<VertexId> {
    let mut rng = StdRng::seed_from_u64(seed);
    let amount = count.min(graph.vertex_count());
    rand::seq::index::sample(&mut rng, graph.vertex_count(), amount)
        .into_iter()
        .map(|vertex| vertex as VertexId)
        .collect()
}

fn select_grid(graph: &Graph, spacing: f64, snap_radius: f64) -> Result<Vec<VertexId>> {
    if spacing.is_nan() || spacing <= 0.0 {
        return Err(Error::LandmarkSelection {
            message: format!("grid spacing must be positive, got {spacing}"),
        });
    }
    let index = SpatialIndex::build(graph);
    let lat_steps = (90.0 / spacing).floor() as i32;
    let lon_steps = (180.0 / spacing).floor() as i32;

    let mut anchors = Vec::new();
    for lat_step in -lat_steps..=lat_steps {
        for lon_step in -lon_steps..=lon_steps {
            let lon = f64::from(lon_step) * spacing;
            if lon >= 180.0 {
                continue;
            }
            let position = Coordinate::new(f64::from(lat_step) * spacing, lon);
            if let Some(vertex) = index.nearest_within(position, snap_radius) {
                anchors.push(vertex);
            }
        }
    }
    Ok(anchors)
}

/// Regular equal-area placement (Deserno) of roughly `count` points.
fn sphere_points(count: usize) -> Vec<Coordinate> {
    if count == 0 {
        return Vec::new();
    }
    let area = 4.0 * PI / count as f64;
    let side = area.sqrt();
    let theta_bands = (PI / side).round().max(1.0) as usize;
    let theta_step = PI / theta_bands as f64;
    let phi_step = area / theta_step;

    let mut points = Vec::with_capacity(count);
    for band in 0..theta_bands {
        let theta = PI * (band as f64 + 0.5) / theta_bands as f64;
        let phi_count = (2.0 * PI * theta.sin() / phi_step).round().max(1.0) as usize;
        for slot in 0..phi_count {
            let phi = 2.0 * PI * slot as f64 / phi_count as f64;
            points.push(Coordinate::new(
                90.0 - theta.to_degrees(),
                phi.to_degrees() - 180.0,
            ));
        }
    }
    points
}

fn select_sphere(graph: &Graph, count: usize, snap_radius: f64) -> Vec<VertexId> {
    let index = SpatialIndex::build(graph);
    sphere_points(count)
        .into_iter()
        .filter_map(|position| index.nearest_within(position, snap_radius))
        .collect()
}

fn select_coastline(
    graph: &Graph,
    count: usize,
    min_separation: Distance,
    max_degree: usize,
    seed: u64,
) -> Result<Selection> {
    let mut candidates: Vec<VertexId> = (0..graph.vertex_count() as VertexId)
        .filter(|&vertex| (1..=max_degree).contains(&graph.degree(vertex)))
        .collect();
    candidates.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut engine = SearchEngine::dijkstra(graph);
    let mut anchors = Vec::new();
    let mut rows: Vec<Vec<Distance>> = Vec::new();
    for candidate in candidates {
        if anchors.len() >= count {
            break;
        }
        // The graph is undirected, so an accepted anchor's row gives d(candidate, anchor).
        let separated = rows
            .iter()
            .all(|row| row[candidate as usize] >= min_separation);
        if separated {
            rows.push(engine.route_to_all_vertices(candidate)?);
            anchors.push(candidate);
        }
    }
    Ok(Selection {
        anchors,
        distances: Some(rows),
    })
}

fn select_max_avoid(graph: &Graph, count: usize, start: Coordinate) -> Result<Vec<VertexId>> {
    let index = SpatialIndex::build(graph);
    let no_vertex = || Error::LandmarkSelection {
        message: "no vertex near the requested position".to_string(),
    };
    let (first, _) = index.nearest(start).ok_or_else(no_vertex)?;

    let mut engine = SearchEngine::dijkstra(graph);
    let mut chosen = vec![false; graph.vertex_count()];
    let mut anchors = vec![first];
    chosen[first as usize] = true;

    while anchors.len() < count.min(graph.vertex_count()) {
        let midpoint = geographic_midpoint(anchors.iter().map(|&v| graph.coordinate(v)))
            .ok_or_else(no_vertex)?;
        let (center, _) = index.nearest(midpoint).ok_or_else(no_vertex)?;
        let distances = engine.route_to_all_vertices(center)?;

        let unchosen = || (0..graph.vertex_count() as VertexId).filter(|&v| !chosen[v as usize]);
        let unreachable = unchosen()
            .filter(|&v| distances[v as usize] == INFINITE_DISTANCE)
            .max_by(|&a, &b| {
                let da = great_circle_distance(midpoint, graph.coordinate(a));
                let db = great_circle_distance(midpoint, graph.coordinate(b));
                da.total_cmp(&db).then_with(|| b.cmp(&a))
            });
        let next = unreachable.or_else(|| {
            unchosen().max_by(|&a, &b| {
                distances[a as usize]
                    .cmp(&distances[b as usize])
                    .then_with(|| b.cmp(&a))
            })
        });

        let Some(next) = next else {
            break;
        };
        chosen[next as usize] = true;
        anchors.push(next);
    }
    Ok(anchors)
}
