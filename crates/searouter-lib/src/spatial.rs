//! KD-tree over graph vertices for nearest-vertex lookups.
//!
//! Vertices are indexed by their position on the unit sphere so that Euclidean
//! nearest-neighbour order matches great-circle order. Landmark strategies that
//! place landmarks at geographic positions (grid, sphere, max-avoid) snap those
//! positions to the nearest vertex through this index.

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::debug;

use crate::geodesic::{great_circle_distance, to_unit_vector};
use crate::graph::{Coordinate, Graph, VertexId};

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Euler angles (radians) of the fixed rotation applied before indexing.
///
/// Regular lat/lon meshes put whole rows of vertices at the same `z`; a bucket
/// whose items all share one value on its split axis cannot be split.
const ROTATION_ANGLES: (f64, f64, f64) = (0.5, 0.7, 1.1);

/// Nearest-vertex index for one graph.
pub struct SpatialIndex<'g> {
    graph: &'g Graph,
    tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32>,
}

impl<'g> SpatialIndex<'g> {
    /// Index every vertex of `graph`.
    pub fn build(graph: &'g Graph) -> Self {
        let mut tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32> = KdTree::new();
        for (vertex, coordinate) in graph.coordinates().iter().enumerate() {
            tree.add(&rotated(to_unit_vector(*coordinate)), vertex);
        }
        debug!(vertices = graph.vertex_count(), "built spatial index");
        Self { graph, tree }
    }

    pub fn len(&self) -> usize {
        self.graph.vertex_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.vertex_count() == 0
    }

    /// Nearest vertex to a position with its great-circle distance in meters.
    pub fn nearest(&self, position: Coordinate) -> Option<(VertexId, f64)> {
        if self.is_empty() {
            return None;
        }
        let query = rotated(to_unit_vector(position));
        self.tree
            .nearest_n::<SquaredEuclidean>(&query, 1)
            .into_iter()
            .next()
            .map(|neighbour| {
                let vertex = neighbour.item as VertexId;
                let meters = great_circle_distance(position, self.graph.coordinate(vertex));
                (vertex, meters)
            })
    }

    /// Nearest vertex no farther than `max_meters` from `position`.
    pub fn nearest_within(&self, position: Coordinate, max_meters: f64) -> Option<VertexId> {
        self.nearest(position)
            .filter(|&(_, meters)| meters <= max_meters)
            .map(|(vertex, _)| vertex)
    }
}

/// Rotate a unit vector by `Rz(a) * Rx(b) * Rz(c)`; distances are preserved.
fn rotated([x, y, z]: [f64; 3]) -> [f64; 3] {
    let (a, b, c) = ROTATION_ANGLES;
    let (x, y) = (x * c.cos() - y * c.sin(), x * c.sin() + y * c.cos());
    let (y, z) = (y * b.cos() - z * b.sin(), y * b.sin() + z * b.cos());
    let (x, y) = (x * a.cos() - y * a.sin(), x * a.sin() + y * a.cos());
    [x, y, z]
}

impl std::fmt::Debug for SpatialIndex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("vertex_count", &self.len())
            .finish()
    }
}
