//! Immutable compact-sparse-row graph of the navigable sea mesh.
//!
//! Vertices are dense ids in `[0, N)` carrying a latitude/longitude in degrees.
//! Outgoing edges of vertex `v` occupy the index range `offsets[v]..offsets[v + 1]`
//! of the shared `destinations` and `weights` arrays. Weights are integer meters.
//!
//! # Text format
//!
//! Graphs are exchanged as `.fmi` text files:
//!
//! ```text
//! # comment lines and blank lines are skipped
//! <vertex count>
//! <edge count>
//! <id> <lat> <lon>          (one line per vertex)
//! <src> <dest> <meters>     (one line per edge)
//! ```
//!
//! The loader sorts edges by source and adds any missing reverse edge with the
//! same weight, so the loaded graph is always logically undirected.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Dense vertex identifier.
pub type VertexId = u32;

/// Integer path length in meters.
pub type Distance = u32;

/// Sentinel for "no finite distance" (unreached or unreachable).
pub const INFINITE_DISTANCE: Distance = Distance::MAX;

/// Sentinel for "no predecessor".
pub const NO_VERTEX: VertexId = VertexId::MAX;

/// Upper bound on entries reserved up front from an `.fmi` header.
const MAX_PREALLOCATED: usize = 1 << 20;

/// Position of a vertex in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Directed edge as listed in an edge list before CSR packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRecord {
    pub source: VertexId,
    pub target: VertexId,
    pub weight: Distance,
}

impl EdgeRecord {
    pub const fn new(source: VertexId, target: VertexId, weight: Distance) -> Self {
        Self {
            source,
            target,
            weight,
        }
    }
}

/// Read-only CSR graph shared by every search engine and landmark builder.
#[derive(Debug, Clone)]
pub struct Graph {
    coordinates: Vec<Coordinate>,
    offsets: Vec<usize>,
    destinations: Vec<VertexId>,
    weights: Vec<Distance>,
}

impl Graph {
    /// Take ownership of pre-packed CSR arrays after validating them.
    ///
    /// Fails with [`Error::MalformedGraph`] when the offset array has the wrong
    /// length, is not monotonic non-decreasing, does not end at the edge count,
    /// or when an edge destination lies outside `[0, N)`.
    pub fn from_csr(
        coordinates: Vec<Coordinate>,
        offsets: Vec<usize>,
        destinations: Vec<VertexId>,
        weights: Vec<Distance>,
    ) -> Result<Self> {
        let vertex_count = coordinates.len();
        if vertex_count >= NO_VERTEX as usize {
            return Err(malformed(format!(
                "{vertex_count} vertices exceed the supported maximum"
            )));
        }
        if offsets.len() != vertex_count + 1 {
            return Err(malformed(format!(
                "expected {} offsets for {vertex_count} vertices, found {}",
                vertex_count + 1,
                offsets.len()
            )));
        }
        if offsets[0] != 0 {
            return Err(malformed(format!(
                "first offset must be 0, found {}",
                offsets[0]
            )));
        }
        if let Some(vertex) = offsets.windows(2).position(|pair| pair[0] > pair[1]) {
            return Err(malformed(format!(
                "offsets decrease at vertex {vertex} ({} > {})",
                offsets[vertex],
                offsets[vertex + 1]
            )));
        }
        if offsets[vertex_count] != destinations.len() {
            return Err(malformed(format!(
                "final offset {} does not match edge count {}",
                offsets[vertex_count],
                destinations.len()
            )));
        }
        if weights.len() != destinations.len() {
            return Err(malformed(format!(
                "{} weights for {} edges",
                weights.len(),
                destinations.len()
            )));
        }
        if let Some(edge) = destinations
            .iter()
            .position(|&dest| dest as usize >= vertex_count)
        {
            return Err(malformed(format!(
                "edge {edge} points to vertex {} outside [0, {vertex_count})",
                destinations[edge]
            )));
        }

        Ok(Self {
            coordinates,
            offsets,
            destinations,
            weights,
        })
    }

    /// Pack an unsorted edge list into CSR form.
    ///
    /// Edges are stably sorted by source; the relative order of a vertex's
    /// outgoing edges is preserved.
    pub fn from_edges(coordinates: Vec<Coordinate>, mut edges: Vec<EdgeRecord>) -> Result<Self> {
        let vertex_count = coordinates.len();
        if let Some(edge) = edges
            .iter()
            .find(|edge| edge.source as usize >= vertex_count)
        {
            return Err(malformed(format!(
                "edge source {} outside [0, {vertex_count})",
                edge.source
            )));
        }

        edges.sort_by_key(|edge| edge.source);

        let mut offsets = vec![0usize; vertex_count + 1];
        for edge in &edges {
            offsets[edge.source as usize + 1] += 1;
        }
        for vertex in 0..vertex_count {
            offsets[vertex + 1] += offsets[vertex];
        }

        let destinations = edges.iter().map(|edge| edge.target).collect();
        let weights = edges.iter().map(|edge| edge.weight).collect();

        Self::from_csr(coordinates, offsets, destinations, weights)
    }

    /// Load a graph from an `.fmi` text file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let graph = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "loaded graph"
        );
        Ok(graph)
    }

    /// Parse a graph from `.fmi` text.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader
            .lines()
            .enumerate()
            .map(|(index, line)| line.map(|text| (index + 1, text)))
            .filter(|line| match line {
                Ok((_, text)) => {
                    let trimmed = text.trim();
                    !trimmed.is_empty() && !trimmed.starts_with('#')
                }
                Err(_) => true,
            });

        let mut next_line = |what: &str| -> Result<(usize, String)> {
            match lines.next() {
                Some(line) => Ok(line?),
                None => Err(Error::GraphParse {
                    line: 0,
                    message: format!("unexpected end of input while reading {what}"),
                }),
            }
        };

        let (line, text) = next_line("vertex count")?;
        let vertex_count: usize = parse_field(line, text.trim(), "vertex count")?;
        if vertex_count >= NO_VERTEX as usize {
            return Err(Error::GraphParse {
                line,
                message: format!("vertex count {vertex_count} exceeds the vertex id range"),
            });
        }
        let (line, text) = next_line("edge count")?;
        let edge_count: usize = parse_field(line, text.trim(), "edge count")?;

        // Header counts are untrusted; the vectors grow past this if the body is real.
        let mut coordinates = Vec::with_capacity(vertex_count.min(MAX_PREALLOCATED));
        let mut dense_ids: HashMap<u64, VertexId> =
            HashMap::with_capacity(vertex_count.min(MAX_PREALLOCATED));
        for _ in 0..vertex_count {
            let (line, text) = next_line("vertex")?;
            let mut fields = text.split_whitespace();
            let file_id: u64 = parse_field(line, fields.next().unwrap_or(""), "vertex id")?;
            let lat: f64 = parse_field(line, fields.next().unwrap_or(""), "latitude")?;
            let lon: f64 = parse_field(line, fields.next().unwrap_or(""), "longitude")?;

            let dense = coordinates.len() as VertexId;
            if dense_ids.insert(file_id, dense).is_some() {
                return Err(Error::GraphParse {
                    line,
                    message: format!("duplicate vertex id {file_id}"),
                });
            }
            coordinates.push(Coordinate::new(lat, lon));
        }

        let mut edges = Vec::with_capacity(edge_count.min(MAX_PREALLOCATED));
        for _ in 0..edge_count {
            let (line, text) = next_line("edge")?;
            let mut fields = text.split_whitespace();
            let source: u64 = parse_field(line, fields.next().unwrap_or(""), "edge source")?;
            let target: u64 = parse_field(line, fields.next().unwrap_or(""), "edge target")?;
            let weight: Distance = parse_field(line, fields.next().unwrap_or(""), "edge weight")?;

            let resolve = |file_id: u64| {
                dense_ids.get(&file_id).copied().ok_or_else(|| {
                    malformed(format!(
                        "edge on line {line} references undeclared vertex {file_id}"
                    ))
                })
            };
            edges.push(EdgeRecord::new(resolve(source)?, resolve(target)?, weight));
        }

        let added = complete_reverse_edges(&mut edges);
        if added > 0 {
            debug!(added, "added missing reverse edges");
        }

        Self::from_edges(coordinates, edges)
    }

    /// Write the graph in `.fmi` text form.
    pub fn write_fmi<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = BufWriter::new(writer);
        writeln!(writer, "# searouter graph")?;
        writeln!(writer)?;
        writeln!(writer, "{}", self.vertex_count())?;
        writeln!(writer, "{}", self.edge_count())?;
        for (vertex, coordinate) in self.coordinates.iter().enumerate() {
            writeln!(writer, "{vertex} {} {}", coordinate.lat, coordinate.lon)?;
        }
        for vertex in 0..self.vertex_count() as VertexId {
            for (target, weight) in self.neighbours(vertex) {
                writeln!(writer, "{vertex} {target} {weight}")?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.coordinates.len()
    }

    pub fn edge_count(&self) -> usize {
        self.destinations.len()
    }

    /// CSR index range of the outgoing edges of `vertex`.
    #[inline]
    pub fn edges_of(&self, vertex: VertexId) -> Range<usize> {
        let vertex = vertex as usize;
        self.offsets[vertex]..self.offsets[vertex + 1]
    }

    #[inline]
    pub fn dest(&self, edge: usize) -> VertexId {
        self.destinations[edge]
    }

    #[inline]
    pub fn weight(&self, edge: usize) -> Distance {
        self.weights[edge]
    }

    #[inline]
    pub fn coordinate(&self, vertex: VertexId) -> Coordinate {
        self.coordinates[vertex as usize]
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Iterate `(target, weight)` pairs of the outgoing edges of `vertex`.
    pub fn neighbours(&self, vertex: VertexId) -> impl Iterator<Item = (VertexId, Distance)> + '_ {
        self.edges_of(vertex)
            .map(move |edge| (self.destinations[edge], self.weights[edge]))
    }

    pub fn degree(&self, vertex: VertexId) -> usize {
        self.edges_of(vertex).len()
    }

    /// Weight of the lightest edge `from -> to`, if one exists.
    pub fn edge_weight(&self, from: VertexId, to: VertexId) -> Option<Distance> {
        self.neighbours(from)
            .filter(|&(target, _)| target == to)
            .map(|(_, weight)| weight)
            .min()
    }

    /// Reject vertex ids outside `[0, N)`.
    pub fn check_vertex(&self, vertex: VertexId) -> Result<()> {
        if (vertex as usize) < self.vertex_count() {
            Ok(())
        } else {
            Err(Error::VertexOutOfRange {
                vertex,
                vertex_count: self.vertex_count(),
            })
        }
    }

    /// SHA-256 digest over the CSR arrays and coordinates.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update((self.vertex_count() as u64).to_le_bytes());
        hasher.update((self.edge_count() as u64).to_le_bytes());
        for coordinate in &self.coordinates {
            hasher.update(coordinate.lat.to_bits().to_le_bytes());
            hasher.update(coordinate.lon.to_bits().to_le_bytes());
        }
        for offset in &self.offsets {
            hasher.update((*offset as u64).to_le_bytes());
        }
        for dest in &self.destinations {
            hasher.update(dest.to_le_bytes());
        }
        for weight in &self.weights {
            hasher.update(weight.to_le_bytes());
        }
        hasher.finalize().into()
    }
}

/// Append a reverse edge for every edge whose reverse is missing.
///
/// Returns the number of edges added.
fn complete_reverse_edges(edges: &mut Vec<EdgeRecord>) -> usize {
    let mut present: HashSet<(VertexId, VertexId)> = edges
        .iter()
        .map(|edge| (edge.source, edge.target))
        .collect();

    let original = edges.len();
    for index in 0..original {
        let edge = edges[index];
        if present.insert((edge.target, edge.source)) {
            edges.push(EdgeRecord::new(edge.target, edge.source, edge.weight));
        }
    }
    edges.len() - original
}

fn parse_field<T: std::str::FromStr>(line: usize, field: &str, what: &str) -> Result<T> {
    field.parse().map_err(|_| Error::GraphParse {
        line,
        message: format!("invalid {what}: {field:?}"),
    })
}

fn malformed(reason: String) -> Error {
    Error::MalformedGraph { reason }
}
