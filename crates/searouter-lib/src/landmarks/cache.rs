//! On-disk landmark cache.
//!
//! # Serialization Format
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Header (16 bytes)                       │
//! │   magic: "SRLM" (4 bytes)               │
//! │   version: u8                           │
//! │   flags: u8 (reserved, 0)               │
//! │   landmark_count: u32 (LE)              │
//! │   vertex_count: u32 (LE)                │
//! │   reserved: 2 bytes                     │
//! ├─────────────────────────────────────────┤
//! │ Compressed body (zstd)                  │
//! │   postcard-encoded LandmarkTable        │
//! ├─────────────────────────────────────────┤
//! │ SHA-256 checksum (32 bytes)             │
//! │   over the compressed body              │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Arrays inside the body are length-prefixed by postcard. A file written by a
//! different format version is rejected rather than reinterpreted.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::{LandmarkStrategy, LandmarkTable};
use crate::error::{Error, Result};
use crate::graph::Graph;

const CACHE_MAGIC: &[u8; 4] = b"SRLM";

/// Current landmark cache format version.
pub const CACHE_VERSION: u8 = 1;

const HEADER_SIZE: usize = 16;
const CHECKSUM_SIZE: usize = 32;
const COMPRESSION_LEVEL: i32 = 3;

/// Freshness of a landmark cache relative to a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CacheStatus {
    /// Readable and computed on this graph.
    Fresh { landmarks: usize },
    /// Readable but computed on another graph.
    Stale,
    /// No file at the path.
    Missing,
    /// Unreadable, truncated, foreign version, or failing its checksum.
    Corrupt { message: String },
}

impl CacheStatus {
    pub fn is_fresh(&self) -> bool {
        matches!(self, CacheStatus::Fresh { .. })
    }
}

impl LandmarkTable {
    /// Write the table to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        info!(
            path = %path.display(),
            landmarks = self.len(),
            "saving landmark cache"
        );

        let serialized = postcard::to_allocvec(self)
            .map_err(|e| Error::Serialization(format!("postcard serialization failed: {e}")))?;
        let compressed = zstd::encode_all(serialized.as_slice(), COMPRESSION_LEVEL)
            .map_err(|e| Error::Serialization(format!("zstd compression failed: {e}")))?;
        let checksum = Sha256::digest(&compressed);

        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(CACHE_MAGIC);
        header[4] = CACHE_VERSION;
        header[5] = 0;
        header[6..10].copy_from_slice(&(self.len() as u32).to_le_bytes());
        header[10..14].copy_from_slice(&(self.vertex_count() as u32).to_le_bytes());
        // bytes 14-15 reserved

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(directory)?;
        file.write_all(&header)?;
        file.write_all(&compressed)?;
        file.write_all(&checksum)?;
        file.flush()?;
        file.persist(path).map_err(|e| Error::Io(e.error))?;

        info!(
            file_size = HEADER_SIZE + compressed.len() + CHECKSUM_SIZE,
            compressed_size = compressed.len(),
            "landmark cache saved"
        );
        Ok(())
    }

    /// Read a table written by [`save`](Self::save).
    ///
    /// Validates the header, verifies the checksum and decompresses the body.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading landmark cache");
        let load_error = |message: String| Error::LandmarkCacheLoad {
            path: path.to_path_buf(),
            message,
        };

        let bytes = fs::read(path).map_err(|e| load_error(format!("failed to read file: {e}")))?;
        if bytes.len() < HEADER_SIZE + CHECKSUM_SIZE {
            return Err(load_error(format!("file too short ({} bytes)", bytes.len())));
        }

        let (header, rest) = bytes.split_at(HEADER_SIZE);
        if &header[0..4] != CACHE_MAGIC {
            return Err(load_error("invalid magic bytes".to_string()));
        }
        let version = header[4];
        if version != CACHE_VERSION {
            return Err(load_error(format!(
                "unsupported version {version} (expected {CACHE_VERSION})"
            )));
        }
        let landmark_count = read_u32(&header[6..10]) as usize;
        let vertex_count = read_u32(&header[10..14]) as usize;

        let (compressed, stored_checksum) = rest.split_at(rest.len() - CHECKSUM_SIZE);
        let computed_checksum = Sha256::digest(compressed);
        if computed_checksum.as_slice() != stored_checksum {
            return Err(load_error(
                "checksum mismatch - file may be corrupted".to_string(),
            ));
        }

        let decompressed = zstd::decode_all(compressed)
            .map_err(|e| load_error(format!("zstd decompression failed: {e}")))?;
        let table: LandmarkTable = postcard::from_bytes(&decompressed)
            .map_err(|e| load_error(format!("postcard deserialization failed: {e}")))?;

        if table.len() != landmark_count || table.vertex_count() != vertex_count {
            return Err(load_error(format!(
                "header declares {landmark_count} landmarks over {vertex_count} vertices, body holds {} over {}",
                table.len(),
                table.vertex_count()
            )));
        }
        if table
            .distances
            .iter()
            .any(|row| row.len() != table.vertex_count())
        {
            return Err(load_error("distance row length mismatch".to_string()));
        }

        info!(landmarks = table.len(), vertices = vertex_count, "loaded landmark cache");
        Ok(table)
    }

    /// Read the table at `path` and require that it was computed on `graph`.
    pub fn load_for_graph(path: &Path, graph: &Graph) -> Result<Self> {
        let table = Self::load(path)?;
        if !table.matches(graph) {
            return Err(Error::LandmarkCacheMismatch {
                path: path.to_path_buf(),
            });
        }
        Ok(table)
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buffer = [0u8; 4];
    buffer.copy_from_slice(bytes);
    u32::from_le_bytes(buffer)
}

/// Derive the landmark cache path from a graph path.
///
/// For example, `ocean.fmi` -> `ocean.fmi.landmarks.bin`.
pub fn landmark_cache_path(graph_path: &Path) -> PathBuf {
    let mut path = graph_path.as_os_str().to_owned();
    path.push(".landmarks.bin");
    PathBuf::from(path)
}

/// Report whether the cache at `path` can serve `graph`.
pub fn verify_landmark_cache(path: &Path, graph: &Graph) -> CacheStatus {
    if !path.exists() {
        return CacheStatus::Missing;
    }
    match LandmarkTable::load(path) {
        Ok(table) if table.matches(graph) => CacheStatus::Fresh {
            landmarks: table.len(),
        },
        Ok(_) => CacheStatus::Stale,
        Err(e) => CacheStatus::Corrupt {
            message: e.to_string(),
        },
    }
}

/// Load the cache at `path` when it is valid for `graph` and `strategy`;
/// otherwise build the table, save it to `path` and return it.
pub fn load_or_build(path: &Path, graph: &Graph, strategy: &LandmarkStrategy) -> Result<LandmarkTable> {
    if path.exists() {
        match LandmarkTable::load(path) {
            Ok(table) if table.matches(graph) && table.strategy() == Some(strategy) => {
                return Ok(table);
            }
            Ok(_) => {
                info!(path = %path.display(), "landmark cache is stale, rebuilding");
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to load landmark cache, will rebuild"
                );
            }
        }
    }

    let table = LandmarkTable::build(graph, strategy)?;
    table.save(path)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Coordinate, EdgeRecord};
    use tempfile::tempdir;

    fn ring(count: u32) -> Graph {
        let coordinates = (0..count)
            .map(|index| Coordinate::new(0.0, index as f64 * 0.01))
            .collect();
        let mut edges = Vec::new();
        for vertex in 0..count {
            let next = (vertex + 1) % count;
            edges.push(EdgeRecord::new(vertex, next, 1_200));
            edges.push(EdgeRecord::new(next, vertex, 1_200));
        }
        Graph::from_edges(coordinates, edges).expect("valid ring")
    }

    #[test]
    fn cache_path_appends_suffix() {
        assert_eq!(
            landmark_cache_path(Path::new("/data/ocean.fmi")),
            PathBuf::from("/data/ocean.fmi.landmarks.bin")
        );
    }

    #[test]
    fn save_then_load_returns_same_table() {
        let graph = ring(12);
        let table = LandmarkTable::from_anchors(&graph, vec![0, 6]).expect("builds");
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("ring.landmarks.bin");

        table.save(&path).expect("saves");
        let loaded = LandmarkTable::load(&path).expect("loads");

        assert_eq!(loaded, table);
        assert!(loaded.matches(&graph));
    }

    #[test]
    fn rejects_wrong_magic() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("bogus.bin");
        fs::write(&path, vec![0u8; HEADER_SIZE + CHECKSUM_SIZE + 4]).expect("writes");

        let err = LandmarkTable::load(&path).expect_err("bad magic");
        assert!(err.to_string().contains("invalid magic"));
    }

    #[test]
    fn rejects_future_version() {
        let graph = ring(6);
        let table = LandmarkTable::from_anchors(&graph, vec![0]).expect("builds");
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("ring.landmarks.bin");
        table.save(&path).expect("saves");

        let mut bytes = fs::read(&path).expect("reads");
        bytes[4] = CACHE_VERSION + 1;
        fs::write(&path, bytes).expect("writes");

        let err = LandmarkTable::load(&path).expect_err("foreign version");
        assert!(err.to_string().contains("unsupported version"));
    }

    #[test]
    fn verify_reports_missing_and_stale() {
        let graph = ring(8);
        let other = ring(9);
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("ring.landmarks.bin");

        assert_eq!(verify_landmark_cache(&path, &graph), CacheStatus::Missing);

        LandmarkTable::from_anchors(&graph, vec![0, 4])
            .expect("builds")
            .save(&path)
            .expect("saves");
        assert_eq!(
            verify_landmark_cache(&path, &graph),
            CacheStatus::Fresh { landmarks: 2 }
        );
        assert_eq!(verify_landmark_cache(&path, &other), CacheStatus::Stale);

        let err = LandmarkTable::load_for_graph(&path, &other).expect_err("stale");
        assert!(matches!(err, Error::LandmarkCacheMismatch { .. }));
    }

    #[test]
    fn load_or_build_reuses_matching_cache() {
        let graph = ring(10);
        let strategy = LandmarkStrategy::Random { count: 3, seed: 5 };
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("ring.landmarks.bin");

        let built = load_or_build(&path, &graph, &strategy).expect("builds");
        assert!(path.exists());
        let modified = fs::metadata(&path).and_then(|m| m.modified()).expect("mtime");

        let reused = load_or_build(&path, &graph, &strategy).expect("loads");
        let modified_again = fs::metadata(&path).and_then(|m| m.modified()).expect("mtime");

        assert_eq!(built, reused);
        assert_eq!(modified, modified_again);
    }

    #[test]
    fn load_or_build_replaces_cache_for_other_strategy() {
        let graph = ring(10);
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("ring.landmarks.bin");

        load_or_build(&path, &graph, &LandmarkStrategy::Random { count: 2, seed: 1 })
            .expect("builds");
        let rebuilt = load_or_build(&path, &graph, &LandmarkStrategy::Random { count: 4, seed: 1 })
            .expect("rebuilds");

        assert_eq!(rebuilt.len(), 4);
        assert_eq!(LandmarkTable::load(&path).expect("loads").len(), 4);
    }
}
