//! Addressable binary min-heap over vertex ids.
//!
//! The heap stores only vertex ids. Ordering dereferences a key slice owned by
//! the caller (the search state's priority array), so a key is never duplicated
//! and a decrease is a single sift-up located through the position index.

use crate::graph::VertexId;

const NOT_QUEUED: u32 = u32::MAX;

/// Priority frontier of one search direction.
#[derive(Debug, Clone)]
pub struct Frontier {
    heap: Vec<VertexId>,
    positions: Vec<u32>,
}

impl Frontier {
    /// Frontier able to hold every vertex of a graph with `vertex_count` vertices.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            heap: Vec::with_capacity(vertex_count.min(1 << 16)),
            positions: vec![NOT_QUEUED; vertex_count],
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.positions[vertex as usize] != NOT_QUEUED
    }

    /// Insert `vertex`, or restore heap order after its key decreased.
    ///
    /// `keys[vertex]` must already hold the new key, and a queued vertex's key
    /// may only go down.
    pub fn insert_or_decrease(&mut self, vertex: VertexId, keys: &[f64]) {
        let position = match self.positions[vertex as usize] {
            NOT_QUEUED => {
                let position = self.heap.len();
                self.heap.push(vertex);
                self.positions[vertex as usize] = position as u32;
                position
            }
            position => position as usize,
        };
        self.sift_up(position, keys);
    }

    /// Vertex with the smallest key, without removing it.
    pub fn peek_min(&self) -> Option<VertexId> {
        self.heap.first().copied()
    }

    /// Remove and return the vertex with the smallest key.
    ///
    /// Ties are broken towards the lower vertex id.
    pub fn pop_min(&mut self, keys: &[f64]) -> Option<VertexId> {
        let last = self.heap.pop()?;
        let min = match self.heap.first_mut() {
            Some(root) => std::mem::replace(root, last),
            None => last,
        };
        self.positions[min as usize] = NOT_QUEUED;
        if !self.heap.is_empty() {
            self.positions[last as usize] = 0;
            self.sift_down(0, keys);
        }
        Some(min)
    }

    /// Empty the frontier, keeping its allocations.
    pub fn reset(&mut self) {
        for vertex in self.heap.drain(..) {
            self.positions[vertex as usize] = NOT_QUEUED;
        }
    }

    #[inline]
    fn less(&self, a: usize, b: usize, keys: &[f64]) -> bool {
        let (va, vb) = (self.heap[a], self.heap[b]);
        let (ka, kb) = (keys[va as usize], keys[vb as usize]);
        ka < kb || (ka == kb && va < vb)
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.positions[self.heap[a] as usize] = a as u32;
        self.positions[self.heap[b] as usize] = b as u32;
    }

    fn sift_up(&mut self, mut position: usize, keys: &[f64]) {
        while position > 0 {
            let parent = (position - 1) / 2;
            if !self.less(position, parent, keys) {
                break;
            }
            self.swap(position, parent);
            position = parent;
        }
    }

    fn sift_down(&mut self, mut position: usize, keys: &[f64]) {
        loop {
            let left = 2 * position + 1;
            if left >= self.heap.len() {
                break;
            }
            let right = left + 1;
            let smallest = if right < self.heap.len() && self.less(right, left, keys) {
                right
            } else {
                left
            };
            if !self.less(smallest, position, keys) {
                break;
            }
            self.swap(position, smallest);
            position = smallest;
        }
    }
}
