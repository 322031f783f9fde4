//! Priority-ordered boundary frontier with lazy invalidation
//!
//! Entries are pushed into a max-heap tagged with a per-vertex version stamp.
//! Reprioritizing a vertex bumps its stamp and pushes a fresh entry; the old
//! entry becomes stale and is discarded when it reaches the top of the heap.

use ndarray::Array2;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::spatial::patch::Vertex;

/// Frontier membership of a grid vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrontierState {
    /// Not currently eligible (valid pixel, interior hole pixel, or deferred)
    #[default]
    NotBoundary,
    /// On the boundary with a live priority in the queue
    Active,
    /// Filled; never eligible again
    Filled,
}

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    priority: f32,
    vertex: Vertex,
    version: u32,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    // Highest priority first; equal priorities pop in row-major order
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.vertex.cmp(&self.vertex))
            .then_with(|| self.version.cmp(&other.version))
    }
}

/// Indirect priority queue over the vertices of a grid
#[derive(Debug, Clone)]
pub struct BoundaryFrontier {
    heap: BinaryHeap<HeapEntry>,
    versions: Array2<u32>,
    states: Array2<FrontierState>,
    priorities: Array2<f32>,
    active: usize,
}

impl BoundaryFrontier {
    /// Create an empty frontier for a `rows x cols` grid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            versions: Array2::zeros((rows, cols)),
            states: Array2::default((rows, cols)),
            priorities: Array2::zeros((rows, cols)),
            active: 0,
        }
    }

    /// Insert a vertex, or reprioritize it if already active
    ///
    /// Filled vertices are ignored.
    pub fn push(&mut self, vertex: Vertex, priority: f32) {
        let Some(state) = self.states.get(vertex).copied() else {
            return;
        };
        match state {
            FrontierState::Filled => return,
            FrontierState::NotBoundary => self.active += 1,
            FrontierState::Active => {}
        }
        if let Some(s) = self.states.get_mut(vertex) {
            *s = FrontierState::Active;
        }
        if let Some(p) = self.priorities.get_mut(vertex) {
            *p = priority;
        }
        let version = self.bump(vertex);
        self.heap.push(HeapEntry {
            priority,
            vertex,
            version,
        });
    }

    /// Change the priority of an active vertex
    ///
    /// Returns `false` if the vertex is not active.
    pub fn update_priority(&mut self, vertex: Vertex, priority: f32) -> bool {
        if self.is_valid(vertex) {
            self.push(vertex, priority);
            true
        } else {
            false
        }
    }

    /// Remove a vertex from eligibility without touching the heap
    pub fn invalidate(&mut self, vertex: Vertex) {
        if let Some(state) = self.states.get_mut(vertex) {
            if *state == FrontierState::Active {
                *state = FrontierState::NotBoundary;
                self.active -= 1;
                self.bump(vertex);
            }
        }
    }

    /// Permanently retire a vertex
    pub fn mark_filled(&mut self, vertex: Vertex) {
        if let Some(state) = self.states.get_mut(vertex) {
            if *state == FrontierState::Active {
                self.active -= 1;
            }
            *state = FrontierState::Filled;
            self.bump(vertex);
        }
    }

    /// Check whether a vertex is active
    pub fn is_valid(&self, vertex: Vertex) -> bool {
        self.state(vertex) == FrontierState::Active
    }

    /// Membership state of a vertex (out-of-grid vertices are not boundary)
    pub fn state(&self, vertex: Vertex) -> FrontierState {
        self.states.get(vertex).copied().unwrap_or_default()
    }

    /// Last priority assigned to an active vertex
    pub fn priority(&self, vertex: Vertex) -> Option<f32> {
        self.is_valid(vertex)
            .then(|| self.priorities.get(vertex).copied())
            .flatten()
    }

    /// Pop the highest-priority active vertex accepted by `admissible`
    ///
    /// Stale entries and vertices rejected by `admissible` are discarded;
    /// rejected vertices are invalidated. The returned vertex leaves the
    /// active set and can be pushed again.
    pub fn pop_max<F>(&mut self, mut admissible: F) -> Option<(Vertex, f32)>
    where
        F: FnMut(Vertex) -> bool,
    {
        while let Some(entry) = self.heap.pop() {
            let current = self.versions.get(entry.vertex).copied();
            if current != Some(entry.version) || !self.is_valid(entry.vertex) {
                continue;
            }
            self.invalidate(entry.vertex);
            if admissible(entry.vertex) {
                return Some((entry.vertex, entry.priority));
            }
        }
        None
    }

    /// Number of active vertices
    pub const fn len(&self) -> usize {
        self.active
    }

    /// Check whether no vertex is active
    pub const fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Active vertices in row-major order
    pub fn active_vertices(&self) -> Vec<Vertex> {
        self.states
            .indexed_iter()
            .filter(|(_, state)| **state == FrontierState::Active)
            .map(|((row, col), _)| [row, col])
            .collect()
    }

    /// Number of heap entries including stale ones
    pub fn heap_len(&self) -> usize {
        self.heap.len()
    }

    fn bump(&mut self, vertex: Vertex) -> u32 {
        self.versions.get_mut(vertex).map_or(0, |v| {
            *v = v.wrapping_add(1);
            *v
        })
    }
}
