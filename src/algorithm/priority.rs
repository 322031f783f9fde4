//! Fill-order priority policies
//!
//! A priority policy scores boundary vertices; higher scores are filled
//! first. Scores may only depend on valid pixels, and the driver recomputes
//! them for vertices near each fill.

use ndarray::Array2;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::spatial::grid::{Mask, StructureField};
use crate::spatial::patch::{Patch, Region, Vertex};

/// Scores boundary vertices for fill order
pub trait PriorityPolicy {
    /// Seed internal state from the initial mask
    fn initialize(&mut self, _mask: &Mask) {}

    /// Priority of a boundary vertex under the current mask
    fn priority(&mut self, vertex: Vertex, mask: &Mask) -> f32;

    /// Observe a fill of `target` that turned `filled` from hole to valid
    ///
    /// Called after the mask has been updated.
    fn update(&mut self, _target: &Patch, _filled: &[Vertex], _mask: &Mask) {}
}

/// Signal contributing to a weighted priority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityTerm {
    /// Share of reliable data in the patch around the vertex
    Confidence,
    /// Strongest structure signal over valid pixels of the patch, in `[0, 1]`
    Structure,
}

/// How weighted terms are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combination {
    /// `sum(weight * term)`
    #[default]
    Sum,
    /// `product(term ^ weight)`
    Product,
}

/// Priority combining confidence and structure terms
#[derive(Debug, Clone)]
pub struct WeightedPriority {
    half_width: usize,
    terms: Vec<(PriorityTerm, f32)>,
    combination: Combination,
    confidence: Array2<f32>,
    structure: Option<StructureField>,
    structure_max: f32,
}

impl WeightedPriority {
    /// Create a policy from `(term, weight)` pairs
    pub fn new(half_width: usize, terms: Vec<(PriorityTerm, f32)>, combination: Combination) -> Self {
        Self {
            half_width,
            terms,
            combination,
            confidence: Array2::zeros((0, 0)),
            structure: None,
            structure_max: 0.0,
        }
    }

    /// Confidence-only policy
    pub fn confidence(half_width: usize) -> Self {
        Self::new(
            half_width,
            vec![(PriorityTerm::Confidence, 1.0)],
            Combination::Sum,
        )
    }

    /// Attach the precomputed structure signal
    #[must_use]
    pub fn with_structure(mut self, structure: StructureField) -> Self {
        self.structure_max = structure.iter().copied().fold(0.0_f32, f32::max);
        self.structure = Some(structure);
        self
    }

    /// Confidence value currently stored for a pixel
    pub fn pixel_confidence(&self, vertex: Vertex) -> f32 {
        self.confidence.get(vertex).copied().unwrap_or(0.0)
    }

    fn window(&self, vertex: Vertex, mask: &Mask) -> Region {
        Region::new(vertex, 1, 1).expand(self.half_width, &mask.bounds())
    }

    fn patch_area(&self) -> f32 {
        let side = 2 * self.half_width + 1;
        (side * side) as f32
    }

    fn confidence_term<F>(&self, vertex: Vertex, mask: &Mask, counts: F) -> f32
    where
        F: Fn(Vertex) -> bool,
    {
        let sum: f32 = self
            .window(vertex, mask)
            .vertices()
            .filter(|&v| counts(v))
            .map(|v| self.pixel_confidence(v))
            .sum();
        sum / self.patch_area()
    }

    fn structure_term(&self, vertex: Vertex, mask: &Mask) -> f32 {
        let Some(structure) = &self.structure else {
            return 0.0;
        };
        if self.structure_max <= f32::EPSILON {
            return 0.0;
        }
        let strongest = self
            .window(vertex, mask)
            .vertices()
            .filter(|&v| mask.is_valid(v))
            .filter_map(|v| structure.get(v).copied())
            .fold(0.0_f32, f32::max);
        strongest / self.structure_max
    }
}

impl PriorityPolicy for WeightedPriority {
    fn initialize(&mut self, mask: &Mask) {
        self.confidence = Array2::from_shape_fn((mask.rows(), mask.cols()), |(row, col)| {
            if mask.is_valid([row, col]) { 1.0 } else { 0.0 }
        });
    }

    fn priority(&mut self, vertex: Vertex, mask: &Mask) -> f32 {
        let values = self.terms.iter().map(|&(term, weight)| {
            let value = match term {
                PriorityTerm::Confidence => {
                    self.confidence_term(vertex, mask, |v| mask.is_valid(v))
                }
                PriorityTerm::Structure => self.structure_term(vertex, mask),
            };
            (value, weight)
        });

        match self.combination {
            Combination::Sum => values.map(|(value, weight)| weight * value).sum(),
            Combination::Product => values
                .map(|(value, weight)| value.powf(weight))
                .product(),
        }
    }

    fn update(&mut self, target: &Patch, filled: &[Vertex], mask: &Mask) {
        // Confidence of the target as it was before the fill
        let inherited = self.confidence_term(target.center(), mask, |v| {
            mask.is_valid(v) && !filled.contains(&v)
        });
        for &vertex in filled {
            if let Some(c) = self.confidence.get_mut(vertex) {
                *c = inherited;
            }
        }
    }
}

/// Non-informative priority drawn from a seeded generator
#[derive(Debug, Clone)]
pub struct RandomPriority {
    rng: StdRng,
}

impl RandomPriority {
    /// Create a reproducible random policy
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PriorityPolicy for RandomPriority {
    fn priority(&mut self, _vertex: Vertex, _mask: &Mask) -> f32 {
        self.rng.random::<f32>()
    }
}
