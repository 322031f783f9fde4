//! Source/target patch association with optional difference scores

use std::cmp::Ordering;

use crate::spatial::patch::Patch;

/// Score slots a pair can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairScore {
    /// Sum of absolute differences
    TotalAbsolute,
    /// Sum of squared differences
    TotalSquared,
    /// Mean absolute difference per compared pixel
    AverageAbsolute,
    /// Mean squared difference per compared pixel
    AverageSquared,
    /// Difference restricted to pixels along the hole boundary
    BoundaryPixel,
    /// Combination of every score that is set
    Total,
}

/// A candidate copy from `source` into `target`
///
/// Each score is independently set or unset. The total score sums whichever
/// scores are present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchPair {
    source: Patch,
    target: Patch,
    total_absolute: Option<f32>,
    total_squared: Option<f32>,
    average_absolute: Option<f32>,
    average_squared: Option<f32>,
    boundary_pixel: Option<f32>,
}

impl PatchPair {
    /// Pair two patches with no scores set
    pub const fn new(source: Patch, target: Patch) -> Self {
        Self {
            source,
            target,
            total_absolute: None,
            total_squared: None,
            average_absolute: None,
            average_squared: None,
            boundary_pixel: None,
        }
    }

    /// Patch copied from
    pub const fn source(&self) -> &Patch {
        &self.source
    }

    /// Patch copied into
    pub const fn target(&self) -> &Patch {
        &self.target
    }

    /// Vector from the target's origin to the source's origin
    pub const fn target_to_source_offset(&self) -> [isize; 2] {
        let s = self.source.region().origin;
        let t = self.target.region().origin;
        [s[0] as isize - t[0] as isize, s[1] as isize - t[1] as isize]
    }

    /// Set the sum of absolute differences
    pub const fn set_total_absolute_difference(&mut self, value: f32) {
        self.total_absolute = Some(value);
    }

    /// Set the sum of squared differences
    pub const fn set_total_squared_difference(&mut self, value: f32) {
        self.total_squared = Some(value);
    }

    /// Set the mean absolute difference
    pub const fn set_average_absolute_difference(&mut self, value: f32) {
        self.average_absolute = Some(value);
    }

    /// Set the mean squared difference
    pub const fn set_average_squared_difference(&mut self, value: f32) {
        self.average_squared = Some(value);
    }

    /// Set the boundary-restricted difference
    pub const fn set_boundary_pixel_difference(&mut self, value: f32) {
        self.boundary_pixel = Some(value);
    }

    /// Read one score slot; `Total` is present when any score is
    pub fn score(&self, score: PairScore) -> Option<f32> {
        match score {
            PairScore::TotalAbsolute => self.total_absolute,
            PairScore::TotalSquared => self.total_squared,
            PairScore::AverageAbsolute => self.average_absolute,
            PairScore::AverageSquared => self.average_squared,
            PairScore::BoundaryPixel => self.boundary_pixel,
            PairScore::Total => self.total_score(),
        }
    }

    /// Sum of every score that is set, `None` if none is
    pub fn total_score(&self) -> Option<f32> {
        [
            self.total_absolute,
            self.total_squared,
            self.average_absolute,
            self.average_squared,
            self.boundary_pixel,
        ]
        .into_iter()
        .flatten()
        .reduce(|a, b| a + b)
    }
}

/// Sort pairs ascending by one score; pairs missing it sort last
pub fn sort_pairs_by(pairs: &mut [PatchPair], score: PairScore) {
    pairs.sort_by(|a, b| match (a.score(score), b.score(score)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
