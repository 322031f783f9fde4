//! Patch descriptors and the weighted patch difference metric

use bitvec::prelude::*;

use crate::analysis::pair::PatchPair;
use crate::io::error::{InpaintError, Result};
use crate::spatial::grid::{Connectivity, ImageGrid, Mask};
use crate::spatial::patch::Patch;

/// Lifecycle of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorStatus {
    /// Not yet computed
    Invalid,
    /// Computed for a fully valid source patch; stable for the whole run
    Source,
    /// Computed for a target patch; stale after the next fill
    Target,
}

/// Sampled pixel data of one patch
///
/// Values are stored row-major, channels innermost. Hole pixels of a target
/// patch are stored as zero and flagged invalid.
#[derive(Debug, Clone)]
pub struct PatchDescriptor {
    patch: Patch,
    channels: usize,
    values: Vec<f32>,
    valid: BitVec,
    boundary: BitVec,
    status: DescriptorStatus,
}

impl PatchDescriptor {
    /// Placeholder descriptor that has not been computed
    pub fn invalid(patch: Patch) -> Self {
        Self {
            patch,
            channels: 0,
            values: Vec::new(),
            valid: BitVec::new(),
            boundary: BitVec::new(),
            status: DescriptorStatus::Invalid,
        }
    }

    /// Describe a source patch, which must not touch any hole
    ///
    /// # Errors
    ///
    /// Returns `IncompletePatch` if any pixel of the patch is a hole
    pub fn source(image: &ImageGrid, mask: &Mask, patch: Patch) -> Result<Self> {
        if let Some(hole) = mask.first_hole_in(patch.region()) {
            return Err(InpaintError::IncompletePatch {
                center: patch.center(),
                half_width: patch.half_width(),
                hole,
            });
        }
        let mut descriptor = Self::sample(image, mask, patch);
        descriptor.status = DescriptorStatus::Source;
        Ok(descriptor)
    }

    /// Describe a target patch, recording which pixels hold valid data
    pub fn target(image: &ImageGrid, mask: &Mask, patch: Patch) -> Self {
        let mut descriptor = Self::sample(image, mask, patch);
        descriptor.status = DescriptorStatus::Target;
        descriptor
    }

    fn sample(image: &ImageGrid, mask: &Mask, patch: Patch) -> Self {
        let channels = image.channels();
        let area = patch.region().area();
        let bounds = mask.bounds();

        let mut values = Vec::with_capacity(area * channels);
        let mut valid = BitVec::with_capacity(area);
        let mut boundary = BitVec::with_capacity(area);

        for vertex in patch.vertices() {
            let is_valid = mask.is_valid(vertex);
            valid.push(is_valid);
            boundary.push(
                is_valid
                    && Connectivity::Eight
                        .neighbors(vertex, &bounds)
                        .any(|neighbor| mask.is_hole(neighbor)),
            );
            for channel in 0..channels {
                let value = if is_valid {
                    image.value(vertex, channel).unwrap_or(0.0)
                } else {
                    0.0
                };
                values.push(value);
            }
        }

        Self {
            patch,
            channels,
            values,
            valid,
            boundary,
            status: DescriptorStatus::Invalid,
        }
    }

    /// Described patch
    pub const fn patch(&self) -> &Patch {
        &self.patch
    }

    /// Channels per pixel
    pub const fn channels(&self) -> usize {
        self.channels
    }

    /// Current status
    pub const fn status(&self) -> DescriptorStatus {
        self.status
    }

    /// Whether the descriptor has been computed
    pub fn is_valid(&self) -> bool {
        self.status != DescriptorStatus::Invalid
    }

    /// Number of pixels holding valid data
    pub fn valid_pixel_count(&self) -> usize {
        self.valid.count_ones()
    }

    /// Channel values of the pixel at `index` in row-major patch order
    pub fn pixel(&self, index: usize) -> Option<&[f32]> {
        self.values
            .get(index * self.channels..(index + 1) * self.channels)
    }

    fn is_compared(&self, index: usize, scope: MetricScope) -> bool {
        let flags = match scope {
            MetricScope::Valid => &self.valid,
            MetricScope::Boundary => &self.boundary,
        };
        flags.get(index).as_deref().copied().unwrap_or(false)
    }
}

/// Per-channel difference function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelDifference {
    /// Weighted absolute difference
    #[default]
    Absolute,
    /// Weighted squared difference
    Squared,
}

/// How the summed difference is normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// Plain sum over compared pixels
    #[default]
    Total,
    /// Sum divided by the number of compared pixels
    Average,
}

/// Which target pixels take part in the comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricScope {
    /// Every valid target pixel
    #[default]
    Valid,
    /// Only valid target pixels that touch a hole
    Boundary,
}

/// Weighted distance between a target and a source descriptor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DifferenceMetric {
    /// Per-channel difference function
    pub difference: PixelDifference,
    /// Sum or average
    pub normalization: Normalization,
    /// Pixels compared
    pub scope: MetricScope,
    /// One weight per channel; missing entries default to 1
    pub weights: Vec<f32>,
}

impl DifferenceMetric {
    /// Sum of absolute differences over valid target pixels
    pub fn sum_absolute() -> Self {
        Self::default()
    }

    /// Sum of squared differences over valid target pixels
    pub fn sum_squared() -> Self {
        Self {
            difference: PixelDifference::Squared,
            ..Self::default()
        }
    }

    /// Replace the per-channel weights
    #[must_use]
    pub fn with_weights(mut self, weights: Vec<f32>) -> Self {
        self.weights = weights;
        self
    }

    /// Switch to the averaged variant
    #[must_use]
    pub fn averaged(mut self) -> Self {
        self.normalization = Normalization::Average;
        self
    }

    /// Restrict comparison to the hole boundary
    #[must_use]
    pub fn boundary_only(mut self) -> Self {
        self.scope = MetricScope::Boundary;
        self
    }

    /// Check that two descriptors can be compared
    ///
    /// # Errors
    ///
    /// Returns `SizeMismatch` if patch sides or channel counts differ
    pub fn check_compatible(target: &PatchDescriptor, source: &PatchDescriptor) -> Result<()> {
        if target.patch.side() != source.patch.side() {
            return Err(InpaintError::SizeMismatch {
                source: source.patch.side(),
                target: target.patch.side(),
            });
        }
        if target.channels != source.channels {
            return Err(InpaintError::SizeMismatch {
                source: source.channels,
                target: target.channels,
            });
        }
        Ok(())
    }

    /// Distance from `target` to `source`; lower is more similar
    ///
    /// Only pixels selected by the scope in the target are compared. With no
    /// compared pixels the distance is zero.
    pub fn distance(&self, target: &PatchDescriptor, source: &PatchDescriptor) -> f32 {
        let channels = target.channels.min(source.channels);
        let area = target.patch.region().area();
        let mut total = 0.0_f32;
        let mut compared = 0_usize;

        for index in 0..area {
            if !target.is_compared(index, self.scope) {
                continue;
            }
            let (Some(a), Some(b)) = (target.pixel(index), source.pixel(index)) else {
                continue;
            };
            compared += 1;
            for channel in 0..channels {
                let weight = self.weights.get(channel).copied().unwrap_or(1.0);
                let diff = a.get(channel).copied().unwrap_or(0.0)
                    - b.get(channel).copied().unwrap_or(0.0);
                total += match self.difference {
                    PixelDifference::Absolute => weight * diff.abs(),
                    PixelDifference::Squared => weight * diff * diff,
                };
            }
        }

        match self.normalization {
            Normalization::Total => total,
            Normalization::Average if compared > 0 => total / compared as f32,
            Normalization::Average => 0.0,
        }
    }

    /// Record `distance` in the score slot of `pair` that matches this metric
    pub fn record(&self, pair: &mut PatchPair, distance: f32) {
        match (self.scope, self.difference, self.normalization) {
            (MetricScope::Boundary, _, _) => pair.set_boundary_pixel_difference(distance),
            (MetricScope::Valid, PixelDifference::Absolute, Normalization::Total) => {
                pair.set_total_absolute_difference(distance);
            }
            (MetricScope::Valid, PixelDifference::Squared, Normalization::Total) => {
                pair.set_total_squared_difference(distance);
            }
            (MetricScope::Valid, PixelDifference::Absolute, Normalization::Average) => {
                pair.set_average_absolute_difference(distance);
            }
            (MetricScope::Valid, PixelDifference::Squared, Normalization::Average) => {
                pair.set_average_squared_difference(distance);
            }
        }
    }
}
