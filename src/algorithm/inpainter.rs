//! Patch copy into hole pixels, single layer or composite
//!
//! Inpainters only write image data. The driver updates the mask after a
//! successful copy, so every member of a composite sees the same hole set.

use crate::io::error::{InpaintError, Result, invalid_parameter};
use crate::spatial::grid::{ImageGrid, Mask};
use crate::spatial::patch::Patch;

/// Copies a source patch into the hole pixels of a target patch
pub trait InpaintPolicy {
    /// Check that the copy can be performed without writing anything
    ///
    /// # Errors
    ///
    /// Returns `SizeMismatch` when the patches differ in size,
    /// `IncompletePatch` when the source touches a hole and
    /// `InvalidParameter` when the layers do not fit the mask
    fn validate(
        &self,
        layers: &[ImageGrid],
        mask: &Mask,
        source: &Patch,
        target: &Patch,
    ) -> Result<()>;

    /// Copy without validation; returns the number of pixels written per layer
    fn copy(&self, layers: &mut [ImageGrid], mask: &Mask, source: &Patch, target: &Patch) -> usize;

    /// Validate then copy
    ///
    /// # Errors
    ///
    /// Propagates any validation failure; nothing is written in that case
    fn inpaint(
        &self,
        layers: &mut [ImageGrid],
        mask: &Mask,
        source: &Patch,
        target: &Patch,
    ) -> Result<usize> {
        self.validate(layers, mask, source, target)?;
        Ok(self.copy(layers, mask, source, target))
    }
}

/// Inpainter writing into a single image layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchInpainter {
    /// Index of the layer written by this inpainter
    pub layer: usize,
}

impl PatchInpainter {
    /// Create an inpainter for one layer
    pub const fn new(layer: usize) -> Self {
        Self { layer }
    }
}

impl InpaintPolicy for PatchInpainter {
    fn validate(
        &self,
        layers: &[ImageGrid],
        mask: &Mask,
        source: &Patch,
        target: &Patch,
    ) -> Result<()> {
        if source.side() != target.side() {
            return Err(InpaintError::SizeMismatch {
                source: source.side(),
                target: target.side(),
            });
        }

        let image = layers.get(self.layer).ok_or_else(|| {
            invalid_parameter("layer", &self.layer, &format!("only {} layers", layers.len()))
        })?;
        if !mask.matches(image) {
            return Err(invalid_parameter(
                "layer",
                &self.layer,
                &format!(
                    "image is {}x{} but mask is {}x{}",
                    image.rows(),
                    image.cols(),
                    mask.rows(),
                    mask.cols()
                ),
            ));
        }

        let bounds = mask.bounds();
        if !source.region().is_inside(&bounds) || !target.region().is_inside(&bounds) {
            let outside = if source.region().is_inside(&bounds) {
                target
            } else {
                source
            };
            return Err(InpaintError::OutOfBounds {
                center: outside.center(),
                half_width: outside.half_width(),
                bounds: (bounds.rows, bounds.cols),
            });
        }

        if let Some(hole) = mask.first_hole_in(source.region()) {
            return Err(InpaintError::IncompletePatch {
                center: source.center(),
                half_width: source.half_width(),
                hole,
            });
        }
        Ok(())
    }

    fn copy(&self, layers: &mut [ImageGrid], mask: &Mask, source: &Patch, target: &Patch) -> usize {
        let Some(image) = layers.get_mut(self.layer) else {
            return 0;
        };
        let mut written = 0;
        for vertex in target.vertices().filter(|&v| mask.is_hole(v)) {
            image.copy_pixel(target.translate_to(vertex, source), vertex);
            written += 1;
        }
        written
    }
}

/// Applies the same source/target pair to several co-registered layers
///
/// Every member is validated before any member copies, so a failure leaves
/// all layers untouched.
#[derive(Default)]
pub struct CompositeInpainter {
    members: Vec<Box<dyn InpaintPolicy>>,
}

impl CompositeInpainter {
    /// Create an empty composite
    pub fn new() -> Self {
        Self::default()
    }

    /// One `PatchInpainter` per layer in `0..layers`
    pub fn for_layers(layers: usize) -> Self {
        let mut composite = Self::new();
        for layer in 0..layers {
            composite.push(PatchInpainter::new(layer));
        }
        composite
    }

    /// Append a member; members copy in insertion order
    pub fn push<P: InpaintPolicy + 'static>(&mut self, member: P) {
        self.members.push(Box::new(member));
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check whether the composite has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl std::fmt::Debug for CompositeInpainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeInpainter")
            .field("members", &self.members.len())
            .finish()
    }
}

impl InpaintPolicy for CompositeInpainter {
    fn validate(
        &self,
        layers: &[ImageGrid],
        mask: &Mask,
        source: &Patch,
        target: &Patch,
    ) -> Result<()> {
        if self.members.is_empty() {
            return Err(invalid_parameter(
                "inpainters",
                &0,
                &"a composite needs at least one member",
            ));
        }
        self.members
            .iter()
            .try_for_each(|member| member.validate(layers, mask, source, target))
    }

    fn copy(&self, layers: &mut [ImageGrid], mask: &Mask, source: &Patch, target: &Patch) -> usize {
        self.members
            .iter()
            .map(|member| member.copy(layers, mask, source, target))
            .max()
            .unwrap_or(0)
    }
}
