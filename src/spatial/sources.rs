//! Monotonically growing collection of fully valid source patches

use std::collections::BTreeSet;

use crate::spatial::grid::Mask;
use crate::spatial::patch::{Patch, Region};

/// Deduplicated, ordered set of patches that contain no hole pixel
///
/// Iteration order is row-major by patch location, which fixes the scan
/// order of every search. Patches are only ever added.
#[derive(Debug, Clone, Default)]
pub struct SourcePatchCollection {
    patches: BTreeSet<Patch>,
    half_width: usize,
}

impl SourcePatchCollection {
    /// Create an empty collection for patches of the given half-width
    pub const fn new(half_width: usize) -> Self {
        Self {
            patches: BTreeSet::new(),
            half_width,
        }
    }

    /// Build the initial collection by scanning the whole mask
    pub fn from_mask(mask: &Mask, half_width: usize) -> Self {
        let mut collection = Self::new(half_width);
        let found = collection.find_source_patches_in_region(&mask.bounds(), mask);
        collection.add_patches(found);
        collection
    }

    /// Half-width shared by every patch in the collection
    pub const fn half_width(&self) -> usize {
        self.half_width
    }

    /// Find every fully valid patch whose center lies in `region`
    ///
    /// The region is clamped to the grid; centers whose patch would leave the
    /// grid are skipped.
    pub fn find_source_patches_in_region(&self, region: &Region, mask: &Mask) -> BTreeSet<Patch> {
        let bounds = mask.bounds();
        let search = region.expand(0, &bounds);

        search
            .vertices()
            .filter_map(|center| Patch::new(center, self.half_width, &bounds).ok())
            .filter(|patch| mask.is_region_valid(patch.region()))
            .collect()
    }

    /// Union new patches into the collection, returning how many were new
    pub fn add_patches(&mut self, patches: BTreeSet<Patch>) -> usize {
        let before = self.patches.len();
        self.patches.extend(patches);
        self.patches.len() - before
    }

    /// Discover patches made fully valid by filling `filled` and add them
    ///
    /// Any newly valid patch overlaps the filled region, so only centers
    /// within one half-width of it are examined.
    pub fn discover_after_fill(&mut self, filled: &Region, mask: &Mask) -> usize {
        let search = filled.expand(self.half_width, &mask.bounds());
        let found = self.find_source_patches_in_region(&search, mask);
        self.add_patches(found)
    }

    /// Check membership
    pub fn contains(&self, patch: &Patch) -> bool {
        self.patches.contains(patch)
    }

    /// Number of patches
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Check whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Iterate in scan order
    pub fn iter(&self) -> impl Iterator<Item = &Patch> {
        self.patches.iter()
    }
}
