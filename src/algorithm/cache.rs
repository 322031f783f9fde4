use rayon::prelude::*;
use std::collections::HashMap;

use crate::analysis::descriptor::PatchDescriptor;
use crate::io::error::Result;
use crate::spatial::grid::{ImageGrid, Mask};
use crate::spatial::patch::Patch;

/// Memoization cache for source patch descriptors
///
/// Source patches never change once valid, so each descriptor is computed
/// on first visit and reused for the rest of the run. Target descriptors are
/// never cached.
///
/// Entries are never evicted. Each holds `side * side * channels` pixel
/// values plus two bits per pixel, so a run over an image with `n` source
/// patches keeps roughly `4 * n * side^2 * channels` bytes alive.
#[derive(Default)]
pub struct DescriptorCache {
    /// Patch to descriptor mapping
    descriptors: HashMap<Patch, PatchDescriptor>,

    /// Cache performance statistics
    pub stats: CacheStats,
}

/// Performance metrics for cache effectiveness
#[derive(Default, Debug)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
}

impl DescriptorCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve a cached descriptor or compute and store a new one
    ///
    /// Uses the provided closure to compute the descriptor only when the
    /// patch has not been visited yet.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `compute_fn`
    pub fn get_or_compute<F>(&mut self, patch: Patch, compute_fn: F) -> Result<&PatchDescriptor>
    where
        F: FnOnce() -> Result<PatchDescriptor>,
    {
        use std::collections::hash_map::Entry;

        match self.descriptors.entry(patch) {
            Entry::Occupied(entry) => {
                self.stats.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                self.stats.misses += 1;
                Ok(entry.insert(compute_fn()?))
            }
        }
    }

    /// Compute source descriptors for every patch not yet cached
    ///
    /// Misses are computed in parallel when `parallel` is set; the mask and
    /// image are only read.
    ///
    /// # Errors
    ///
    /// Returns `IncompletePatch` if any of the patches touches a hole
    pub fn ensure_sources<'a, I>(
        &mut self,
        patches: I,
        image: &ImageGrid,
        mask: &Mask,
        parallel: bool,
    ) -> Result<()>
    where
        I: IntoIterator<Item = &'a Patch>,
    {
        let mut missing = Vec::new();
        for patch in patches {
            if self.descriptors.contains_key(patch) {
                self.stats.hits += 1;
            } else {
                missing.push(*patch);
            }
        }
        self.stats.misses += missing.len();

        let computed: Vec<PatchDescriptor> = if parallel {
            missing
                .into_par_iter()
                .map(|patch| PatchDescriptor::source(image, mask, patch))
                .collect::<Result<_>>()?
        } else {
            missing
                .into_iter()
                .map(|patch| PatchDescriptor::source(image, mask, patch))
                .collect::<Result<_>>()?
        };

        for descriptor in computed {
            self.descriptors.insert(*descriptor.patch(), descriptor);
        }
        Ok(())
    }

    /// Look up a cached descriptor
    pub fn get(&self, patch: &Patch) -> Option<&PatchDescriptor> {
        self.descriptors.get(patch)
    }

    /// Pixel values held across all entries
    pub fn stored_values(&self) -> usize {
        self.descriptors
            .values()
            .map(|d| d.patch().side().pow(2) * d.channels())
            .sum()
    }

    /// Number of cached descriptors
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
