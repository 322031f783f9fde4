//! Tests for source patch discovery and incremental growth

#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use patchfill::spatial::grid::Mask;
    use patchfill::spatial::patch::{Patch, Region};
    use patchfill::spatial::sources::SourcePatchCollection;

    fn hole_mask(rows: usize, cols: usize, hole: Region) -> Mask {
        Mask::from_holes(&Array2::from_shape_fn((rows, cols), |(r, c)| {
            hole.contains([r, c])
        }))
    }

    // Tests an all-valid grid yields every in-bounds patch
    // Verified by including centers whose patch leaves the grid
    #[test]
    fn test_from_mask_without_holes() {
        let mask = Mask::new(6, 5);
        let sources = SourcePatchCollection::from_mask(&mask, 1);
        assert_eq!(sources.len(), 4 * 3);
        assert_eq!(sources.half_width(), 1);
    }

    // Tests patches touching a hole are excluded
    // Verified by skipping the region validity filter
    #[test]
    fn test_from_mask_excludes_holes() {
        let mask = hole_mask(7, 7, Region::new([3, 3], 1, 1));
        let sources = SourcePatchCollection::from_mask(&mask, 1);
        // 25 in-bounds centers minus the 9 whose patch covers [3, 3]
        assert_eq!(sources.len(), 16);
        assert!(sources.iter().all(|p| !p.contains([3, 3])));
    }

    // Tests a grid too small for any patch yields nothing
    // Verified by clamping patches into the grid instead of skipping them
    #[test]
    fn test_from_mask_too_small() {
        let mask = Mask::new(4, 4);
        assert!(SourcePatchCollection::from_mask(&mask, 2).is_empty());
    }

    // Tests iteration follows row-major patch location
    // Verified by storing patches in a hash set
    #[test]
    fn test_iteration_order() {
        let mask = Mask::new(5, 5);
        let sources = SourcePatchCollection::from_mask(&mask, 1);
        let centers: Vec<_> = sources.iter().map(Patch::center).collect();
        let mut sorted = centers.clone();
        sorted.sort_unstable();
        assert_eq!(centers, sorted);
        assert_eq!(centers.first(), Some(&[1, 1]));
    }

    // Tests adding patches deduplicates and reports only new ones
    // Verified by returning the input length from add_patches
    #[test]
    fn test_add_patches_dedup() {
        let mask = Mask::new(5, 5);
        let mut sources = SourcePatchCollection::new(1);
        let found = sources.find_source_patches_in_region(&Region::new([1, 1], 1, 2), &mask);
        assert_eq!(sources.add_patches(found.clone()), 2);
        assert_eq!(sources.add_patches(found), 0);
        assert_eq!(sources.len(), 2);
    }

    // Tests filling a hole discovers exactly the newly valid patches
    // Verified by not expanding the search region by the half-width
    #[test]
    fn test_discover_after_fill() {
        let hole = Region::new([3, 3], 2, 2);
        let mut mask = hole_mask(9, 9, hole);
        let mut sources = SourcePatchCollection::from_mask(&mask, 1);
        let before = sources.len();

        mask.fill_region(&hole);
        let added = sources.discover_after_fill(&hole, &mask);

        let rebuilt = SourcePatchCollection::from_mask(&mask, 1);
        assert_eq!(before + added, rebuilt.len());
        assert_eq!(sources.len(), rebuilt.len());
        assert!(rebuilt.iter().all(|p| sources.contains(p)));
    }

    // Tests a partial fill adds nothing that still touches a hole
    // Verified by skipping the mask check during discovery
    #[test]
    fn test_discover_after_partial_fill() {
        let mut mask = hole_mask(9, 9, Region::new([3, 3], 3, 3));
        let mut sources = SourcePatchCollection::from_mask(&mask, 1);
        let filled = Region::new([3, 3], 1, 3);
        mask.fill_region(&filled);
        sources.discover_after_fill(&filled, &mask);

        assert!(sources.iter().all(|p| mask.is_region_valid(p.region())));
    }
}
