//! Tests for image grids, masks and boundary detection

#[cfg(test)]
mod tests {
    use ndarray::{Array2, Array3};
    use patchfill::InpaintError;
    use patchfill::spatial::grid::{Connectivity, ImageGrid, Mask};
    use patchfill::spatial::patch::Region;

    fn square_hole_mask(size: usize, start: usize, end: usize) -> Mask {
        let holes = Array2::from_shape_fn((size, size), |(r, c)| {
            (start..=end).contains(&r) && (start..=end).contains(&c)
        });
        Mask::from_holes(&holes)
    }

    // Tests neighbor enumeration is clipped at the grid edge
    // Verified by returning unclipped offsets
    #[test]
    fn test_connectivity_neighbors() {
        let bounds = Region::whole(4, 4);
        assert_eq!(Connectivity::Four.neighbors([0, 0], &bounds).count(), 2);
        assert_eq!(Connectivity::Eight.neighbors([0, 0], &bounds).count(), 3);
        assert_eq!(Connectivity::Eight.neighbors([2, 2], &bounds).count(), 8);
        assert_eq!(Connectivity::Four.neighbors([3, 2], &bounds).count(), 3);
    }

    // Tests filled image construction and pixel access
    // Verified by ignoring the channel index in from_shape_fn
    #[test]
    fn test_image_filled() {
        let image = ImageGrid::filled(3, 4, &[10.0, 20.0, 30.0]).expect("non-empty value");
        assert_eq!(image.rows(), 3);
        assert_eq!(image.cols(), 4);
        assert_eq!(image.channels(), 3);
        assert_eq!(image.value([2, 3], 1), Some(20.0));
        assert!(image.pixel([3, 0]).is_none());

        assert!(ImageGrid::filled(2, 2, &[]).is_err());
    }

    // Tests pixel writes check size and bounds
    // Verified by removing the channel count check
    #[test]
    fn test_image_set_pixel() {
        let mut image = ImageGrid::new(2, 2, 2);
        image.set_pixel([1, 0], &[4.0, 5.0]).expect("valid write");
        assert_eq!(image.value([1, 0], 0), Some(4.0));
        assert_eq!(image.value([1, 0], 1), Some(5.0));

        assert!(matches!(
            image.set_pixel([0, 0], &[1.0]),
            Err(InpaintError::SizeMismatch { .. })
        ));
        assert!(image.set_pixel([2, 0], &[1.0, 1.0]).is_err());
    }

    // Tests copying a pixel moves every channel
    // Verified by copying only the first channel
    #[test]
    fn test_image_copy_pixel() {
        let mut image = ImageGrid::new(2, 2, 3);
        image.set_pixel([0, 0], &[1.0, 2.0, 3.0]).expect("valid write");
        image.copy_pixel([0, 0], [1, 1]);
        let copied: Vec<f32> = image.pixel([1, 1]).expect("in bounds").to_vec();
        assert_eq!(copied, vec![1.0, 2.0, 3.0]);
    }

    // Tests channel stacking and selection
    // Verified by concatenating along the column axis
    #[test]
    fn test_image_stack_and_select() {
        let color = ImageGrid::filled(3, 3, &[1.0, 2.0, 3.0]).expect("valid image");
        let depth = ImageGrid::filled(3, 3, &[9.0]).expect("valid image");
        let stacked = ImageGrid::stack(&[&color, &depth]).expect("co-registered images");

        assert_eq!(stacked.channels(), 4);
        assert_eq!(stacked.value([1, 1], 3), Some(9.0));

        let back = stacked.select_channels(0..3).expect("valid range");
        assert_eq!(back, color);
        assert!(stacked.select_channels(2..5).is_err());
    }

    // Tests pixel views and channel selection on a non-square image
    // Verified by swapping the row and column axes in pixel
    #[test]
    fn test_image_views_follow_axes() {
        let image = ImageGrid::from_array(Array3::from_shape_fn((2, 3, 4), |(r, c, ch)| {
            (100 * r + 10 * c + ch) as f32
        }));

        let pixel: Vec<f32> = image.pixel([1, 2]).expect("in bounds").to_vec();
        assert_eq!(pixel, vec![120.0, 121.0, 122.0, 123.0]);
        assert!(image.pixel([2, 1]).is_none());

        let middle = image.select_channels(1..3).expect("valid range");
        assert_eq!(middle.channels(), 2);
        assert_eq!(middle.value([1, 2], 0), Some(121.0));
        assert_eq!(middle.value([0, 1], 1), Some(12.0));
    }

    // Tests stacking images of different sizes fails
    // Verified by removing the co-registration check
    #[test]
    fn test_image_stack_size_mismatch() {
        let a = ImageGrid::new(3, 3, 1);
        let b = ImageGrid::new(3, 4, 1);
        assert!(matches!(
            ImageGrid::stack(&[&a, &b]),
            Err(InpaintError::SizeMismatch { .. })
        ));
        assert!(ImageGrid::stack(&[]).is_err());
    }

    // Tests hole bookkeeping and counts
    // Verified by not decrementing the hole count in set_valid
    #[test]
    fn test_mask_hole_counts() {
        let mut mask = Mask::new(4, 5);
        assert_eq!(mask.hole_count(), 0);
        assert_eq!(mask.valid_count(), 20);

        mask.set_hole([1, 2]);
        mask.set_hole([1, 2]);
        mask.set_hole([3, 4]);
        assert_eq!(mask.hole_count(), 2);
        assert!(mask.is_hole([1, 2]));
        assert!(!mask.is_valid([1, 2]));

        assert!(mask.set_valid([1, 2]));
        assert!(!mask.set_valid([1, 2]));
        assert_eq!(mask.hole_count(), 1);
        assert_eq!(mask.holes(), vec![[3, 4]]);
    }

    // Tests out-of-bounds vertices are neither holes nor valid
    // Verified by treating out-of-bounds vertices as valid
    #[test]
    fn test_mask_out_of_bounds() {
        let mask = Mask::new(3, 3);
        assert!(!mask.is_hole([3, 0]));
        assert!(!mask.is_valid([0, 3]));
    }

    // Tests filling a region returns only vertices that changed
    // Verified by returning every vertex of the region
    #[test]
    fn test_mask_fill_region() {
        let mut mask = square_hole_mask(6, 2, 3);
        let filled = mask.fill_region(&Region::new([1, 1], 3, 3));
        assert_eq!(filled, vec![[2, 2], [2, 3], [3, 2], [3, 3]]);
        assert_eq!(mask.hole_count(), 0);
    }

    // Tests region validity requires bounds and no holes
    // Verified by skipping the bounds check
    #[test]
    fn test_mask_region_validity() {
        let mask = square_hole_mask(8, 3, 4);
        assert!(mask.is_region_valid(&Region::new([0, 0], 3, 3)));
        assert!(!mask.is_region_valid(&Region::new([2, 2], 3, 3)));
        assert!(!mask.is_region_valid(&Region::new([6, 6], 3, 3)));
        assert_eq!(mask.first_hole_in(&Region::new([2, 2], 3, 3)), Some([3, 3]));
    }

    // Tests boundary detection under both connectivities
    // Verified by treating every hole as a boundary vertex
    #[test]
    fn test_mask_boundary() {
        let mask = square_hole_mask(7, 1, 5);

        let eight = mask.find_boundary(Connectivity::Eight);
        assert_eq!(eight.len(), 16);
        assert!(!eight.contains(&[3, 3]));
        assert!(eight.contains(&[1, 1]));

        // Corners of the hole only touch valid pixels diagonally
        let four = mask.find_boundary(Connectivity::Four);
        assert_eq!(four.len(), 16);
        assert!(mask.is_boundary([1, 1], Connectivity::Four));
        assert!(!mask.is_boundary([2, 2], Connectivity::Four));
        assert!(!mask.is_boundary([0, 0], Connectivity::Eight));
    }

    // Tests diagonal-only contact differs between connectivities
    // Verified by using the four-neighbor offsets for both
    #[test]
    fn test_mask_boundary_diagonal_contact() {
        let mut holes = Array2::from_elem((3, 3), true);
        if let Some(corner) = holes.get_mut([0, 0]) {
            *corner = false;
        }
        let mask = Mask::from_holes(&holes);
        assert!(mask.is_boundary([1, 1], Connectivity::Eight));
        assert!(!mask.is_boundary([1, 1], Connectivity::Four));
    }

    // Tests mask and image dimension matching
    // Verified by comparing rows against columns
    #[test]
    fn test_mask_matches() {
        let mask = Mask::new(3, 5);
        assert!(mask.matches(&ImageGrid::new(3, 5, 1)));
        assert!(!mask.matches(&ImageGrid::new(5, 3, 1)));
    }
}
