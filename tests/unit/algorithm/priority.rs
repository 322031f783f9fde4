//! Tests for confidence, structure and random fill-order priorities

#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use patchfill::algorithm::priority::{
        Combination, PriorityPolicy, PriorityTerm, RandomPriority, WeightedPriority,
    };
    use patchfill::spatial::grid::Mask;
    use patchfill::spatial::patch::{Patch, Region};

    fn hole_mask(size: usize, hole: Region) -> Mask {
        Mask::from_holes(&Array2::from_shape_fn((size, size), |(r, c)| {
            hole.contains([r, c])
        }))
    }

    // Tests initial confidence is 1 on valid pixels and 0 in the hole
    // Verified by initializing every pixel to 1
    #[test]
    fn test_confidence_initialization() {
        let mask = hole_mask(5, Region::new([2, 2], 1, 1));
        let mut policy = WeightedPriority::confidence(1);
        policy.initialize(&mask);

        assert!((policy.pixel_confidence([0, 0]) - 1.0).abs() < f32::EPSILON);
        assert!(policy.pixel_confidence([2, 2]).abs() < f32::EPSILON);
    }

    // Tests confidence is the mean over the full patch area
    // Verified by dividing by the number of valid pixels instead
    #[test]
    fn test_confidence_term() {
        let mask = hole_mask(7, Region::new([2, 2], 3, 3));
        let mut policy = WeightedPriority::confidence(1);
        policy.initialize(&mask);

        // Corner of the hole: 5 of 9 neighbors are valid
        let corner = policy.priority([2, 2], &mask);
        // Edge of the hole: 3 of 9 neighbors are valid
        let edge = policy.priority([2, 3], &mask);

        assert!((corner - 5.0 / 9.0).abs() < 1e-5);
        assert!((edge - 3.0 / 9.0).abs() < 1e-5);
        assert!(corner > edge);
    }

    // Tests windows clipped by the grid edge count missing pixels as zero
    // Verified by dividing by the clipped window area
    #[test]
    fn test_confidence_at_grid_edge() {
        let mask = hole_mask(4, Region::new([0, 0], 1, 1));
        let mut policy = WeightedPriority::confidence(1);
        policy.initialize(&mask);

        // Only 4 window pixels exist, 3 of them valid
        assert!((policy.priority([0, 0], &mask) - 3.0 / 9.0).abs() < 1e-5);
    }

    // Tests filled pixels inherit the target confidence from before the fill
    // Verified by assigning filled pixels a confidence of 1
    #[test]
    fn test_update_inherits_confidence() {
        let hole = Region::new([2, 2], 3, 3);
        let mut mask = hole_mask(7, hole);
        let mut policy = WeightedPriority::confidence(1);
        policy.initialize(&mask);

        let target = Patch::new([2, 2], 1, &mask.bounds()).expect("fits");
        let filled = mask.fill_region(target.region());
        policy.update(&target, &filled, &mask);

        for vertex in &filled {
            assert!((policy.pixel_confidence(*vertex) - 5.0 / 9.0).abs() < 1e-5);
        }
        assert!(policy.pixel_confidence([4, 4]).abs() < f32::EPSILON);
    }

    // Tests the structure term favors vertices next to strong edges
    // Verified by ignoring the structure field
    #[test]
    fn test_structure_term() {
        let mask = hole_mask(7, Region::new([2, 2], 3, 3));
        let mut structure = Array2::zeros((7, 7));
        if let Some(s) = structure.get_mut([1, 4]) {
            *s = 8.0;
        }
        if let Some(s) = structure.get_mut([5, 5]) {
            *s = 2.0;
        }
        let mut policy = WeightedPriority::new(
            1,
            vec![(PriorityTerm::Structure, 1.0)],
            Combination::Sum,
        )
        .with_structure(structure);
        policy.initialize(&mask);

        assert!((policy.priority([2, 4], &mask) - 1.0).abs() < 1e-5);
        assert!((policy.priority([4, 4], &mask) - 0.25).abs() < 1e-5);
        assert!(policy.priority([4, 2], &mask).abs() < 1e-5);
    }

    // Tests the structure term ignores values under hole pixels
    // Verified by scanning hole pixels as well
    #[test]
    fn test_structure_ignores_holes() {
        let mask = hole_mask(5, Region::new([1, 1], 3, 3));
        let mut structure = Array2::zeros((5, 5));
        if let Some(s) = structure.get_mut([2, 2]) {
            *s = 9.0;
        }
        if let Some(s) = structure.get_mut([0, 0]) {
            *s = 3.0;
        }
        let mut policy = WeightedPriority::new(
            1,
            vec![(PriorityTerm::Structure, 1.0)],
            Combination::Sum,
        )
        .with_structure(structure);
        policy.initialize(&mask);

        assert!((policy.priority([1, 1], &mask) - 3.0 / 9.0).abs() < 1e-5);
    }

    // Tests weighted sums and products of the terms
    // Verified by applying weights as multipliers in the product
    #[test]
    fn test_combinations() {
        let mask = hole_mask(7, Region::new([2, 2], 3, 3));
        let mut structure = Array2::zeros((7, 7));
        if let Some(s) = structure.get_mut([1, 1]) {
            *s = 4.0;
        }
        let terms = vec![
            (PriorityTerm::Confidence, 2.0),
            (PriorityTerm::Structure, 1.0),
        ];

        let mut sum = WeightedPriority::new(1, terms.clone(), Combination::Sum)
            .with_structure(structure.clone());
        sum.initialize(&mask);
        let mut product =
            WeightedPriority::new(1, terms, Combination::Product).with_structure(structure);
        product.initialize(&mask);

        let confidence = 5.0_f32 / 9.0;
        assert!((sum.priority([2, 2], &mask) - (2.0 * confidence + 1.0)).abs() < 1e-5);
        assert!((product.priority([2, 2], &mask) - confidence * confidence).abs() < 1e-5);
    }

    // Tests the random policy is reproducible for a seed
    // Verified by seeding from entropy
    #[test]
    fn test_random_priority_seeded() {
        let mask = Mask::new(3, 3);
        let mut a = RandomPriority::new(7);
        let mut b = RandomPriority::new(7);
        let mut c = RandomPriority::new(8);

        let xs: Vec<f32> = (0..5).map(|_| a.priority([0, 0], &mask)).collect();
        let ys: Vec<f32> = (0..5).map(|_| b.priority([0, 0], &mask)).collect();
        let zs: Vec<f32> = (0..5).map(|_| c.priority([0, 0], &mask)).collect();

        assert_eq!(xs, ys);
        assert_ne!(xs, zs);
        assert!(xs.iter().all(|p| (0.0..1.0).contains(p)));
    }
}
