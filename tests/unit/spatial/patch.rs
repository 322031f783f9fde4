//! Tests for region arithmetic and bounded patch construction

#[cfg(test)]
mod tests {
    use patchfill::InpaintError;
    use patchfill::spatial::patch::{Patch, Region};

    // Tests centered region placement and side length
    // Verified by dropping the half-width subtraction from the origin
    #[test]
    fn test_region_centered() {
        let region = Region::centered([5, 6], 2).expect("center is far enough from the origin");
        assert_eq!(region.origin, [3, 4]);
        assert_eq!(region.rows, 5);
        assert_eq!(region.cols, 5);
        assert_eq!(region.area(), 25);
        assert_eq!(region.end(), [8, 9]);
    }

    // Tests centered regions that would start at a negative coordinate
    // Verified by removing the underflow guard
    #[test]
    fn test_region_centered_underflow() {
        assert!(Region::centered([1, 5], 2).is_none());
        assert!(Region::centered([5, 0], 1).is_none());
        assert!(Region::centered([0, 0], 0).is_some());
    }

    // Tests containment uses an exclusive end
    // Verified by changing the end comparison to inclusive
    #[test]
    fn test_region_contains() {
        let region = Region::new([2, 3], 2, 4);
        assert!(region.contains([2, 3]));
        assert!(region.contains([3, 6]));
        assert!(!region.contains([4, 3]));
        assert!(!region.contains([2, 7]));
        assert!(!region.contains([1, 3]));
    }

    // Tests overlap detection including touching edges and empty regions
    // Verified by dropping the empty-region check
    #[test]
    fn test_region_intersects() {
        let a = Region::new([0, 0], 3, 3);
        let b = Region::new([2, 2], 3, 3);
        let touching = Region::new([3, 0], 2, 3);
        let empty = Region::new([1, 1], 0, 5);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&touching));
        assert!(!a.intersects(&empty));
    }

    // Tests expansion is clamped to the bounds on every side
    // Verified by removing the clamp to the bounds end
    #[test]
    fn test_region_expand_clamped() {
        let bounds = Region::whole(10, 8);
        let grown = Region::new([1, 6], 2, 2).expand(3, &bounds);
        assert_eq!(grown.origin, [0, 3]);
        assert_eq!(grown.end(), [6, 8]);
        assert!(grown.is_inside(&bounds));
    }

    // Tests vertices are produced in row-major order
    // Verified by swapping the row and column loops
    #[test]
    fn test_region_vertices_row_major() {
        let vertices: Vec<_> = Region::new([1, 1], 2, 2).vertices().collect();
        assert_eq!(vertices, vec![[1, 1], [1, 2], [2, 1], [2, 2]]);
    }

    // Tests patch construction inside and at the edge of the grid
    // Verified by using an inclusive end in the bounds check
    #[test]
    fn test_patch_new_in_bounds() {
        let bounds = Region::whole(10, 10);
        let patch = Patch::new([7, 2], 2, &bounds).expect("patch fits the grid");
        assert_eq!(patch.center(), [7, 2]);
        assert_eq!(patch.half_width(), 2);
        assert_eq!(patch.side(), 5);
        assert_eq!(patch.region().origin, [5, 0]);
        assert_eq!(patch.vertices().count(), 25);

        assert!(Patch::new([8, 5], 2, &bounds).is_err());
    }

    // Tests out-of-bounds construction reports the requested patch
    // Verified by returning the clamped center instead of the requested one
    #[test]
    fn test_patch_new_out_of_bounds() {
        let bounds = Region::whole(6, 6);
        match Patch::new([0, 3], 1, &bounds) {
            Err(InpaintError::OutOfBounds {
                center,
                half_width,
                bounds,
            }) => {
                assert_eq!(center, [0, 3]);
                assert_eq!(half_width, 1);
                assert_eq!(bounds, (6, 6));
            }
            other => unreachable!("expected OutOfBounds, got {other:?}"),
        }
    }

    // Tests patches near the edge are shifted inward but still cover the vertex
    // Verified by clamping against the far edge only
    #[test]
    fn test_patch_covering() {
        let bounds = Region::whole(6, 8);

        let inner = Patch::covering([3, 4], 1, &bounds).expect("fits");
        assert_eq!(inner.center(), [3, 4]);

        let corner = Patch::covering([0, 0], 2, &bounds).expect("fits");
        assert_eq!(corner.center(), [2, 2]);
        assert!(corner.contains([0, 0]));

        let far = Patch::covering([5, 7], 1, &bounds).expect("fits");
        assert_eq!(far.center(), [4, 6]);
        assert!(far.contains([5, 7]));
    }

    // Tests covering fails when the vertex or the patch cannot fit
    // Verified by clamping vertices that lie outside the bounds
    #[test]
    fn test_patch_covering_out_of_bounds() {
        let bounds = Region::whole(4, 8);
        assert!(matches!(
            Patch::covering([1, 1], 2, &bounds),
            Err(InpaintError::OutOfBounds { half_width: 2, .. })
        ));
        assert!(Patch::covering([4, 0], 1, &bounds).is_err());
    }

    // Tests translation between patches keeps the relative position
    // Verified by translating relative to the centers with a sign error
    #[test]
    fn test_patch_translate_to() {
        let bounds = Region::whole(20, 20);
        let target = Patch::new([5, 5], 1, &bounds).expect("valid patch");
        let source = Patch::new([12, 3], 1, &bounds).expect("valid patch");

        assert_eq!(target.translate_to([4, 4], &source), [11, 2]);
        assert_eq!(target.translate_to([6, 5], &source), [13, 3]);
        assert_eq!(source.translate_to([12, 3], &target), [5, 5]);
    }

    // Tests patch ordering follows the row-major location
    // Verified by ordering regions by size before origin
    #[test]
    fn test_patch_ordering() {
        let bounds = Region::whole(10, 10);
        let a = Patch::new([2, 5], 1, &bounds).expect("valid patch");
        let b = Patch::new([3, 1], 1, &bounds).expect("valid patch");
        let c = Patch::new([3, 2], 1, &bounds).expect("valid patch");
        assert!(a < b);
        assert!(b < c);
        assert!(b.intersects(&c));
        assert!(!a.intersects(&Patch::new([7, 7], 1, &bounds).expect("valid patch")));
    }
}
