//! Masked finite differences for the structure signal
//!
//! Derivatives are taken only between valid pixels: a central difference when
//! both neighbors along the axis are valid, a one-sided difference when only
//! one is, and zero otherwise. Hole pixels get a zero derivative.

use ndarray::Array2;

use crate::spatial::grid::{ImageGrid, Mask, StructureField};
use crate::spatial::patch::Vertex;

/// Derivative axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Along rows (vertical derivative)
    Row,
    /// Along columns (horizontal derivative)
    Col,
}

/// Mean of all channels at each pixel
pub fn luminance(image: &ImageGrid) -> Array2<f32> {
    let channels = image.channels().max(1) as f32;
    Array2::from_shape_fn((image.rows(), image.cols()), |(row, col)| {
        image
            .pixel([row, col])
            .map_or(0.0, |pixel| pixel.sum() / channels)
    })
}

/// Derivative of a scalar field along one axis using only valid pixels
pub fn masked_derivative(field: &Array2<f32>, mask: &Mask, axis: Axis) -> Array2<f32> {
    let (rows, cols) = field.dim();
    let value = |vertex: Vertex| field.get(vertex).copied().unwrap_or(0.0);

    Array2::from_shape_fn((rows, cols), |(row, col)| {
        let here = [row, col];
        if mask.is_hole(here) {
            return 0.0;
        }

        let (backward, forward) = match axis {
            Axis::Row => (
                row.checked_sub(1).map(|r| [r, col]),
                (row + 1 < rows).then_some([row + 1, col]),
            ),
            Axis::Col => (
                col.checked_sub(1).map(|c| [row, c]),
                (col + 1 < cols).then_some([row, col + 1]),
            ),
        };
        let backward = backward.filter(|&v| mask.is_valid(v));
        let forward = forward.filter(|&v| mask.is_valid(v));

        match (backward, forward) {
            (Some(b), Some(f)) => (value(f) - value(b)) / 2.0,
            (Some(b), None) => value(here) - value(b),
            (None, Some(f)) => value(f) - value(here),
            (None, None) => 0.0,
        }
    })
}

/// Gradient magnitude of the image luminance, zero inside the hole
pub fn gradient_magnitude(image: &ImageGrid, mask: &Mask) -> StructureField {
    let lum = luminance(image);
    let d_row = masked_derivative(&lum, mask, Axis::Row);
    let d_col = masked_derivative(&lum, mask, Axis::Col);
    ndarray::Zip::from(&d_row)
        .and(&d_col)
        .map_collect(|&dr, &dc| dr.hypot(dc))
}
