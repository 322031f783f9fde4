//! Per-channel weights for the difference metric
//!
//! Auxiliary channels such as depth derivatives can span a far wider numeric
//! range than 8-bit color. Scaling such a channel by `255 / max(|min|, |max|)`
//! brings it onto the color range so it neither dominates nor vanishes.

use crate::spatial::grid::ImageGrid;

/// Full 8-bit range that rescaled channels are mapped onto
pub const COLOR_RANGE: f32 = 255.0;

/// Largest absolute value of one channel across the whole image
pub fn channel_extent(image: &ImageGrid, channel: usize) -> f32 {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for row in 0..image.rows() {
        for col in 0..image.cols() {
            if let Some(value) = image.value([row, col], channel) {
                min = min.min(value);
                max = max.max(value);
            }
        }
    }
    if min.is_finite() && max.is_finite() {
        min.abs().max(max.abs())
    } else {
        0.0
    }
}

/// Weight that maps a channel onto the color range
///
/// Channels that are constantly zero keep a weight of 1.
pub fn range_weight(image: &ImageGrid, channel: usize) -> f32 {
    let extent = channel_extent(image, channel);
    if extent > f32::EPSILON {
        COLOR_RANGE / extent
    } else {
        1.0
    }
}

/// Weights for every channel: 1 for color channels, range-scaled for the
/// listed auxiliary channels
pub fn channel_weights(image: &ImageGrid, auxiliary_channels: &[usize]) -> Vec<f32> {
    (0..image.channels())
        .map(|channel| {
            if auxiliary_channels.contains(&channel) {
                range_weight(image, channel)
            } else {
                1.0
            }
        })
        .collect()
}
