//! PNG loading into image grids and masks, and export back to PNG

use crate::io::configuration::MASK_THRESHOLD;
use crate::io::error::{InpaintError, Result};
use crate::spatial::grid::{ImageGrid, Mask};
use image::{Rgb, RgbImage};
use ndarray::{Array2, Array3, ArrayView1};
use num_traits::ToPrimitive;
use std::path::Path;

/// Convert an RGB buffer to a 3-channel grid
pub fn grid_from_rgb(image: &RgbImage) -> ImageGrid {
    let (width, height) = image.dimensions();
    let data = Array3::from_shape_fn((height as usize, width as usize, 3), |(row, col, c)| {
        image
            .get_pixel_checked(col as u32, row as u32)
            .and_then(|p| p.0.get(c).copied())
            .map_or(0.0, f32::from)
    });
    ImageGrid::from_array(data)
}

/// Clamp a channel value into `0..=255`
pub fn to_byte(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0).to_u8().unwrap_or(0)
}

/// RGB bytes for a pixel; single-channel pixels become gray
pub fn pixel_to_rgb(pixel: ArrayView1<'_, f32>) -> [u8; 3] {
    match pixel.len() {
        0 => [0, 0, 0],
        1 | 2 => {
            let v = to_byte(pixel.get(0).copied().unwrap_or(0.0));
            [v, v, v]
        }
        _ => [0, 1, 2].map(|c| to_byte(pixel.get(c).copied().unwrap_or(0.0))),
    }
}

/// Convert a grid to an RGB buffer, clamping every channel
pub fn grid_to_rgb(grid: &ImageGrid) -> RgbImage {
    let mut output = RgbImage::new(grid.cols() as u32, grid.rows() as u32);
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            if let Some(pixel) = grid.pixel([row, col]) {
                output.put_pixel(col as u32, row as u32, Rgb(pixel_to_rgb(pixel)));
            }
        }
    }
    output
}

/// Load a PNG as a 3-channel grid
///
/// # Errors
///
/// Returns `ImageLoad` if the file cannot be read or decoded
pub fn load_image(path: &Path) -> Result<ImageGrid> {
    let image = image::open(path).map_err(|e| InpaintError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(grid_from_rgb(&image.to_rgb8()))
}

/// Load a mask PNG where bright pixels mark holes
///
/// With `invert`, dark pixels mark holes instead.
///
/// # Errors
///
/// Returns `ImageLoad` if the file cannot be read or decoded
pub fn load_mask(path: &Path, invert: bool) -> Result<Mask> {
    let image = image::open(path)
        .map_err(|e| InpaintError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?
        .to_luma8();
    let (width, height) = image.dimensions();
    let holes = Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
        let bright = image
            .get_pixel_checked(col as u32, row as u32)
            .is_some_and(|p| p.0[0] > MASK_THRESHOLD);
        bright != invert
    });
    Ok(Mask::from_holes(&holes))
}

/// Save a grid as PNG, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or written
pub fn export_image(grid: &ImageGrid, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| InpaintError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    grid_to_rgb(grid)
        .save(output_path)
        .map_err(|e| InpaintError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })
}
