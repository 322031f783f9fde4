//! Image and mask grids
//!
//! [`ImageGrid`] stores `f32` channel values per pixel. [`Mask`] stores one
//! hole bit per pixel. Both are indexed by `[row, col]` vertices and share
//! dimensions when co-registered.

use bitvec::prelude::*;
use ndarray::{Array2, Array3, ArrayView1, Axis, Slice};

use crate::io::error::{InpaintError, Result, invalid_parameter};
use crate::spatial::patch::{Region, Vertex};

/// Neighborhood used to decide boundary membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Up, down, left and right neighbors
    Four,
    /// All eight surrounding neighbors
    #[default]
    Eight,
}

const FOUR_OFFSETS: [[isize; 2]; 4] = [[-1, 0], [0, -1], [0, 1], [1, 0]];
const EIGHT_OFFSETS: [[isize; 2]; 8] = [
    [-1, -1],
    [-1, 0],
    [-1, 1],
    [0, -1],
    [0, 1],
    [1, -1],
    [1, 0],
    [1, 1],
];

impl Connectivity {
    /// Neighbor offsets as `[d_row, d_col]`
    pub const fn offsets(self) -> &'static [[isize; 2]] {
        match self {
            Self::Four => &FOUR_OFFSETS,
            Self::Eight => &EIGHT_OFFSETS,
        }
    }

    /// In-bounds neighbors of a vertex
    pub fn neighbors(self, vertex: Vertex, bounds: &Region) -> impl Iterator<Item = Vertex> + use<> {
        let bounds = *bounds;
        self.offsets().iter().filter_map(move |offset| {
            let row = vertex[0].checked_add_signed(offset[0])?;
            let col = vertex[1].checked_add_signed(offset[1])?;
            bounds.contains([row, col]).then_some([row, col])
        })
    }
}

/// Per-pixel scalar structure signal (e.g. gradient magnitude)
///
/// Supplied once before a run and treated as read-only.
pub type StructureField = Array2<f32>;

/// Multi-channel floating point raster
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGrid {
    data: Array3<f32>,
}

impl ImageGrid {
    /// Create a zero-filled image
    pub fn new(rows: usize, cols: usize, channels: usize) -> Self {
        Self {
            data: Array3::zeros((rows, cols, channels)),
        }
    }

    /// Create an image where every pixel holds `value`
    ///
    /// # Errors
    ///
    /// Returns an error if `value` has no channels
    pub fn filled(rows: usize, cols: usize, value: &[f32]) -> Result<Self> {
        if value.is_empty() {
            return Err(invalid_parameter(
                "channels",
                &0,
                &"an image needs at least one channel",
            ));
        }
        let data = Array3::from_shape_fn((rows, cols, value.len()), |(_, _, c)| {
            value.get(c).copied().unwrap_or(0.0)
        });
        Ok(Self { data })
    }

    /// Wrap an existing `(rows, cols, channels)` array
    pub const fn from_array(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    /// Number of channels per pixel
    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// Region covering the whole image
    pub fn bounds(&self) -> Region {
        Region::whole(self.rows(), self.cols())
    }

    /// Channel values at a vertex
    pub fn pixel(&self, vertex: Vertex) -> Option<ArrayView1<'_, f32>> {
        if vertex[0] < self.rows() && vertex[1] < self.cols() {
            Some(
                self.data
                    .index_axis(Axis(0), vertex[0])
                    .index_axis_move(Axis(0), vertex[1]),
            )
        } else {
            None
        }
    }

    /// Single channel value at a vertex
    pub fn value(&self, vertex: Vertex, channel: usize) -> Option<f32> {
        self.data.get([vertex[0], vertex[1], channel]).copied()
    }

    /// Overwrite the channel values at a vertex
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is outside the image or the channel
    /// count differs
    pub fn set_pixel(&mut self, vertex: Vertex, value: &[f32]) -> Result<()> {
        if value.len() != self.channels() {
            return Err(InpaintError::SizeMismatch {
                source: value.len(),
                target: self.channels(),
            });
        }
        if vertex[0] >= self.rows() || vertex[1] >= self.cols() {
            return Err(invalid_parameter(
                "vertex",
                &format!("[{}, {}]", vertex[0], vertex[1]),
                &"outside image bounds",
            ));
        }
        for (channel, &v) in value.iter().enumerate() {
            if let Some(slot) = self.data.get_mut([vertex[0], vertex[1], channel]) {
                *slot = v;
            }
        }
        Ok(())
    }

    /// Copy every channel of `from` into `to` within this image
    pub fn copy_pixel(&mut self, from: Vertex, to: Vertex) {
        for channel in 0..self.channels() {
            let value = self.data.get([from[0], from[1], channel]).copied();
            if let (Some(value), Some(slot)) =
                (value, self.data.get_mut([to[0], to[1], channel]))
            {
                *slot = value;
            }
        }
    }

    /// Underlying array view
    pub const fn as_array(&self) -> &Array3<f32> {
        &self.data
    }

    /// Check that another image shares this image's dimensions
    pub fn is_coregistered(&self, other: &Self) -> bool {
        self.rows() == other.rows() && self.cols() == other.cols()
    }

    /// Concatenate the channels of co-registered images, in order
    ///
    /// # Errors
    ///
    /// Returns an error if no image is given or the images differ in size
    pub fn stack(images: &[&Self]) -> Result<Self> {
        let Some(first) = images.first() else {
            return Err(invalid_parameter("images", &0, &"nothing to stack"));
        };
        if let Some(other) = images.iter().find(|image| !first.is_coregistered(image)) {
            return Err(InpaintError::SizeMismatch {
                source: other.rows() * other.cols(),
                target: first.rows() * first.cols(),
            });
        }
        let views: Vec<_> = images.iter().map(|image| image.data.view()).collect();
        let data = ndarray::concatenate(Axis(2), &views)
            .map_err(|e| invalid_parameter("images", &images.len(), &e))?;
        Ok(Self { data })
    }

    /// Copy out the channels in `channels` as a new image
    ///
    /// # Errors
    ///
    /// Returns an error if the range exceeds the channel count
    pub fn select_channels(&self, channels: std::ops::Range<usize>) -> Result<Self> {
        if channels.end > self.channels() || channels.is_empty() {
            return Err(invalid_parameter(
                "channels",
                &format!("{channels:?}"),
                &format!("image has {} channels", self.channels()),
            ));
        }
        Ok(Self {
            data: self
                .data
                .slice_axis(Axis(2), Slice::from(channels))
                .to_owned(),
        })
    }
}

/// Hole/valid state for every pixel of a grid
///
/// A set bit marks a hole. Pixels only ever transition hole to valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    holes: BitVec,
    rows: usize,
    cols: usize,
    hole_count: usize,
}

impl Mask {
    /// Create a mask with every pixel valid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            holes: bitvec![0; rows * cols],
            rows,
            cols,
            hole_count: 0,
        }
    }

    /// Create a mask from a boolean array where `true` marks a hole
    pub fn from_holes(holes: &Array2<bool>) -> Self {
        let (rows, cols) = holes.dim();
        let mut mask = Self::new(rows, cols);
        for ((row, col), &is_hole) in holes.indexed_iter() {
            if is_hole {
                mask.set_hole([row, col]);
            }
        }
        mask
    }

    /// Number of rows
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Region covering the whole grid
    pub const fn bounds(&self) -> Region {
        Region::whole(self.rows, self.cols)
    }

    const fn index(&self, vertex: Vertex) -> Option<usize> {
        if vertex[0] < self.rows && vertex[1] < self.cols {
            Some(vertex[0] * self.cols + vertex[1])
        } else {
            None
        }
    }

    /// Check whether a vertex is a hole (out-of-bounds vertices are not)
    pub fn is_hole(&self, vertex: Vertex) -> bool {
        self.index(vertex)
            .and_then(|i| self.holes.get(i).as_deref().copied())
            .unwrap_or(false)
    }

    /// Check whether a vertex is inside the grid and holds valid data
    pub fn is_valid(&self, vertex: Vertex) -> bool {
        self.index(vertex).is_some() && !self.is_hole(vertex)
    }

    /// Mark a vertex as a hole
    pub fn set_hole(&mut self, vertex: Vertex) {
        if let Some(i) = self.index(vertex) {
            if !self.holes.get(i).as_deref().copied().unwrap_or(true) {
                self.holes.set(i, true);
                self.hole_count += 1;
            }
        }
    }

    /// Mark a hole vertex as valid; returns whether the state changed
    pub fn set_valid(&mut self, vertex: Vertex) -> bool {
        if self.is_hole(vertex) {
            if let Some(i) = self.index(vertex) {
                self.holes.set(i, false);
                self.hole_count -= 1;
                return true;
            }
        }
        false
    }

    /// Mark every hole in `region` valid and return the vertices that changed
    pub fn fill_region(&mut self, region: &Region) -> Vec<Vertex> {
        region
            .vertices()
            .filter(|&vertex| self.set_valid(vertex))
            .collect()
    }

    /// Number of hole pixels
    pub const fn hole_count(&self) -> usize {
        self.hole_count
    }

    /// Number of valid pixels
    pub const fn valid_count(&self) -> usize {
        self.rows * self.cols - self.hole_count
    }

    /// All hole vertices in row-major order
    pub fn holes(&self) -> Vec<Vertex> {
        self.holes
            .iter_ones()
            .map(|i| [i / self.cols, i % self.cols])
            .collect()
    }

    /// Check whether `region` lies in the grid and contains no hole
    pub fn is_region_valid(&self, region: &Region) -> bool {
        region.is_inside(&self.bounds()) && self.first_hole_in(region).is_none()
    }

    /// First hole in `region` in row-major order
    pub fn first_hole_in(&self, region: &Region) -> Option<Vertex> {
        region.vertices().find(|&vertex| self.is_hole(vertex))
    }

    /// Check whether a hole vertex touches at least one valid vertex
    pub fn is_boundary(&self, vertex: Vertex, connectivity: Connectivity) -> bool {
        self.is_hole(vertex)
            && connectivity
                .neighbors(vertex, &self.bounds())
                .any(|neighbor| self.is_valid(neighbor))
    }

    /// All boundary vertices in row-major order
    pub fn find_boundary(&self, connectivity: Connectivity) -> Vec<Vertex> {
        self.holes
            .iter_ones()
            .map(|i| [i / self.cols, i % self.cols])
            .filter(|&vertex| self.is_boundary(vertex, connectivity))
            .collect()
    }

    /// Check whether an image shares this mask's dimensions
    pub fn matches(&self, image: &ImageGrid) -> bool {
        self.rows == image.rows() && self.cols == image.cols()
    }
}
