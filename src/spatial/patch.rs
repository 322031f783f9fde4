//! Square patch geometry over a 2D grid
//!
//! A [`Region`] is an axis-aligned rectangle of grid vertices. A [`Patch`] is
//! the square region of side `2 * half_width + 1` around a center vertex,
//! guaranteed to lie inside the grid it was built for.

use crate::io::error::{InpaintError, Result};
use std::cmp::Ordering;

/// Grid vertex as `[row, col]`
pub type Vertex = [usize; 2];

/// Axis-aligned rectangle of grid vertices
///
/// Ordering is by top-left corner (row-major), then by size, so ordered sets
/// of regions deduplicate by location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Top-left vertex (inclusive)
    pub origin: Vertex,
    /// Number of rows covered
    pub rows: usize,
    /// Number of columns covered
    pub cols: usize,
}

impl Region {
    /// Create a region from its top-left corner and dimensions
    pub const fn new(origin: Vertex, rows: usize, cols: usize) -> Self {
        Self { origin, rows, cols }
    }

    /// Region covering a whole `rows x cols` grid
    pub const fn whole(rows: usize, cols: usize) -> Self {
        Self::new([0, 0], rows, cols)
    }

    /// Square region of side `2 * half_width + 1` centered on `center`
    ///
    /// Returns `None` when the square would start at a negative coordinate.
    pub const fn centered(center: Vertex, half_width: usize) -> Option<Self> {
        if center[0] < half_width || center[1] < half_width {
            return None;
        }
        let side = 2 * half_width + 1;
        Some(Self::new(
            [center[0] - half_width, center[1] - half_width],
            side,
            side,
        ))
    }

    /// Number of vertices in the region
    pub const fn area(&self) -> usize {
        self.rows * self.cols
    }

    /// Exclusive bottom-right corner
    pub const fn end(&self) -> Vertex {
        [self.origin[0] + self.rows, self.origin[1] + self.cols]
    }

    /// Check whether a vertex lies in the region
    pub const fn contains(&self, vertex: Vertex) -> bool {
        let end = self.end();
        vertex[0] >= self.origin[0]
            && vertex[0] < end[0]
            && vertex[1] >= self.origin[1]
            && vertex[1] < end[1]
    }

    /// Check whether two regions share at least one vertex
    pub const fn intersects(&self, other: &Self) -> bool {
        let a_end = self.end();
        let b_end = other.end();
        self.area() > 0
            && other.area() > 0
            && self.origin[0] < b_end[0]
            && other.origin[0] < a_end[0]
            && self.origin[1] < b_end[1]
            && other.origin[1] < a_end[1]
    }

    /// Check whether this region lies entirely inside `outer`
    pub const fn is_inside(&self, outer: &Self) -> bool {
        let end = self.end();
        let outer_end = outer.end();
        self.origin[0] >= outer.origin[0]
            && self.origin[1] >= outer.origin[1]
            && end[0] <= outer_end[0]
            && end[1] <= outer_end[1]
    }

    /// Grow the region by `radius` on every side, clamped to `bounds`
    #[must_use]
    pub fn expand(&self, radius: usize, bounds: &Self) -> Self {
        let bounds_end = bounds.end();
        let end = self.end();
        let row_start = self.origin[0].saturating_sub(radius).max(bounds.origin[0]);
        let col_start = self.origin[1].saturating_sub(radius).max(bounds.origin[1]);
        let row_end = (end[0] + radius).min(bounds_end[0]);
        let col_end = (end[1] + radius).min(bounds_end[1]);
        Self::new(
            [row_start, col_start],
            row_end.saturating_sub(row_start),
            col_end.saturating_sub(col_start),
        )
    }

    /// Iterate over all vertices in row-major order
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + use<> {
        let [row0, col0] = self.origin;
        let [row_end, col_end] = self.end();
        (row0..row_end).flat_map(move |row| (col0..col_end).map(move |col| [row, col]))
    }
}

impl PartialOrd for Region {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Region {
    fn cmp(&self, other: &Self) -> Ordering {
        self.origin
            .cmp(&other.origin)
            .then_with(|| self.rows.cmp(&other.rows))
            .then_with(|| self.cols.cmp(&other.cols))
    }
}

/// Square neighborhood around a grid vertex
///
/// Immutable once constructed; equality and ordering follow the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Patch {
    region: Region,
    half_width: usize,
}

impl Patch {
    /// Create the patch of the given half-width around `center`
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` if any part of the patch would leave `bounds`
    pub fn new(center: Vertex, half_width: usize, bounds: &Region) -> Result<Self> {
        let out_of_bounds = || InpaintError::OutOfBounds {
            center,
            half_width,
            bounds: (bounds.rows, bounds.cols),
        };

        let region = Region::centered(center, half_width).ok_or_else(out_of_bounds)?;
        if !region.is_inside(bounds) {
            return Err(out_of_bounds());
        }

        Ok(Self { region, half_width })
    }

    /// Create the patch nearest to `vertex` that covers it
    ///
    /// The center is moved inward just far enough for the patch to fit
    /// inside `bounds`; away from the edges this is the patch centered on
    /// `vertex`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` if `vertex` lies outside `bounds` or `bounds` is
    /// narrower than the patch side
    pub fn covering(vertex: Vertex, half_width: usize, bounds: &Region) -> Result<Self> {
        let side = 2 * half_width + 1;
        if !bounds.contains(vertex) || bounds.rows < side || bounds.cols < side {
            return Err(InpaintError::OutOfBounds {
                center: vertex,
                half_width,
                bounds: (bounds.rows, bounds.cols),
            });
        }
        let clamp = |value: usize, origin: usize, extent: usize| {
            value.clamp(origin + half_width, origin + extent - 1 - half_width)
        };
        let center = [
            clamp(vertex[0], bounds.origin[0], bounds.rows),
            clamp(vertex[1], bounds.origin[1], bounds.cols),
        ];
        Self::new(center, half_width, bounds)
    }

    /// The square region covered by the patch
    pub const fn region(&self) -> &Region {
        &self.region
    }

    /// Center vertex
    pub const fn center(&self) -> Vertex {
        [
            self.region.origin[0] + self.half_width,
            self.region.origin[1] + self.half_width,
        ]
    }

    /// Half-width of the patch
    pub const fn half_width(&self) -> usize {
        self.half_width
    }

    /// Side length `2 * half_width + 1`
    pub const fn side(&self) -> usize {
        self.region.rows
    }

    /// Check whether the patch covers a vertex
    pub const fn contains(&self, vertex: Vertex) -> bool {
        self.region.contains(vertex)
    }

    /// Check whether two patches overlap
    pub const fn intersects(&self, other: &Self) -> bool {
        self.region.intersects(&other.region)
    }

    /// Iterate over covered vertices in row-major order
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + use<> {
        self.region.vertices()
    }

    /// Translate a vertex of this patch to the same relative position in `other`
    pub const fn translate_to(&self, vertex: Vertex, other: &Self) -> Vertex {
        [
            vertex[0] - self.region.origin[0] + other.region.origin[0],
            vertex[1] - self.region.origin[1] + other.region.origin[1],
        ]
    }
}
