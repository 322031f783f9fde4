//! Spatial data structures for the inpainting grid
//!
//! This module contains spatial-related functionality including:
//! - Image and mask grids with boundary discovery
//! - Square patch and region geometry
//! - The growing collection of fully valid source patches

/// Image and mask grids
pub mod grid;
/// Patch and region geometry
pub mod patch;
/// Source patch collection
pub mod sources;

pub use grid::{Connectivity, ImageGrid, Mask, StructureField};
pub use patch::{Patch, Region, Vertex};
pub use sources::SourcePatchCollection;
