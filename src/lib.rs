//! Priority-driven exemplar-based image inpainting
//!
//! Missing pixels are filled by greedily copying square patches from the
//! valid part of the image. The hole boundary is processed in priority
//! order so that strong structures propagate into the hole before flat
//! texture, and every copy reads only fully valid source patches.

#![forbid(unsafe_code)]

/// Fill loop, frontier, priority, search, acceptance and copy policies
pub mod algorithm;
/// Patch descriptors, difference metrics and image preprocessing
pub mod analysis;
/// Input/output operations, configuration, telemetry and error handling
pub mod io;
/// Image and mask grids, patch geometry and the source patch collection
pub mod spatial;

pub use io::error::{InpaintError, Result};
