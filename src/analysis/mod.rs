//! Patch comparison and image preprocessing

/// Patch descriptors and the difference metric
pub mod descriptor;
/// Masked derivatives producing the structure signal
pub mod gradient;
/// Source/target pairs with difference scores
pub mod pair;
/// Channel weights for the difference metric
pub mod weights;
