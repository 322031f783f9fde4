//! Engine constants and runtime configuration defaults

// Patch geometry
/// Half-width of the square patches (side `2 * h + 1`)
pub const DEFAULT_PATCH_HALF_WIDTH: usize = 4;

// Safety limit to keep per-commit work bounded
/// Largest accepted patch half-width
pub const MAX_PATCH_HALF_WIDTH: usize = 64;

// Search settings
/// Shortlist size for the coarse stage of a two-step search
pub const DEFAULT_KNN_CANDIDATES: usize = 1000;

// Rejection handling
/// Proposals a vertex may reject in one pass before it is deferred
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

// Priority weights
/// Weight of the confidence term
pub const DEFAULT_CONFIDENCE_WEIGHT: f32 = 1.0;
/// Weight of the structure term
pub const DEFAULT_STRUCTURE_WEIGHT: f32 = 1.0;

/// Luma above which a mask pixel marks a hole
pub const MASK_THRESHOLD: u8 = 127;

// Default values for configurable parameters
/// Fixed seed for reproducible random priorities
pub const DEFAULT_SEED: u64 = 42;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_filled";
/// Suffix of the fill animation
pub const VISUALIZATION_SUFFIX: &str = "_fill";
/// Delay between GIF animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 20;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 50;
/// Color used for unfilled hole pixels in the animation
pub const HOLE_COLOR: [u8; 4] = [255, 0, 255, 255];
