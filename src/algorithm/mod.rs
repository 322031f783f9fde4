/// Acceptance policies for proposed matches
pub mod acceptance;
/// Caching of source patch descriptors
pub mod cache;
/// Inpainting driver and run orchestration
pub mod executor;
/// Priority-ordered boundary frontier
pub mod frontier;
/// Single-layer and composite patch copy
pub mod inpainter;
/// Fill-order priority policies
pub mod priority;
/// Best-match, k-best and two-step patch search
pub mod search;
