/// Command-line interface
pub mod cli;
/// Constants and runtime defaults
pub mod configuration;
/// Error types and context helpers
pub mod error;
/// PNG loading and export
pub mod image;
/// Commit telemetry sinks
pub mod progress;
/// GIF recording of the fill
pub mod visualization;
