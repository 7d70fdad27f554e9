/// Command-line interface for cloning image files
pub mod cli;
/// Solver and display defaults
pub mod configuration;
/// Error type and result alias
pub mod error;
/// 8-bit image files to normalized planes and back
pub mod image;
/// Per-channel solver progress bars
pub mod progress;
