//! Solver constants and runtime configuration defaults

// Solver defaults
/// Relative residual tolerance for the conjugate gradient solve
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

// Guards non-convergence on large or ill-conditioned patches
/// Maximum conjugate gradient iterations per channel
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Tolerance used by debug-build symmetry checks on constrained systems
pub const SYMMETRY_TOLERANCE: f64 = 1e-12;

// Curvature below this is treated as a breakdown of the iteration
/// Smallest admissible `pᵀAp` during conjugate gradient
pub const CURVATURE_EPSILON: f64 = 1e-300;

// Image adaptation
/// Largest 8-bit intensity, used for normalization to [0, 1]
pub const MAX_INTENSITY: f64 = 255.0;

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 30;
/// Solver iterations between progress bar refreshes
pub const PROGRESS_REFRESH_INTERVAL: usize = 10;

// Output settings
/// Extension used for composited output images
pub const OUTPUT_EXTENSION: &str = "png";
