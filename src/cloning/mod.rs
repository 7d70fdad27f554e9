//! Seamless cloning engine
//!
//! Guidance assembly, boundary constraints, the iterative solve and the
//! compositor that ties them together per channel.

/// Dirichlet constraints and constrained linear systems
pub mod boundary;
/// Per-channel orchestration and the public cloning entry points
pub mod compositor;
/// Guidance vectors for naive, Laplacian and mixed-gradient cloning
pub mod guidance;
/// Conjugate gradient solver with explicit convergence status
pub mod solver;

pub use compositor::{CloneConfig, Composite, PatchCompositor};
pub use guidance::CloneMode;
pub use solver::{SolveReport, SolveStatus, SolverSettings};
