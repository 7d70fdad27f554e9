//! Seamless image cloning by Poisson image editing
//!
//! A source patch is composited into a target so that its boundary matches the
//! target exactly while its interior follows a guidance field: the source's own
//! Laplacian, or per pixel the stronger of source and target gradients. The
//! induced sparse system is constrained with Dirichlet data and solved with
//! conjugate gradients.

#![forbid(unsafe_code)]

/// Guidance fields, boundary constraints, solver and compositor
pub mod cloning;
/// Input/output adapters, configuration and error handling
pub mod io;
/// Sparse differential operators and their cache
pub mod operators;
/// Patch geometry, vector layout and clipping
pub mod spatial;

pub use cloning::{CloneConfig, CloneMode, Composite, PatchCompositor};
pub use io::error::{CloneError, Result};
