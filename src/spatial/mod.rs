//! Patch geometry and vector layout
//!
//! This module contains spatial-related functionality including:
//! - Column-major flattening and the boundary index set
//! - Patch placement, bounds validation and clipping

/// Column-major linearization and perimeter indices
pub mod layout;
/// Patch placement within a target plane
pub mod region;

pub use layout::BoundaryIndexSet;
pub use region::PatchRegion;
