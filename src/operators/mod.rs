/// Operator reuse across channels of the same patch size
pub mod cache;
/// Finite-difference operator construction
pub mod differential;
/// Compressed sparse row matrices
pub mod sparse;
