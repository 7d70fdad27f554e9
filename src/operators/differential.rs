//! Finite-difference operators sized to a patch
//!
//! The 1D operators act on a single column (or row) of `size` samples. The
//! difference operators truncate one-sidedly at the domain edge: the forward
//! operator's last row keeps only `-1` and the backward operator's first row
//! keeps only `+1`.

use crate::io::error::Result;
use crate::operators::sparse::SparseMatrix;
use crate::spatial::layout::BoundaryIndexSet;
use log::debug;

/// Centered second difference: `-2` on the diagonal, `+1` on both off-diagonals
///
/// A single sample has no neighbours, so `size == 1` gives the 1×1 zero matrix.
pub fn second_derivative_1d(size: usize) -> SparseMatrix {
    if size < 2 {
        return SparseMatrix::zeros(size, size);
    }

    let mut entries = Vec::with_capacity(3 * size);
    for k in 0..size {
        entries.push((k, k, -2.0));
        if k + 1 < size {
            entries.push((k, k + 1, 1.0));
            entries.push((k + 1, k, 1.0));
        }
    }
    sized(size, entries)
}

/// Forward difference: `-1` on every diagonal entry, `+1` above it except on the last row
pub fn forward_difference_1d(size: usize) -> SparseMatrix {
    let mut entries = Vec::with_capacity(2 * size);
    for k in 0..size {
        entries.push((k, k, -1.0));
        if k + 1 < size {
            entries.push((k, k + 1, 1.0));
        }
    }
    sized(size, entries)
}

/// Backward difference: `+1` on every diagonal entry, `-1` below it except on the first row
pub fn backward_difference_1d(size: usize) -> SparseMatrix {
    let mut entries = Vec::with_capacity(2 * size);
    for k in 0..size {
        entries.push((k, k, 1.0));
        if k > 0 {
            entries.push((k, k - 1, -1.0));
        }
    }
    sized(size, entries)
}

/// Vectorized 2D Laplacian `I_M ⊗ D_N + D_M ⊗ I_N` for an `rows×cols` patch
///
/// The first term differentiates within a column (the fast, column-major
/// index) and the second across columns.
///
/// # Errors
///
/// Returns an error if the Kronecker terms disagree in shape, which cannot
/// happen for operators built here
pub fn laplacian_2d(rows: usize, cols: usize) -> Result<SparseMatrix> {
    let within_columns = SparseMatrix::identity(cols).kron(&second_derivative_1d(rows));
    let across_columns = second_derivative_1d(cols).kron(&SparseMatrix::identity(rows));
    within_columns.add(&across_columns)
}

fn sized(size: usize, entries: Vec<(usize, usize, f64)>) -> SparseMatrix {
    SparseMatrix::assemble(size, size, entries)
}

/// Every operator a clone of an `rows×cols` patch needs
#[derive(Debug, Clone)]
pub struct PatchOperators {
    /// Vectorized 2D Laplacian
    pub laplacian: SparseMatrix,
    /// Forward difference along columns (`rows×rows`)
    pub forward_rows: SparseMatrix,
    /// Forward difference along rows (`cols×cols`)
    pub forward_cols: SparseMatrix,
    /// Backward difference along columns (`rows×rows`)
    pub backward_rows: SparseMatrix,
    /// Backward difference along rows (`cols×cols`)
    pub backward_cols: SparseMatrix,
    /// Perimeter of the patch
    pub boundary: BoundaryIndexSet,
}

impl PatchOperators {
    /// Build all operators for a patch size
    ///
    /// # Errors
    ///
    /// Propagates assembly failures of the Laplacian
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let laplacian = laplacian_2d(rows, cols)?;
        debug!(
            "built {rows}x{cols} patch operators ({} unknowns, {} Laplacian entries)",
            rows * cols,
            laplacian.nnz()
        );

        Ok(Self {
            laplacian,
            forward_rows: forward_difference_1d(rows),
            forward_cols: forward_difference_1d(cols),
            backward_rows: backward_difference_1d(rows),
            backward_cols: backward_difference_1d(cols),
            boundary: BoundaryIndexSet::new(rows, cols),
        })
    }

    /// Patch dimensions as (rows, cols)
    pub const fn dimensions(&self) -> (usize, usize) {
        self.boundary.dimensions()
    }
}
