//! Dirichlet boundary constraints on the patch system
//!
//! Constraining never mutates its inputs: each step consumes or borrows a
//! system and returns a new one, so channel workers can share operators.

use crate::io::error::{Result, computation_error};
use crate::operators::sparse::SparseMatrix;
use crate::spatial::layout::BoundaryIndexSet;
use ndarray::{Array1, ArrayView1};

/// Sparse system `A · x = b`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    /// System matrix
    pub matrix: SparseMatrix,
    /// Right-hand side
    pub rhs: Array1<f64>,
}

impl LinearSystem {
    /// Pair a square matrix with a right-hand side of matching length
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is not square or the lengths differ
    pub fn new(matrix: SparseMatrix, rhs: Array1<f64>) -> Result<Self> {
        let (rows, cols) = matrix.shape();
        if rows != cols || rhs.len() != rows {
            return Err(computation_error(
                "linear system",
                &format!(
                    "{rows}x{cols} matrix with right-hand side of length {}",
                    rhs.len()
                ),
            ));
        }
        Ok(Self { matrix, rhs })
    }

    /// Number of unknowns
    pub const fn dimension(&self) -> usize {
        self.matrix.shape().0
    }

    /// Move known boundary values out of the interior rows
    ///
    /// Boundary rows must already be identity rows, as produced by
    /// [`apply_dirichlet`]. Each interior row `i` drops its boundary columns
    /// `k`, subtracting `A[i, k] · b[k]` from `b[i]`, and is then negated so the
    /// negative-definite Laplacian block becomes positive definite. The solution
    /// is unchanged; the matrix becomes symmetric positive definite.
    #[must_use]
    pub fn eliminate_boundary_columns(self, boundary: &BoundaryIndexSet) -> Self {
        let n = self.dimension();
        let mut entries = Vec::with_capacity(self.matrix.nnz());
        let mut rhs = self.rhs.clone();

        for (row, value) in rhs.iter_mut().enumerate() {
            if boundary.contains(row) {
                entries.push((row, row, 1.0));
                continue;
            }

            let mut lifted = *value;
            for (col, coefficient) in self.matrix.row(row) {
                if boundary.contains(col) {
                    lifted -= coefficient * self.rhs.get(col).copied().unwrap_or(0.0);
                } else {
                    entries.push((row, col, -coefficient));
                }
            }
            *value = -lifted;
        }

        Self {
            matrix: SparseMatrix::assemble(n, n, entries),
            rhs,
        }
    }
}

/// Replace every boundary row `k` by `e_k` and set `b[k] = reference[k]`
///
/// `reference` holds the target's own pixels under the patch, flattened
/// column-major like every other vector of the system.
///
/// # Errors
///
/// Returns an error if the matrix, right-hand side, reference and boundary set
/// disagree in size
pub fn apply_dirichlet(
    matrix: &SparseMatrix,
    rhs: ArrayView1<'_, f64>,
    boundary: &BoundaryIndexSet,
    reference: ArrayView1<'_, f64>,
) -> Result<LinearSystem> {
    let (rows, cols) = boundary.dimensions();
    let n = rows * cols;
    if matrix.shape() != (n, n) || rhs.len() != n || reference.len() != n {
        return Err(computation_error(
            "boundary constraint",
            &format!(
                "{rows}x{cols} patch with {:?} matrix, rhs {} and reference {}",
                matrix.shape(),
                rhs.len(),
                reference.len()
            ),
        ));
    }

    let entries = matrix
        .triplets()
        .filter(|&(row, _, _)| !boundary.contains(row))
        .chain(boundary.indices().iter().map(|&k| (k, k, 1.0)))
        .collect();

    let mut constrained_rhs = rhs.to_owned();
    for &k in boundary.indices() {
        if let (Some(slot), Some(&value)) = (constrained_rhs.get_mut(k), reference.get(k)) {
            *slot = value;
        }
    }

    LinearSystem::new(SparseMatrix::assemble(n, n, entries), constrained_rhs)
}

/// Dirichlet constraint followed by boundary elimination, ready for CG
///
/// # Errors
///
/// Returns an error if the inputs disagree in size
pub fn constrain(
    matrix: &SparseMatrix,
    rhs: ArrayView1<'_, f64>,
    boundary: &BoundaryIndexSet,
    reference: ArrayView1<'_, f64>,
) -> Result<LinearSystem> {
    Ok(apply_dirichlet(matrix, rhs, boundary, reference)?.eliminate_boundary_columns(boundary))
}

/// Copy of `x` with its boundary entries replaced by `reference`
pub fn seed_boundary(
    x: ArrayView1<'_, f64>,
    boundary: &BoundaryIndexSet,
    reference: ArrayView1<'_, f64>,
) -> Array1<f64> {
    let mut seeded = x.to_owned();
    for &k in boundary.indices() {
        if let (Some(slot), Some(&value)) = (seeded.get_mut(k), reference.get(k)) {
            *slot = value;
        }
    }
    seeded
}
