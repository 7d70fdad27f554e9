//! Linearization of patch planes into solver vectors
//!
//! Every vector in the system uses column-major order: pixel `(i, j)` of an
//! `N×M` patch lives at `k = i + j·N`. The 2D Laplacian is assembled as
//! `I_M ⊗ D_N + D_M ⊗ I_N` precisely because of this order, so the row index
//! is the fast one. Flattening and reshaping must go through this module.

use crate::io::error::Result;
use bitvec::prelude::*;
use ndarray::{Array1, Array2, ArrayView2, ShapeBuilder};

/// Linear index of `(row, col)` in an `rows`-tall patch
pub const fn linear_index(row: usize, col: usize, rows: usize) -> usize {
    row + col * rows
}

/// Flatten a plane column by column
pub fn flatten_column_major(plane: ArrayView2<'_, f64>) -> Array1<f64> {
    plane.t().iter().copied().collect()
}

/// Reshape a column-major vector back into a `rows×cols` plane
///
/// # Errors
///
/// Returns an error if the vector length is not `rows * cols`
pub fn unflatten_column_major(vector: Array1<f64>, rows: usize, cols: usize) -> Result<Array2<f64>> {
    Ok(Array2::from_shape_vec((rows, cols).f(), vector.to_vec())?)
}

/// Perimeter indices of an `rows×cols` patch
///
/// Depends only on geometry, so one set serves every channel of a clone.
/// Indices are kept in ascending order alongside a membership mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryIndexSet {
    rows: usize,
    cols: usize,
    indices: Vec<usize>,
    mask: BitVec,
}

impl BoundaryIndexSet {
    /// Collect every `k` whose `(i, j)` has `i ∈ {0, rows-1}` or `j ∈ {0, cols-1}`
    pub fn new(rows: usize, cols: usize) -> Self {
        let len = rows * cols;
        let mut mask = bitvec![0; len];
        let mut indices = Vec::new();

        for col in 0..cols {
            for row in 0..rows {
                if row == 0 || row + 1 == rows || col == 0 || col + 1 == cols {
                    let k = linear_index(row, col, rows);
                    mask.set(k, true);
                    indices.push(k);
                }
            }
        }

        Self {
            rows,
            cols,
            indices,
            mask,
        }
    }

    /// Patch dimensions the set was built for
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Test whether a linear index lies on the perimeter
    pub fn contains(&self, k: usize) -> bool {
        self.mask.get(k).as_deref() == Some(&true)
    }

    /// Ascending perimeter indices
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of perimeter pixels
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True only for an empty patch
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of interior unknowns
    pub fn interior_count(&self) -> usize {
        self.mask.count_zeros()
    }
}
