//! Compressed sparse row storage for discrete differential operators
//!
//! Operators are assembled from coordinate triplets, combined with Kronecker
//! products and sums, and applied to flattened vectors or dense planes.
//! Duplicate triplets are summed during assembly.

use crate::io::error::{Result, computation_error};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::ops::Range;

/// Square or rectangular sparse matrix in CSR layout
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    row_offsets: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseMatrix {
    /// Create a matrix with no stored entries
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_offsets: vec![0; rows + 1],
            col_indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Create the identity of the given size
    pub fn identity(size: usize) -> Self {
        Self::assemble(size, size, (0..size).map(|k| (k, k, 1.0)).collect())
    }

    /// Assemble a matrix from `(row, col, value)` triplets
    ///
    /// # Errors
    ///
    /// Returns an error if any triplet lies outside the declared shape
    pub fn from_triplets<I>(rows: usize, cols: usize, triplets: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let entries: Vec<(usize, usize, f64)> = triplets.into_iter().collect();
        if let Some(&(row, col, _)) = entries.iter().find(|&&(r, c, _)| r >= rows || c >= cols)
        {
            return Err(computation_error(
                "sparse assembly",
                &format!("entry ({row}, {col}) outside {rows}x{cols} matrix"),
            ));
        }
        Ok(Self::assemble(rows, cols, entries))
    }

    // Entries must already be in range
    pub(crate) fn assemble(rows: usize, cols: usize, mut entries: Vec<(usize, usize, f64)>) -> Self {
        entries.sort_unstable_by_key(|&(row, col, _)| (row, col));

        let mut row_offsets = vec![0; rows + 1];
        let mut col_indices = Vec::with_capacity(entries.len());
        let mut values: Vec<f64> = Vec::with_capacity(entries.len());
        let mut previous: Option<(usize, usize)> = None;

        for (row, col, value) in entries {
            if previous == Some((row, col)) {
                if let Some(last) = values.last_mut() {
                    *last += value;
                }
                continue;
            }
            previous = Some((row, col));
            col_indices.push(col);
            values.push(value);
            if let Some(count) = row_offsets.get_mut(row + 1) {
                *count += 1;
            }
        }

        let mut running = 0;
        for offset in &mut row_offsets {
            running += *offset;
            *offset = running;
        }

        Self {
            rows,
            cols,
            row_offsets,
            col_indices,
            values,
        }
    }

    /// Matrix dimensions as (rows, cols)
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    fn row_range(&self, row: usize) -> Range<usize> {
        let start = self.row_offsets.get(row).copied().unwrap_or(0);
        let end = self.row_offsets.get(row + 1).copied().unwrap_or(start);
        start..end
    }

    /// Iterate the stored `(col, value)` pairs of one row in column order
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_range(row);
        let cols = self.col_indices.get(range.clone()).unwrap_or(&[]);
        let vals = self.values.get(range).unwrap_or(&[]);
        cols.iter().copied().zip(vals.iter().copied())
    }

    /// Iterate all stored entries as `(row, col, value)` in row-major order
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.rows).flat_map(move |row| self.row(row).map(move |(col, value)| (row, col, value)))
    }

    /// Value at `(row, col)`, zero when not stored
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.row(row)
            .find(|&(c, _)| c == col)
            .map_or(0.0, |(_, value)| value)
    }

    /// Main diagonal as a dense vector
    pub fn diagonal(&self) -> Array1<f64> {
        (0..self.rows.min(self.cols))
            .map(|k| self.get(k, k))
            .collect()
    }

    /// Transposed copy
    #[must_use]
    pub fn transpose(&self) -> Self {
        Self::assemble(
            self.cols,
            self.rows,
            self.triplets().map(|(row, col, value)| (col, row, value)).collect(),
        )
    }

    /// Kronecker product `self ⊗ other`
    ///
    /// Block `(r, c)` of the result is `self[r, c] · other`.
    #[must_use]
    pub fn kron(&self, other: &Self) -> Self {
        let (other_rows, other_cols) = other.shape();
        let mut entries = Vec::with_capacity(self.nnz() * other.nnz());
        for (r1, c1, v1) in self.triplets() {
            for (r2, c2, v2) in other.triplets() {
                entries.push((r1 * other_rows + r2, c1 * other_cols + c2, v1 * v2));
            }
        }
        Self::assemble(self.rows * other_rows, self.cols * other_cols, entries)
    }

    /// Element-wise sum of two matrices of equal shape
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes differ
    pub fn add(&self, other: &Self) -> Result<Self> {
        if self.shape() != other.shape() {
            return Err(computation_error(
                "sparse addition",
                &format!("shape {:?} does not match {:?}", self.shape(), other.shape()),
            ));
        }
        Ok(Self::assemble(
            self.rows,
            self.cols,
            self.triplets().chain(other.triplets()).collect(),
        ))
    }

    /// Matrix-vector product `self · x`
    ///
    /// # Errors
    ///
    /// Returns an error if `x` does not have `cols` entries
    pub fn mul_vec(&self, x: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        if x.len() != self.cols {
            return Err(computation_error(
                "sparse matrix-vector product",
                &format!("vector of length {} for {} columns", x.len(), self.cols),
            ));
        }
        Ok((0..self.rows)
            .map(|row| {
                self.row(row)
                    .map(|(col, value)| value * x.get(col).copied().unwrap_or(0.0))
                    .sum()
            })
            .collect())
    }

    /// Product with a dense matrix from the left, `self · m`
    ///
    /// # Errors
    ///
    /// Returns an error if `m` does not have `cols` rows
    pub fn mul_dense(&self, m: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if m.nrows() != self.cols {
            return Err(computation_error(
                "sparse-dense product",
                &format!("dense operand has {} rows for {} columns", m.nrows(), self.cols),
            ));
        }
        let mut out = Array2::zeros((self.rows, m.ncols()));
        for (row, mut out_row) in out.axis_iter_mut(Axis(0)).enumerate() {
            for (col, value) in self.row(row) {
                out_row.scaled_add(value, &m.row(col));
            }
        }
        Ok(out)
    }

    /// Product with the transpose from the right, `m · selfᵀ`
    ///
    /// # Errors
    ///
    /// Returns an error if `m` does not have `cols` columns
    pub fn dense_mul_transpose(&self, m: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        Ok(self.mul_dense(m.t())?.reversed_axes())
    }

    /// Check `|A[r, c] - A[c, r]| <= tolerance` for every stored entry
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        self.rows == self.cols
            && self
                .triplets()
                .all(|(row, col, value)| (value - self.get(col, row)).abs() <= tolerance)
    }

    /// Dense copy, intended for inspection and tests
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.rows, self.cols));
        for (row, col, value) in self.triplets() {
            if let Some(cell) = dense.get_mut((row, col)) {
                *cell += value;
            }
        }
        dense
    }
}
