//! Patch placement inside a target plane and intensity clipping

use crate::io::error::{CloneError, Result, invalid_parameter};
use ndarray::{Array2, ArrayView2, ArrayViewMut2, Axis, Slice};
use num_traits::Float;

/// Rectangular placement of an `rows×cols` patch at `(top, left)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchRegion {
    /// First target row covered by the patch
    pub top: usize,
    /// First target column covered by the patch
    pub left: usize,
    /// Patch height
    pub rows: usize,
    /// Patch width
    pub cols: usize,
}

impl PatchRegion {
    /// Place a patch of the given size at `(top, left)`
    pub const fn new(top: usize, left: usize, rows: usize, cols: usize) -> Self {
        Self {
            top,
            left,
            rows,
            cols,
        }
    }

    /// Number of pixels covered
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// True when the patch covers no pixels
    pub const fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Check that the patch is non-empty and fits inside `target` (rows, cols)
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an empty patch and `OutOfBounds` when
    /// `offset + size` exceeds the target in either axis
    pub fn validate_within(&self, target: (usize, usize)) -> Result<()> {
        if self.is_empty() {
            return Err(invalid_parameter(
                "source",
                &format!("{}x{}", self.rows, self.cols),
                &"patch must cover at least one pixel",
            ));
        }

        let fits = |offset: usize, extent: usize, limit: usize| {
            offset.checked_add(extent).is_some_and(|end| end <= limit)
        };

        if fits(self.top, self.rows, target.0) && fits(self.left, self.cols, target.1) {
            Ok(())
        } else {
            Err(CloneError::OutOfBounds {
                region: (self.top, self.left, self.rows, self.cols),
                target,
            })
        }
    }

    /// View of the covered region of a plane
    ///
    /// The region must have been validated against the plane.
    pub fn view<'a>(&self, plane: ArrayView2<'a, f64>) -> ArrayView2<'a, f64> {
        plane
            .slice_axis_move(Axis(0), self.row_span())
            .slice_axis_move(Axis(1), self.col_span())
    }

    /// Mutable view of the covered region of a plane
    ///
    /// The region must have been validated against the plane.
    pub fn view_mut<'a>(&self, plane: ArrayViewMut2<'a, f64>) -> ArrayViewMut2<'a, f64> {
        plane
            .slice_axis_move(Axis(0), self.row_span())
            .slice_axis_move(Axis(1), self.col_span())
    }

    fn row_span(&self) -> Slice {
        Slice::from(self.top..self.top + self.rows)
    }

    fn col_span(&self) -> Slice {
        Slice::from(self.left..self.left + self.cols)
    }

    /// Copy `target` and overwrite the covered region with `patch`
    pub fn paste(&self, target: ArrayView2<'_, f64>, patch: ArrayView2<'_, f64>) -> Array2<f64> {
        let mut result = target.to_owned();
        self.view_mut(result.view_mut()).assign(&patch);
        result
    }
}

/// Clamp an intensity into `[0, 1]`
pub fn clip_unit<T: Float>(value: T) -> T {
    value.max(T::zero()).min(T::one())
}

/// Clamp every intensity of a plane into `[0, 1]`
pub fn clip_plane(plane: &mut Array2<f64>) {
    plane.mapv_inplace(clip_unit);
}

/// Location of the first NaN or infinite value, if any
pub fn first_non_finite(plane: ArrayView2<'_, f64>) -> Option<(usize, usize)> {
    plane
        .indexed_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(index, _)| index)
}
