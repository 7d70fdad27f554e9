//! Guidance fields for the three cloning policies
//!
//! The guidance vector is the right-hand side the solved region's Laplacian is
//! forced to match. Naive cloning has no guidance and never reaches a solve.

use crate::io::error::Result;
use crate::operators::differential::PatchOperators;
use crate::spatial::layout::flatten_column_major;
use ndarray::{Array1, Array2, ArrayView2, Zip};

/// How the source patch is blended into the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum CloneMode {
    /// Paste the source pixels verbatim
    Naive,
    /// Reproduce the Laplacian of the source patch
    Laplacian,
    /// Follow whichever of source or target has the stronger local gradient
    Mixed,
}

impl CloneMode {
    /// Guidance policy driving the solve, `None` for naive pasting
    pub const fn guidance(self) -> Option<GuidancePolicy> {
        match self {
            Self::Naive => None,
            Self::Laplacian => Some(GuidancePolicy::Laplacian),
            Self::Mixed => Some(GuidancePolicy::MixedGradients),
        }
    }

    /// Lowercase name as used on the command line
    pub const fn name(self) -> &'static str {
        match self {
            Self::Naive => "naive",
            Self::Laplacian => "laplacian",
            Self::Mixed => "mixed",
        }
    }
}

/// Guidance policies that require a linear solve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidancePolicy {
    /// `b = Δ · vec(g)`
    Laplacian,
    /// Divergence of the per-pixel stronger gradient of source and target
    MixedGradients,
}

impl GuidancePolicy {
    /// Right-hand side vector for a source patch and the target region below it
    ///
    /// # Errors
    ///
    /// Returns an error if the planes do not match the operator dimensions
    pub fn build(
        self,
        source: ArrayView2<'_, f64>,
        target_region: ArrayView2<'_, f64>,
        operators: &PatchOperators,
    ) -> Result<Array1<f64>> {
        match self {
            Self::Laplacian => operators
                .laplacian
                .mul_vec(flatten_column_major(source).view()),
            Self::MixedGradients => {
                let source_gradient = GradientField::forward(source, operators)?;
                let target_gradient = GradientField::forward(target_region, operators)?;
                let guidance = GradientField::stronger_of(&source_gradient, &target_gradient);
                Ok(flatten_column_major(guidance.divergence(operators)?.view()))
            }
        }
    }

    /// Initial iterate for the solve
    ///
    /// Laplacian guidance starts from the source patch, mixed guidance from the
    /// target region, each already close to the blended result.
    pub fn warm_start(
        self,
        source: ArrayView2<'_, f64>,
        target_region: ArrayView2<'_, f64>,
    ) -> Array1<f64> {
        match self {
            Self::Laplacian => flatten_column_major(source),
            Self::MixedGradients => flatten_column_major(target_region),
        }
    }
}

/// Per-pixel forward differences of a plane
#[derive(Debug, Clone, PartialEq)]
pub struct GradientField {
    /// Difference to the next row, `F_N · image`
    pub vertical: Array2<f64>,
    /// Difference to the next column, `image · F_Mᵀ`
    pub horizontal: Array2<f64>,
}

impl GradientField {
    /// Forward-difference gradient of a patch-sized plane
    ///
    /// # Errors
    ///
    /// Returns an error if the plane does not match the operator dimensions
    pub fn forward(image: ArrayView2<'_, f64>, operators: &PatchOperators) -> Result<Self> {
        Ok(Self {
            vertical: operators.forward_rows.mul_dense(image)?,
            horizontal: operators.forward_cols.dense_mul_transpose(image)?,
        })
    }

    /// Squared gradient magnitude per pixel
    ///
    /// Evaluated as `v.mul_add(v, h * h)`, which skips the rounding of `v * v`.
    /// Near-ties can therefore resolve differently than with two separately
    /// rounded squares; magnitudes that are exactly representable, such as
    /// `(3, 4)` against `(4, -3)`, still compare equal.
    pub fn magnitude_squared(&self) -> Array2<f64> {
        Zip::from(&self.vertical)
            .and(&self.horizontal)
            .map_collect(|&v, &h| v.mul_add(v, h * h))
    }

    /// Select, per pixel, the whole gradient pair with the larger magnitude
    ///
    /// Components are never mixed across the two fields. Ties keep `source`.
    pub fn stronger_of(source: &Self, target: &Self) -> Self {
        let target_wins = Zip::from(&target.magnitude_squared())
            .and(&source.magnitude_squared())
            .map_collect(|&t, &s| t > s);

        let pick = |from_target: &Array2<f64>, from_source: &Array2<f64>| {
            Zip::from(&target_wins)
                .and(from_target)
                .and(from_source)
                .map_collect(|&wins, &t, &s| if wins { t } else { s })
        };

        Self {
            vertical: pick(&target.vertical, &source.vertical),
            horizontal: pick(&target.horizontal, &source.horizontal),
        }
    }

    /// Backward-difference divergence `B_N · v + h · B_Mᵀ`
    ///
    /// # Errors
    ///
    /// Returns an error if the field does not match the operator dimensions
    pub fn divergence(&self, operators: &PatchOperators) -> Result<Array2<f64>> {
        let vertical = operators.backward_rows.mul_dense(self.vertical.view())?;
        let horizontal = operators
            .backward_cols
            .dense_mul_transpose(self.horizontal.view())?;
        Ok(vertical + horizontal)
    }
}
