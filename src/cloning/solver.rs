//! Conjugate gradient solve of the constrained patch system
//!
//! The solver reports whether it reached tolerance; it never passes off an
//! exhausted iterate as a converged one.

use crate::cloning::boundary::LinearSystem;
use crate::io::configuration::{
    CURVATURE_EPSILON, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, SYMMETRY_TOLERANCE,
};
use crate::io::error::{Result, computation_error, invalid_parameter};
use log::debug;
use ndarray::{Array1, ArrayView1};

/// Stopping parameters for the iterative solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    /// Stop once `‖b - A·x‖ <= tolerance · ‖b‖`
    pub tolerance: f64,
    /// Upper bound on iterations
    pub max_iterations: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverSettings {
    /// Check that the tolerance is a positive finite number
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a non-positive or non-finite tolerance
    pub fn validate(&self) -> Result<()> {
        if self.tolerance.is_finite() && self.tolerance > 0.0 {
            Ok(())
        } else {
            Err(invalid_parameter(
                "tolerance",
                &self.tolerance,
                &"must be a positive finite number",
            ))
        }
    }
}

/// Outcome of the iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Residual reached the tolerance
    Converged,
    /// Iteration bound hit first; the iterate is only partial
    IterationLimit,
}

/// Result of a conjugate gradient solve
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    /// Final iterate
    pub solution: Array1<f64>,
    /// Iterations performed
    pub iterations: usize,
    /// `‖b - A·x‖ / ‖b‖` at the final iterate
    pub relative_residual: f64,
    /// Whether the tolerance was reached
    pub status: SolveStatus,
}

impl SolveReport {
    /// True when the tolerance was reached
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

/// Receives per-iteration progress from a running solve
pub trait IterationObserver: Send + Sync {
    /// Called after every iteration with the current relative residual
    fn on_iteration(&self, channel: usize, iteration: usize, relative_residual: f64);

    /// Called once when the solve for a channel has stopped
    fn on_finish(&self, channel: usize, report: &SolveReport);
}

/// Solve a symmetric positive definite system starting from `x0`
///
/// # Errors
///
/// Returns an error if `x0` has the wrong length, the settings are invalid,
/// the residual turns non-finite, or the curvature `pᵀAp` stops being positive
///
/// # Panics
///
/// In debug builds, panics if the matrix is not symmetric or has a
/// non-positive diagonal entry
pub fn conjugate_gradient(
    system: &LinearSystem,
    x0: ArrayView1<'_, f64>,
    settings: &SolverSettings,
    observer: Option<(&dyn IterationObserver, usize)>,
) -> Result<SolveReport> {
    settings.validate()?;
    let n = system.dimension();
    if x0.len() != n {
        return Err(computation_error(
            "conjugate gradient",
            &format!("initial guess of length {} for {n} unknowns", x0.len()),
        ));
    }
    debug_assert!(
        system.matrix.is_symmetric(SYMMETRY_TOLERANCE),
        "conjugate gradient requires a symmetric matrix"
    );
    debug_assert!(
        system.matrix.diagonal().iter().all(|&d| d > 0.0),
        "conjugate gradient requires a positive diagonal"
    );

    let b_norm = norm(system.rhs.view());
    if b_norm == 0.0 {
        return Ok(finish(
            SolveReport {
                solution: Array1::zeros(n),
                iterations: 0,
                relative_residual: 0.0,
                status: SolveStatus::Converged,
            },
            observer,
        ));
    }

    let mut x = x0.to_owned();
    let mut r = &system.rhs - &system.matrix.mul_vec(x.view())?;
    let mut p = r.clone();
    let mut rs_old = r.dot(&r);
    let threshold = settings.tolerance * b_norm;

    let mut iterations = 0;
    while rs_old.sqrt() > threshold && iterations < settings.max_iterations {
        let ap = system.matrix.mul_vec(p.view())?;
        let curvature = p.dot(&ap);
        if !curvature.is_finite() || curvature <= CURVATURE_EPSILON {
            return Err(computation_error(
                "conjugate gradient",
                &format!("curvature {curvature:e} at iteration {iterations}"),
            ));
        }

        let alpha = rs_old / curvature;
        x.scaled_add(alpha, &p);
        r.scaled_add(-alpha, &ap);

        let rs_new = r.dot(&r);
        if !rs_new.is_finite() {
            return Err(computation_error(
                "conjugate gradient",
                &format!("non-finite residual at iteration {iterations}"),
            ));
        }

        let beta = rs_new / rs_old;
        p.zip_mut_with(&r, |direction, &residual| {
            *direction = beta.mul_add(*direction, residual);
        });
        rs_old = rs_new;
        iterations += 1;

        if let Some((observer, channel)) = observer {
            observer.on_iteration(channel, iterations, rs_old.sqrt() / b_norm);
        }
    }

    let relative_residual = rs_old.sqrt() / b_norm;
    let status = if rs_old.sqrt() <= threshold {
        SolveStatus::Converged
    } else {
        SolveStatus::IterationLimit
    };
    debug!(
        "conjugate gradient on {n} unknowns: {status:?} after {iterations} iterations (relative residual {relative_residual:.3e})"
    );

    Ok(finish(
        SolveReport {
            solution: x,
            iterations,
            relative_residual,
            status,
        },
        observer,
    ))
}

fn finish(report: SolveReport, observer: Option<(&dyn IterationObserver, usize)>) -> SolveReport {
    if let Some((observer, channel)) = observer {
        observer.on_finish(channel, &report);
    }
    report
}

fn norm(v: ArrayView1<'_, f64>) -> f64 {
    v.dot(&v).sqrt()
}
