//! Per-channel orchestration of a seamless clone
//!
//! The compositor validates the placement, builds (or reuses) operators for
//! the patch size, runs the selected policy on every channel and writes the
//! clipped result into a copy of the target. Inputs are only borrowed, so a
//! failed clone leaves the caller's target exactly as it was.

use crate::cloning::boundary::{constrain, seed_boundary};
use crate::cloning::guidance::CloneMode;
use crate::cloning::solver::{IterationObserver, SolverSettings, conjugate_gradient};
use crate::io::error::{CloneError, Result, computation_error, invalid_parameter};
use crate::operators::cache::{CacheStats, OperatorCache};
use crate::operators::differential::PatchOperators;
use crate::spatial::layout::{flatten_column_major, unflatten_column_major};
use crate::spatial::region::{PatchRegion, clip_plane, first_non_finite};
use log::{debug, warn};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;
use std::sync::Arc;

/// Parameters of a clone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloneConfig {
    /// Blending policy
    pub mode: CloneMode,
    /// Stopping parameters of the iterative solve
    pub solver: SolverSettings,
    /// Dispatch channels to the rayon pool
    pub parallel: bool,
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            mode: CloneMode::Laplacian,
            solver: SolverSettings::default(),
            parallel: true,
        }
    }
}

impl CloneConfig {
    /// Default configuration for a given mode
    pub fn with_mode(mode: CloneMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Solver statistics of one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelReport {
    /// Channel index
    pub channel: usize,
    /// Conjugate gradient iterations
    pub iterations: usize,
    /// Final relative residual
    pub relative_residual: f64,
}

/// Composited image together with per-channel solver statistics
///
/// `reports` is empty for naive clones, which never solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite<I> {
    /// Target copy with the patch region replaced
    pub image: I,
    /// One entry per solved channel, in channel order
    pub reports: Vec<ChannelReport>,
}

/// Seamless cloning engine
///
/// Holds an operator cache, so repeated clones of equally sized patches reuse
/// their sparse operators.
pub struct PatchCompositor {
    config: CloneConfig,
    cache: OperatorCache,
    observer: Option<Arc<dyn IterationObserver>>,
}

impl PatchCompositor {
    /// Create a compositor with an empty operator cache
    pub fn new(config: CloneConfig) -> Self {
        Self {
            config,
            cache: OperatorCache::new(),
            observer: None,
        }
    }

    /// Report solver progress to `observer`
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn IterationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Active configuration
    pub const fn config(&self) -> &CloneConfig {
        &self.config
    }

    /// Operator cache hit and miss counts
    pub const fn cache_stats(&self) -> CacheStats {
        self.cache.stats
    }

    /// Clone a single-channel `source` into `target` with its top-left corner at `offset`
    ///
    /// # Errors
    ///
    /// Returns an error if the patch is empty or out of bounds, any pixel of
    /// either input is non-finite, the solve fails, or it exhausts its
    /// iteration budget
    pub fn composite_plane(
        &mut self,
        target: ArrayView2<'_, f64>,
        source: ArrayView2<'_, f64>,
        offset: (usize, usize),
    ) -> Result<Composite<Array2<f64>>> {
        let region = self.prepare(target.dim(), source.dim(), offset)?;
        ensure_finite(target, source)?;
        let operators = self.operators_for(region)?;

        let (image, report) = composite_channel(
            0,
            target,
            source,
            region,
            &self.config,
            operators.as_deref(),
            self.observer.as_deref(),
        )?;

        Ok(Composite {
            image,
            reports: report.into_iter().collect(),
        })
    }

    /// Clone a `(rows, cols, channels)` source into a target with as many channels
    ///
    /// Channels are independent and run in parallel when configured; they
    /// share one set of operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel counts differ, the patch is empty or
    /// out of bounds, any pixel of either input is non-finite, or any
    /// channel's solve fails or exhausts its iteration budget
    pub fn composite(
        &mut self,
        target: ArrayView3<'_, f64>,
        source: ArrayView3<'_, f64>,
        offset: (usize, usize),
    ) -> Result<Composite<Array3<f64>>> {
        let (target_rows, target_cols, channels) = target.dim();
        let (source_rows, source_cols, source_channels) = source.dim();
        if channels != source_channels {
            return Err(CloneError::ChannelMismatch {
                target: channels,
                source: source_channels,
            });
        }
        if channels == 0 {
            return Err(invalid_parameter(
                "channels",
                &channels,
                &"images must have at least one channel",
            ));
        }

        let region = self.prepare(
            (target_rows, target_cols),
            (source_rows, source_cols),
            offset,
        )?;
        for channel in 0..channels {
            ensure_finite(
                target.index_axis(Axis(2), channel),
                source.index_axis(Axis(2), channel),
            )?;
        }
        let operators = self.operators_for(region)?;

        let config = &self.config;
        let observer = self.observer.as_deref();
        let run = |channel: usize| {
            composite_channel(
                channel,
                target.index_axis(Axis(2), channel),
                source.index_axis(Axis(2), channel),
                region,
                config,
                operators.as_deref(),
                observer,
            )
        };

        let results: Vec<(Array2<f64>, Option<ChannelReport>)> = if config.parallel {
            (0..channels).into_par_iter().map(run).collect::<Result<_>>()?
        } else {
            (0..channels).map(run).collect::<Result<_>>()?
        };

        let planes: Vec<ArrayView2<'_, f64>> = results.iter().map(|(plane, _)| plane.view()).collect();
        let image = ndarray::stack(Axis(2), &planes)?;
        let reports = results.iter().filter_map(|(_, report)| *report).collect();

        Ok(Composite { image, reports })
    }

    fn prepare(
        &self,
        target: (usize, usize),
        source: (usize, usize),
        offset: (usize, usize),
    ) -> Result<PatchRegion> {
        if self.config.mode.guidance().is_some() {
            self.config.solver.validate()?;
        }
        let region = PatchRegion::new(offset.0, offset.1, source.0, source.1);
        region.validate_within(target)?;
        debug!(
            "{} clone of {}x{} patch at ({}, {})",
            self.config.mode.name(),
            region.rows,
            region.cols,
            region.top,
            region.left
        );
        Ok(region)
    }

    fn operators_for(&mut self, region: PatchRegion) -> Result<Option<Arc<PatchOperators>>> {
        if self.config.mode.guidance().is_none() {
            return Ok(None);
        }
        self.cache.get_or_build(region.rows, region.cols).map(Some)
    }
}

fn ensure_finite(target: ArrayView2<'_, f64>, source: ArrayView2<'_, f64>) -> Result<()> {
    if let Some((row, col)) = first_non_finite(source) {
        return Err(CloneError::NonFiniteInput {
            image: "source",
            row,
            col,
        });
    }
    if let Some((row, col)) = first_non_finite(target) {
        return Err(CloneError::NonFiniteInput {
            image: "target",
            row,
            col,
        });
    }
    Ok(())
}

fn composite_channel(
    channel: usize,
    target: ArrayView2<'_, f64>,
    source: ArrayView2<'_, f64>,
    region: PatchRegion,
    config: &CloneConfig,
    operators: Option<&PatchOperators>,
    observer: Option<&dyn IterationObserver>,
) -> Result<(Array2<f64>, Option<ChannelReport>)> {
    let Some(policy) = config.mode.guidance() else {
        return Ok((region.paste(target, source), None));
    };
    let operators = operators.ok_or_else(|| {
        computation_error("composite", &"guided clone requested without operators")
    })?;

    let target_region = region.view(target);
    let reference = flatten_column_major(target_region);
    let guidance = policy.build(source, target_region, operators)?;
    let system = constrain(
        &operators.laplacian,
        guidance.view(),
        &operators.boundary,
        reference.view(),
    )?;
    let x0 = seed_boundary(
        policy.warm_start(source, target_region).view(),
        &operators.boundary,
        reference.view(),
    );

    let report = conjugate_gradient(
        &system,
        x0.view(),
        &config.solver,
        observer.map(|observer| (observer, channel)),
    )?;
    if !report.converged() {
        warn!(
            "channel {channel} stopped after {} iterations at relative residual {:.3e}",
            report.iterations, report.relative_residual
        );
        return Err(CloneError::NonConvergence {
            channel,
            iterations: report.iterations,
            relative_residual: report.relative_residual,
        });
    }

    let channel_report = ChannelReport {
        channel,
        iterations: report.iterations,
        relative_residual: report.relative_residual,
    };
    let mut patch = unflatten_column_major(report.solution, region.rows, region.cols)?;
    clip_plane(&mut patch);

    Ok((region.paste(target, patch.view()), Some(channel_report)))
}
