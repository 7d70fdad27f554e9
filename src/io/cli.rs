//! Command-line interface for cloning a source image into a target image file

use crate::cloning::compositor::{CloneConfig, PatchCompositor};
use crate::cloning::guidance::CloneMode;
use crate::cloning::solver::{IterationObserver, SolverSettings};
use crate::io::configuration::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, OUTPUT_EXTENSION};
use crate::io::error::Result;
use crate::io::image::{load_planes, save_planes};
use crate::io::progress::ProgressManager;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "seamclone")]
#[command(
    author,
    version,
    about = "Seamlessly clone a source image into a target image"
)]
/// Command-line arguments for the cloning tool
pub struct Cli {
    /// Target image the patch is cloned into
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Source image used as the patch
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Target row of the patch's top-left corner
    #[arg(short = 'y', long)]
    pub top: usize,

    /// Target column of the patch's top-left corner
    #[arg(short = 'x', long)]
    pub left: usize,

    /// Blending policy
    #[arg(short, long, value_enum, default_value_t = CloneMode::Laplacian)]
    pub mode: CloneMode,

    /// Relative residual tolerance of the solver
    #[arg(short, long, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: f64,

    /// Maximum solver iterations per channel
    #[arg(short = 'i', long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    /// Output path (defaults to `<target>_<mode>.png` beside the target)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Solve channels one after another instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Clone configuration described by the arguments
    pub const fn clone_config(&self) -> CloneConfig {
        CloneConfig {
            mode: self.mode,
            solver: SolverSettings {
                tolerance: self.tolerance,
                max_iterations: self.max_iterations,
            },
            parallel: !self.sequential,
        }
    }

    /// Destination of the composited image
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stem = self
                .target
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            self.target
                .with_file_name(format!("{stem}_{}.{OUTPUT_EXTENSION}", self.mode.name()))
        })
    }
}

/// Runs one clone described by the command line
pub struct CloneRunner {
    cli: Cli,
}

impl CloneRunner {
    /// Create a runner for the given CLI arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Load both images, clone, and write the result
    ///
    /// Returns the path that was written.
    ///
    /// # Errors
    ///
    /// Returns an error if either image cannot be loaded, the clone fails, or
    /// the output cannot be written
    pub fn run(&self) -> Result<PathBuf> {
        let target = load_planes(&self.cli.target)?;
        let source = load_planes(&self.cli.source)?;
        let (target_rows, target_cols, channels) = target.dim();
        let (source_rows, source_cols, _) = source.dim();
        info!(
            "cloning {} ({source_rows}x{source_cols}) into {} ({target_rows}x{target_cols}) at ({}, {})",
            self.cli.source.display(),
            self.cli.target.display(),
            self.cli.top,
            self.cli.left
        );

        let config = self.cli.clone_config();
        let mut compositor = PatchCompositor::new(config);
        let progress = (self.cli.should_show_progress() && config.mode.guidance().is_some())
            .then(|| {
                let mut manager = ProgressManager::new();
                manager.initialize(channels, config.solver.max_iterations);
                Arc::new(manager)
            });
        if let Some(manager) = &progress {
            let observer: Arc<dyn IterationObserver> = manager.clone();
            compositor = compositor.with_observer(observer);
        }

        let started = Instant::now();
        let result =
            compositor.composite(target.view(), source.view(), (self.cli.top, self.cli.left));
        if let Some(manager) = &progress {
            manager.finish();
        }
        let composite = result?;

        for report in &composite.reports {
            info!(
                "channel {} converged in {} iterations (relative residual {:.3e})",
                report.channel, report.iterations, report.relative_residual
            );
        }

        let output = self.cli.output_path();
        save_planes(composite.image.view(), &output)?;
        info!("wrote {} in {:.2?}", output.display(), started.elapsed());
        Ok(output)
    }
}
