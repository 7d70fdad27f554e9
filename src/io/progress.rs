//! Per-channel solver progress display

use crate::cloning::solver::{IterationObserver, SolveReport};
use crate::io::configuration::{PROGRESS_BAR_WIDTH, PROGRESS_REFRESH_INTERVAL};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static PROGRESS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// One progress bar per channel, advanced by the solver
///
/// Bars are shared with the rayon workers solving each channel; indicatif
/// bars are internally synchronized.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    channel_bars: Vec<ProgressBar>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a progress manager with no bars
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            channel_bars: Vec::new(),
        }
    }

    /// Create one bar per channel, each sized to the iteration budget
    pub fn initialize(&mut self, channels: usize, max_iterations: usize) {
        for channel in 0..channels {
            let bar = ProgressBar::new(max_iterations as u64);
            bar.set_style(PROGRESS_STYLE.clone());
            bar.set_prefix(format!("channel {channel}"));
            self.channel_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Number of channel bars
    pub fn channel_count(&self) -> usize {
        self.channel_bars.len()
    }

    /// Position of a channel's bar, if it exists
    pub fn position(&self, channel: usize) -> Option<u64> {
        self.channel_bars.get(channel).map(ProgressBar::position)
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        for bar in &self.channel_bars {
            if !bar.is_finished() {
                bar.finish_and_clear();
            }
        }
        let _ = self.multi_progress.clear();
    }
}

impl IterationObserver for ProgressManager {
    fn on_iteration(&self, channel: usize, iteration: usize, relative_residual: f64) {
        if iteration % PROGRESS_REFRESH_INTERVAL != 0 {
            return;
        }
        if let Some(bar) = self.channel_bars.get(channel) {
            bar.set_position(iteration as u64);
            bar.set_message(format!("residual {relative_residual:.2e}"));
        }
    }

    fn on_finish(&self, channel: usize, report: &SolveReport) {
        if let Some(bar) = self.channel_bars.get(channel) {
            bar.set_position(report.iterations as u64);
            let mark = if report.converged() { "✓" } else { "✗" };
            // Leaves the bar at the iteration where the solve stopped
            bar.abandon_with_message(format!(
                "{mark} residual {:.2e}",
                report.relative_residual
            ));
        }
    }
}
