use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::batch::{BatchObserver, BatchProgress};
use crate::reconcile::ReconciledRow;

/// Terminal progress bar for a batch run.
pub struct ProgressTracker {
    progress_bar: ProgressBar,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { progress_bar: pb }
    }

    /// A tracker that draws nothing, for non-interactive runs.
    pub fn hidden() -> Self {
        Self {
            progress_bar: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self, progress: &BatchProgress) {
        self.progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        self.progress_bar.finish_with_message(format!(
            "Complete: {} rows from {} filings ({} failed)",
            progress.rows, progress.with_rows, progress.failed
        ));
    }
}

impl BatchObserver for ProgressTracker {
    fn on_progress(&mut self, progress: &BatchProgress, results: &[ReconciledRow]) {
        self.progress_bar.set_position(progress.processed as u64);
        self.progress_bar.set_message(format!(
            "{} share classes, {} failed",
            results.len(),
            progress.failed
        ));
    }
}
