//! Aggregate progress of a pool run.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} jobs";

/// Counters shared by all workers of one run.
///
/// Workers only ever increment; totals are read once the run is over.
#[derive(Debug)]
pub struct PoolProgress {
    jobs_total: usize,
    jobs_completed: AtomicUsize,
    downloads_failed: AtomicUsize,
    clips_extracted: AtomicUsize,
    clips_failed: AtomicUsize,
    bar: ProgressBar,
}

impl PoolProgress {
    /// Create progress for `jobs_total` jobs, optionally drawing a terminal bar.
    pub fn new(jobs_total: usize, show_bar: bool) -> Self {
        let bar = if show_bar {
            let bar = ProgressBar::new(jobs_total as u64);
            let style = ProgressStyle::with_template(BAR_TEMPLATE)
                .map(|style| style.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            jobs_total,
            jobs_completed: AtomicUsize::new(0),
            downloads_failed: AtomicUsize::new(0),
            clips_extracted: AtomicUsize::new(0),
            clips_failed: AtomicUsize::new(0),
            bar,
        }
    }

    pub fn record_download_failed(&self) {
        self.downloads_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_clip(&self, success: bool) {
        if success {
            self.clips_extracted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.clips_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Mark a job as finished, whatever became of its download and clips.
    ///
    /// While the bar is drawn it already shows the count, so the log line
    /// drops to `debug` and is printed with the bar cleared.
    pub fn record_job_completed(&self, job: &str) {
        let completed = self.jobs_completed.fetch_add(1, Ordering::Relaxed) + 1;
        self.bar.inc(1);
        if self.bar.is_hidden() {
            info!(job, completed, total = self.jobs_total, "Job finished ({}/{})", completed, self.jobs_total);
        } else {
            self.bar.suspend(|| {
                debug!(job, completed, total = self.jobs_total, "Job finished ({}/{})", completed, self.jobs_total);
            });
        }
    }

    /// Stop drawing and snapshot the counters.
    pub fn finish(&self) -> PoolSummary {
        self.bar.finish_and_clear();
        self.summary()
    }

    pub fn summary(&self) -> PoolSummary {
        PoolSummary {
            jobs_total: self.jobs_total,
            jobs_completed: self.jobs_completed.load(Ordering::Relaxed),
            downloads_failed: self.downloads_failed.load(Ordering::Relaxed),
            clips_extracted: self.clips_extracted.load(Ordering::Relaxed),
            clips_failed: self.clips_failed.load(Ordering::Relaxed),
        }
    }
}

/// Final counts of a pool run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSummary {
    pub jobs_total: usize,
    pub jobs_completed: usize,
    pub downloads_failed: usize,
    pub clips_extracted: usize,
    pub clips_failed: usize,
}

impl PoolSummary {
    /// True when every job ran and nothing failed.
    pub fn is_clean(&self) -> bool {
        self.jobs_completed == self.jobs_total && self.downloads_failed == 0 && self.clips_failed == 0
    }
}

impl fmt::Display for PoolSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} jobs completed, {} downloads failed, {} clips extracted, {} clips failed",
            self.jobs_completed, self.jobs_total, self.downloads_failed, self.clips_extracted, self.clips_failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let progress = PoolProgress::new(3, false);
        progress.record_download_failed();
        progress.record_job_completed("RD_a");
        progress.record_clip(true);
        progress.record_clip(true);
        progress.record_clip(false);
        progress.record_job_completed("RD_b");

        let summary = progress.finish();
        assert_eq!(
            summary,
            PoolSummary {
                jobs_total: 3,
                jobs_completed: 2,
                downloads_failed: 1,
                clips_extracted: 2,
                clips_failed: 1,
            }
        );
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_counts_with_bar_requested() {
        let progress = PoolProgress::new(2, true);
        progress.record_clip(true);
        progress.record_job_completed("WDA_a");
        progress.record_job_completed("WDA_b");

        let summary = progress.finish();
        assert_eq!(summary.jobs_completed, 2);
        assert_eq!(summary.clips_extracted, 1);
    }

    #[test]
    fn test_hidden_bar_is_not_drawn() {
        assert!(PoolProgress::new(2, false).bar.is_hidden());
    }

    #[test]
    fn test_summary_display() {
        let summary = PoolSummary {
            jobs_total: 2,
            jobs_completed: 2,
            clips_extracted: 5,
            ..Default::default()
        };
        assert!(summary.is_clean());
        assert_eq!(
            summary.to_string(),
            "2/2 jobs completed, 0 downloads failed, 5 clips extracted, 0 clips failed"
        );
    }
}
