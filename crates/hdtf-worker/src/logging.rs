//! Structured job logging utilities.

use tracing::{info, warn, Span};

/// Job logger for structured logging with consistent formatting.
///
/// Every event carries the job name and the pipeline stage.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job: String,
    stage: &'static str,
}

impl JobLogger {
    /// Create a logger for a job at the download stage.
    pub fn new(job: &str) -> Self {
        Self {
            job: job.to_string(),
            stage: "download",
        }
    }

    /// Same job, different pipeline stage.
    pub fn stage(&self, stage: &'static str) -> Self {
        Self {
            job: self.job.clone(),
            stage,
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(job = %self.job, stage = self.stage, "Job started: {}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(job = %self.job, stage = self.stage, "Job warning: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(job = %self.job, stage = self.stage, "Job completed: {}", message);
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("job", job = %self.job)
    }
}
