//! Run metrics.
//!
//! Counters are recorded through the `metrics` facade; with no recorder
//! installed they are no-ops.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const DOWNLOADS_TOTAL: &str = "hdtf_downloads_total";
    pub const DOWNLOAD_DURATION_SECONDS: &str = "hdtf_download_duration_seconds";
    pub const CLIPS_TOTAL: &str = "hdtf_clips_total";
    pub const CLIP_DURATION_SECONDS: &str = "hdtf_clip_duration_seconds";
    pub const JOBS_COMPLETED_TOTAL: &str = "hdtf_jobs_completed_total";
}

fn status_label(success: bool) -> &'static str {
    if success {
        "ok"
    } else {
        "failed"
    }
}

/// Record a raw video download attempt.
pub fn record_download(success: bool, duration_secs: f64) {
    let labels = [("status", status_label(success))];
    counter!(names::DOWNLOADS_TOTAL, &labels).increment(1);
    histogram!(names::DOWNLOAD_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a clip extraction attempt.
pub fn record_clip(success: bool, duration_secs: f64) {
    let labels = [("status", status_label(success))];
    counter!(names::CLIPS_TOTAL, &labels).increment(1);
    histogram!(names::CLIP_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_job_completed() {
    counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
}
