//! Worker configuration.

use std::time::Duration;

use crate::error::{WorkerError, WorkerResult};

/// Default number of parallel workers.
pub const DEFAULT_NUM_WORKERS: usize = 8;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of jobs processed in parallel
    pub num_workers: usize,
    /// yt-dlp binary
    pub ytdlp_program: String,
    /// FFmpeg binary
    pub ffmpeg_program: String,
    /// Limit for one raw download (`None` = unlimited)
    pub download_timeout: Option<Duration>,
    /// Limit for one clip extraction (`None` = unlimited)
    pub clip_timeout: Option<Duration>,
    /// Draw a terminal progress bar
    pub progress_bar: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_NUM_WORKERS,
            ytdlp_program: "yt-dlp".to_string(),
            ffmpeg_program: "ffmpeg".to_string(),
            download_timeout: None,
            clip_timeout: None,
            progress_bar: true,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    ///
    /// Timeouts are given in seconds; `0` disables them.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            num_workers: std::env::var("HDTF_NUM_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.num_workers),
            ytdlp_program: std::env::var("HDTF_YTDLP_BIN").unwrap_or(defaults.ytdlp_program),
            ffmpeg_program: std::env::var("HDTF_FFMPEG_BIN").unwrap_or(defaults.ffmpeg_program),
            download_timeout: timeout_from_env("HDTF_DOWNLOAD_TIMEOUT_SECS"),
            clip_timeout: timeout_from_env("HDTF_CLIP_TIMEOUT_SECS"),
            progress_bar: std::env::var("HDTF_PROGRESS_BAR")
                .map(|v| v != "0" && v.to_lowercase() != "false")
                .unwrap_or(defaults.progress_bar),
        }
    }

    /// Set the number of workers.
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    pub fn validate(&self) -> WorkerResult<()> {
        if self.num_workers == 0 {
            return Err(WorkerError::config_error("number of workers must be at least 1"));
        }
        Ok(())
    }
}

fn timeout_from_env(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs)
}
