//! Raw video download using yt-dlp.
//!
//! Downloads always start from scratch: partial downloads are never
//! resumed and a failed download leaves no file behind.

use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info, warn};

use hdtf_models::watch_url;

use crate::command::ProcessRunner;
use crate::error::{MediaError, MediaResult};

/// Container format requested from the platform.
pub const DEFAULT_VIDEO_FORMAT: &str = "mp4";

/// Fetches one raw video to a local path.
#[async_trait]
pub trait VideoAcquirer: Send + Sync {
    /// Download `video_id` to `destination`, capped at `resolution` pixels high.
    ///
    /// Returns `false` on any failure; never leaves a partial file at `destination`.
    async fn acquire(&self, video_id: &str, destination: &Path, resolution: Option<u32>) -> bool;
}

/// [`VideoAcquirer`] backed by the yt-dlp CLI.
#[derive(Debug, Clone)]
pub struct YtDlpAcquirer {
    program: String,
    video_format: String,
    runner: ProcessRunner,
}

impl Default for YtDlpAcquirer {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlpAcquirer {
    pub fn new() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            video_format: DEFAULT_VIDEO_FORMAT.to_string(),
            runner: ProcessRunner::new(),
        }
    }

    /// Use a different yt-dlp binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_runner(mut self, runner: ProcessRunner) -> Self {
        self.runner = runner;
        self
    }

    /// yt-dlp format selector: best video-only stream, optionally height-capped.
    pub fn format_selector(&self, resolution: Option<u32>) -> String {
        let mut selector = format!("bestvideo[ext={}]", self.video_format);
        if let Some(height) = resolution {
            selector.push_str(&format!("[height<={}]", height));
        }
        selector
    }

    /// Build the yt-dlp arguments for one download.
    pub fn build_args(&self, video_id: &str, destination: &Path, resolution: Option<u32>) -> Vec<String> {
        vec![
            watch_url(video_id),
            "--quiet".to_string(),
            "-f".to_string(),
            self.format_selector(resolution),
            "--output".to_string(),
            destination.to_string_lossy().to_string(),
            "--no-continue".to_string(),
            "--no-part".to_string(),
        ]
    }

    /// Download a video, reporting the reason on failure.
    pub async fn download_video(
        &self,
        video_id: &str,
        destination: &Path,
        resolution: Option<u32>,
    ) -> MediaResult<()> {
        info!(
            video_id,
            output = %destination.display(),
            resolution = ?resolution,
            "Downloading video"
        );

        let args = self.build_args(video_id, destination, resolution);
        self.runner.run(&self.program, &args).await?;

        if !destination.exists() {
            return Err(MediaError::OutputMissing(destination.to_path_buf()));
        }

        let file_size = tokio::fs::metadata(destination).await?.len();
        info!(
            video_id,
            output = %destination.display(),
            size_mb = file_size as f64 / (1024.0 * 1024.0),
            "Downloaded video successfully"
        );

        Ok(())
    }
}

#[async_trait]
impl VideoAcquirer for YtDlpAcquirer {
    async fn acquire(&self, video_id: &str, destination: &Path, resolution: Option<u32>) -> bool {
        match self.download_video(video_id, destination, resolution).await {
            Ok(()) => true,
            Err(e) => {
                if e.is_interrupted() {
                    info!(video_id, error = %e, "Video download interrupted");
                } else {
                    warn!(video_id, error = %e, "Video download failed");
                }
                remove_partial(destination).await;
                false
            }
        }
    }
}

/// Remove whatever a failed tool run left at `path`.
pub(crate) async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial output"),
    }
}
