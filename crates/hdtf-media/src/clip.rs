//! Clip extraction: trim an interval from a raw video and crop it.

use async_trait::async_trait;
use std::path::Path;
use tracing::{info, warn};

use hdtf_models::{CropRect, Interval};

use crate::command::{FfmpegCommand, ProcessRunner};
use crate::download::remove_partial;
use crate::error::{MediaError, MediaResult};

/// Cuts one clip out of a raw video.
#[async_trait]
pub trait ClipExtractor: Send + Sync {
    /// Trim `interval` from `raw_path`, crop it and write `output_path`.
    ///
    /// Returns `false` on any failure.
    async fn extract(
        &self,
        raw_path: &Path,
        output_path: &Path,
        interval: &Interval,
        crop: &CropRect,
    ) -> bool;
}

/// [`ClipExtractor`] backed by the FFmpeg CLI.
///
/// Video is re-encoded through the crop filter; audio is copied as is.
#[derive(Debug, Clone)]
pub struct FfmpegClipExtractor {
    program: String,
    runner: ProcessRunner,
}

impl Default for FfmpegClipExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegClipExtractor {
    pub fn new() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            runner: ProcessRunner::new(),
        }
    }

    /// Use a different FFmpeg binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_runner(mut self, runner: ProcessRunner) -> Self {
        self.runner = runner;
        self
    }

    /// Build the FFmpeg command for one clip.
    pub fn build_command(
        raw_path: &Path,
        output_path: &Path,
        interval: &Interval,
        crop: &CropRect,
    ) -> FfmpegCommand {
        FfmpegCommand::new(raw_path, output_path)
            .trim(interval.start.as_str(), interval.end.as_str())
            .video_filter(crop.filter())
            .audio_codec("copy")
    }

    /// Extract a clip, reporting the reason on failure.
    pub async fn extract_clip(
        &self,
        raw_path: &Path,
        output_path: &Path,
        interval: &Interval,
        crop: &CropRect,
    ) -> MediaResult<()> {
        if !raw_path.exists() {
            return Err(MediaError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("raw video {} does not exist", raw_path.display()),
            )));
        }

        info!(
            "Extracting clip: {} -> {} ({}, {:.2}s, {})",
            raw_path.display(),
            output_path.display(),
            interval,
            interval.duration_secs(),
            crop.filter()
        );

        let cmd = Self::build_command(raw_path, output_path, interval, crop);
        self.runner.run(&self.program, &cmd.build_args()).await?;

        if !output_path.exists() {
            return Err(MediaError::OutputMissing(output_path.to_path_buf()));
        }

        Ok(())
    }
}

#[async_trait]
impl ClipExtractor for FfmpegClipExtractor {
    async fn extract(
        &self,
        raw_path: &Path,
        output_path: &Path,
        interval: &Interval,
        crop: &CropRect,
    ) -> bool {
        match self.extract_clip(raw_path, output_path, interval, crop).await {
            Ok(()) => true,
            Err(e) if e.is_interrupted() => {
                info!(output = %output_path.display(), error = %e, "Clip extraction interrupted");
                remove_partial(output_path).await;
                false
            }
            Err(e) => {
                warn!(output = %output_path.display(), error = %e, "Clip extraction failed");
                remove_partial(output_path).await;
                false
            }
        }
    }
}
