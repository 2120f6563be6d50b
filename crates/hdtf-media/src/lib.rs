//! External tool wrappers for video acquisition and clip extraction.
//!
//! This crate provides:
//! - A process runner with timeout and cancellation support
//! - Type-safe FFmpeg command building
//! - Raw video download through yt-dlp
//! - Trim-and-crop clip extraction through FFmpeg

pub mod clip;
pub mod command;
pub mod download;
pub mod error;

pub use clip::{ClipExtractor, FfmpegClipExtractor};
pub use command::{check_tool, FfmpegCommand, ProcessRunner};
pub use download::{VideoAcquirer, YtDlpAcquirer, DEFAULT_VIDEO_FORMAT};
pub use error::{MediaError, MediaResult};
