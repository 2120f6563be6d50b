//! Shared data models for the HDTF dataset downloader.
//!
//! This crate provides the types passed between the annotation joiner,
//! the media tools and the worker pool:
//! - Dataset subsets and annotation file naming
//! - Clip intervals, crop rectangles and clip specs
//! - Video jobs and their output path layout
//! - Video identifier extraction from platform URLs

pub mod clip;
pub mod job;
pub mod subset;
pub mod timestamp;
pub mod utils;

pub use clip::{ClipSpec, CropRect, Interval, ModelError, INTERVAL_SEPARATOR};
pub use job::{raw_videos_dir, VideoJob, RAW_VIDEOS_DIR};
pub use subset::{AnnotationKind, Subset, SubsetParseError};
pub use timestamp::{Timestamp, TimestampError};
pub use utils::{extract_video_id, watch_url, VideoIdError};
