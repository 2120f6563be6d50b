//! Video job model and output path layout.

use std::path::{Path, PathBuf};

use crate::clip::ClipSpec;

/// Directory under the output root holding full raw downloads.
pub const RAW_VIDEOS_DIR: &str = "_videos_raw";

/// The unit of work for one raw video plus all of its derived clips.
///
/// Built once by the annotation joiner and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoJob {
    /// Subset-prefixed video name, unique across the job list.
    pub name: String,
    /// Platform identifier extracted from the video URL.
    pub video_id: String,
    /// Maximum vertical resolution to request; `None` is unconstrained.
    pub resolution: Option<u32>,
    /// Clips in annotation order with gaps removed. Never empty.
    pub clips: Vec<ClipSpec>,
    /// Destination root.
    pub output_dir: PathBuf,
}

impl VideoJob {
    /// Where the raw download for this job is written.
    pub fn raw_video_path(&self) -> PathBuf {
        raw_videos_dir(&self.output_dir).join(format!("{}.mp4", self.name))
    }

    /// Where the clip at `position` in [`VideoJob::clips`] is written.
    pub fn clip_output_path(&self, position: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}_{:03}.mp4", self.name, position))
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }
}

/// `{output_dir}/_videos_raw`
pub fn raw_videos_dir(output_dir: impl AsRef<Path>) -> PathBuf {
    output_dir.as_ref().join(RAW_VIDEOS_DIR)
}
