//! Annotation joiner.
//!
//! Correlates the four annotation files of each subset by video and clip
//! name and produces the ordered job list:
//!
//! 1. Videos without intervals are dropped
//! 2. Videos with a missing, ambiguous or unusable resolution are dropped
//! 3. Clips without a crop are dropped, keeping the remaining order
//! 4. Videos left without clips are dropped
//!
//! None of the above is an error. Only structurally corrupt files are.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use hdtf_models::{extract_video_id, ClipSpec, Subset, VideoJob};

use crate::error::{AnnotationError, AnnotationResult};
use crate::subset_annotations::SubsetAnnotations;

/// Counts of candidates removed by the exclusion policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub videos_seen: usize,
    pub missing_intervals: usize,
    pub missing_resolution: usize,
    pub ambiguous_resolution: usize,
    pub invalid_resolution: usize,
    pub clips_without_crop: usize,
    pub videos_without_clips: usize,
    pub jobs: usize,
    pub clips: usize,
}

impl JoinStats {
    fn merge(&mut self, other: &JoinStats) {
        self.videos_seen += other.videos_seen;
        self.missing_intervals += other.missing_intervals;
        self.missing_resolution += other.missing_resolution;
        self.ambiguous_resolution += other.ambiguous_resolution;
        self.invalid_resolution += other.invalid_resolution;
        self.clips_without_crop += other.clips_without_crop;
        self.videos_without_clips += other.videos_without_clips;
        self.jobs += other.jobs;
        self.clips += other.clips;
    }

    /// Number of videos dropped for any reason.
    pub fn videos_dropped(&self) -> usize {
        self.missing_intervals
            + self.missing_resolution
            + self.ambiguous_resolution
            + self.invalid_resolution
            + self.videos_without_clips
    }
}

/// Outcome of inspecting a resolution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolutionCheck {
    Constrained(u32),
    Unconstrained,
    Missing,
    Ambiguous,
    Invalid,
}

fn check_resolution(fields: Option<&[String]>) -> ResolutionCheck {
    match fields {
        None => ResolutionCheck::Missing,
        Some([]) => ResolutionCheck::Unconstrained,
        Some([height]) => match height.parse::<u32>() {
            Ok(h) if h > 0 => ResolutionCheck::Constrained(h),
            _ => ResolutionCheck::Invalid,
        },
        Some(_) => ResolutionCheck::Ambiguous,
    }
}

/// Join one subset's annotations into jobs.
///
/// Pure over the loaded tables: the same input always yields the same list.
/// Videos come out in URL-file order, clips in interval-file order.
pub fn join_subset(
    annotations: &SubsetAnnotations,
    output_dir: &Path,
    stats: &mut JoinStats,
) -> AnnotationResult<Vec<VideoJob>> {
    let subset = annotations.subset;
    let mut jobs = Vec::new();

    for record in annotations.video_urls.iter() {
        stats.videos_seen += 1;
        let video = record.key.as_str();
        let video_file = format!("{}.mp4", video);

        let Some(intervals) = annotations.intervals.get(&video_file) else {
            debug!(subset = %subset, video, "No intervals, skipping video");
            stats.missing_intervals += 1;
            continue;
        };

        let resolution = annotations
            .resolutions
            .get(&video_file)
            .map(|r| r.fields.as_slice());
        let resolution = match check_resolution(resolution) {
            ResolutionCheck::Constrained(h) => Some(h),
            ResolutionCheck::Unconstrained => None,
            ResolutionCheck::Missing => {
                debug!(subset = %subset, video, "No resolution, skipping video");
                stats.missing_resolution += 1;
                continue;
            }
            ResolutionCheck::Ambiguous => {
                debug!(subset = %subset, video, "Ambiguous resolution, skipping video");
                stats.ambiguous_resolution += 1;
                continue;
            }
            ResolutionCheck::Invalid => {
                debug!(subset = %subset, video, "Unparsable resolution, skipping video");
                stats.invalid_resolution += 1;
                continue;
            }
        };

        let mut clips = Vec::with_capacity(intervals.len());
        for (source_index, interval) in intervals.iter().enumerate() {
            let clip_name = format!("{}_{}.mp4", video, source_index);
            match annotations.crops.get(&clip_name) {
                Some(crop) => clips.push(ClipSpec {
                    source_index,
                    interval: interval.clone(),
                    crop: *crop,
                }),
                None => stats.clips_without_crop += 1,
            }
        }

        if clips.is_empty() {
            debug!(subset = %subset, video, "No clip has a crop, skipping video");
            stats.videos_without_clips += 1;
            continue;
        }

        // record.fields has exactly one entry, checked when the table was loaded.
        let url = &record.fields[0];
        let video_id = extract_video_id(url).map_err(|source| AnnotationError::VideoId {
            path: annotations.video_urls.path().to_path_buf(),
            line: record.line,
            video: video.to_string(),
            source,
        })?;

        stats.jobs += 1;
        stats.clips += clips.len();
        jobs.push(VideoJob {
            name: format!("{}_{}", subset, video),
            video_id,
            resolution,
            clips,
            output_dir: output_dir.to_path_buf(),
        });
    }

    Ok(jobs)
}

/// Builds the job list for a dataset directory.
#[derive(Debug, Clone)]
pub struct AnnotationJoiner {
    source_dir: PathBuf,
    output_dir: PathBuf,
    subsets: Vec<Subset>,
}

impl AnnotationJoiner {
    /// Joiner over all known subsets.
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            subsets: Subset::ALL.to_vec(),
        }
    }

    /// Restrict to the given subsets. Jobs follow the order given here.
    pub fn with_subsets(mut self, subsets: impl IntoIterator<Item = Subset>) -> Self {
        self.subsets = subsets.into_iter().collect();
        self
    }

    /// Load every subset and join it, concatenating in subset order.
    pub async fn build_jobs(&self) -> AnnotationResult<(Vec<VideoJob>, JoinStats)> {
        let mut jobs = Vec::new();
        let mut total = JoinStats::default();

        for &subset in &self.subsets {
            let annotations = SubsetAnnotations::load(&self.source_dir, subset).await?;
            let mut stats = JoinStats::default();
            let subset_jobs = join_subset(&annotations, &self.output_dir, &mut stats)?;

            info!(
                subset = %subset,
                jobs = stats.jobs,
                clips = stats.clips,
                dropped_videos = stats.videos_dropped(),
                dropped_clips = stats.clips_without_crop,
                "Joined subset annotations"
            );

            total.merge(&stats);
            jobs.extend(subset_jobs);
        }

        Ok((jobs, total))
    }
}
