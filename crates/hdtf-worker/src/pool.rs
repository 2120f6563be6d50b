//! Fixed-size task pool running the download-then-extract pipeline.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, Instrument};

use hdtf_media::{ClipExtractor, VideoAcquirer};
use hdtf_models::VideoJob;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::progress::{PoolProgress, PoolSummary};

/// Shared job queue. Jobs are moved out one at a time.
type JobQueue = Arc<Mutex<std::vec::IntoIter<VideoJob>>>;

/// What happened to one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The raw video could not be acquired; no clips were attempted.
    DownloadFailed,
    /// Every clip was attempted.
    Processed { clips_extracted: usize, clips_failed: usize },
    /// Shutdown was requested before every clip was attempted.
    Interrupted { clips_extracted: usize, clips_failed: usize },
}

/// Runs video jobs across a fixed number of workers.
///
/// Each worker owns one job at a time. Within a job the raw video is
/// acquired once, then clips are extracted strictly in order.
#[derive(Clone)]
pub struct TaskPool {
    acquirer: Arc<dyn VideoAcquirer>,
    extractor: Arc<dyn ClipExtractor>,
    num_workers: usize,
    progress_bar: bool,
    shutdown_rx: Option<watch::Receiver<bool>>,
}

impl TaskPool {
    pub fn new(
        acquirer: Arc<dyn VideoAcquirer>,
        extractor: Arc<dyn ClipExtractor>,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            acquirer,
            extractor,
            num_workers: config.num_workers,
            progress_bar: config.progress_bar,
            shutdown_rx: None,
        }
    }

    /// Stop pulling jobs once `true` is sent on this channel.
    pub fn with_shutdown(mut self, shutdown_rx: watch::Receiver<bool>) -> Self {
        self.shutdown_rx = Some(shutdown_rx);
        self
    }

    /// Process all jobs and return the aggregate counts.
    ///
    /// Job and clip failures are counted, never returned as errors.
    pub async fn run(&self, jobs: Vec<VideoJob>) -> WorkerResult<PoolSummary> {
        if self.num_workers == 0 {
            return Err(WorkerError::config_error("number of workers must be at least 1"));
        }

        let progress = Arc::new(PoolProgress::new(jobs.len(), self.progress_bar));
        if jobs.is_empty() {
            info!("No jobs to run");
            return Ok(progress.finish());
        }

        let workers = self.num_workers.min(jobs.len());
        info!(jobs = jobs.len(), workers, "Starting task pool");

        let queue: JobQueue = Arc::new(Mutex::new(jobs.into_iter()));
        let handles: Vec<_> = (0..workers)
            .map(|worker_id| {
                let pool = self.clone();
                let queue = Arc::clone(&queue);
                let progress = Arc::clone(&progress);
                tokio::spawn(async move { pool.worker_loop(worker_id, queue, progress).await })
            })
            .collect();

        for result in futures::future::join_all(handles).await {
            result.map_err(|e| WorkerError::worker_failed(e.to_string()))?;
        }

        let summary = progress.finish();
        info!(
            jobs_total = summary.jobs_total,
            jobs_completed = summary.jobs_completed,
            downloads_failed = summary.downloads_failed,
            clips_extracted = summary.clips_extracted,
            clips_failed = summary.clips_failed,
            "Task pool finished"
        );
        Ok(summary)
    }

    async fn worker_loop(&self, worker_id: usize, queue: JobQueue, progress: Arc<PoolProgress>) {
        loop {
            if self.is_shutting_down() {
                debug!(worker_id, "Shutdown requested, worker stopping");
                break;
            }

            // Lock is released before the job runs.
            let next = queue.lock().await.next();
            let Some(job) = next else {
                break;
            };

            let logger = JobLogger::new(&job.name);
            let outcome = self
                .process_job(&job, &progress, &logger)
                .instrument(logger.create_span())
                .await;

            if !matches!(outcome, JobOutcome::Interrupted { .. }) {
                progress.record_job_completed(&job.name);
                metrics::record_job_completed();
            }
        }
    }

    /// Acquire the raw video of `job`, then extract each of its clips.
    ///
    /// `logger` is the caller's logger for this job, at the download stage.
    pub async fn process_job(&self, job: &VideoJob, progress: &PoolProgress, logger: &JobLogger) -> JobOutcome {
        let raw_path = job.raw_video_path();

        logger.log_start(&format!("downloading {} ({} clips)", job.video_id, job.clip_count()));
        let started = Instant::now();
        let acquired = self
            .acquirer
            .acquire(&job.video_id, &raw_path, job.resolution)
            .await;
        metrics::record_download(acquired, started.elapsed().as_secs_f64());

        if !acquired {
            progress.record_download_failed();
            logger.log_warning("download failed, skipping all clips");
            return JobOutcome::DownloadFailed;
        }

        let logger = logger.stage("extract");
        let mut clips_extracted = 0;
        let mut clips_failed = 0;

        for (position, clip) in job.clips.iter().enumerate() {
            if self.is_shutting_down() {
                logger.log_warning("shutdown requested, remaining clips skipped");
                return JobOutcome::Interrupted {
                    clips_extracted,
                    clips_failed,
                };
            }

            let output_path = job.clip_output_path(position);
            let started = Instant::now();
            let extracted = self
                .extractor
                .extract(&raw_path, &output_path, &clip.interval, &clip.crop)
                .await;
            metrics::record_clip(extracted, started.elapsed().as_secs_f64());
            progress.record_clip(extracted);

            if extracted {
                clips_extracted += 1;
                debug!(job = %job.name, position, source_index = clip.source_index, "Clip extracted");
            } else {
                clips_failed += 1;
                logger.log_warning(&format!(
                    "clip {} (annotation {}, {}) failed",
                    position, clip.source_index, clip.interval
                ));
            }
        }

        logger.log_completion(&format!(
            "{} clips extracted, {} failed",
            clips_extracted, clips_failed
        ));
        JobOutcome::Processed {
            clips_extracted,
            clips_failed,
        }
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown_rx.as_ref().is_some_and(|rx| *rx.borrow())
    }
}
