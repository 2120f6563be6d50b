//! Task pool behaviour against recording fakes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_test::{assert_err, assert_ok};

use hdtf_media::{ClipExtractor, VideoAcquirer};
use hdtf_models::{ClipSpec, CropRect, Interval, VideoJob};
use hdtf_worker::{JobLogger, JobOutcome, PoolProgress, PoolSummary, TaskPool, WorkerConfig, WorkerError};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Acquire { video_id: String, destination: PathBuf },
    Extract { raw: PathBuf, output: PathBuf },
}

type CallLog = Arc<Mutex<Vec<Call>>>;

/// Fails for the listed video ids; sends shutdown on the first call if asked.
struct FakeAcquirer {
    calls: CallLog,
    failing: HashSet<String>,
    shutdown_tx: Option<watch::Sender<bool>>,
}

#[async_trait]
impl VideoAcquirer for FakeAcquirer {
    async fn acquire(&self, video_id: &str, destination: &Path, _resolution: Option<u32>) -> bool {
        self.calls.lock().unwrap().push(Call::Acquire {
            video_id: video_id.to_string(),
            destination: destination.to_path_buf(),
        });
        if let Some(tx) = &self.shutdown_tx {
            tx.send(true).unwrap();
        }
        !self.failing.contains(video_id)
    }
}

/// Fails for output paths ending with one of the listed suffixes.
struct FakeExtractor {
    calls: CallLog,
    failing_suffixes: Vec<String>,
}

#[async_trait]
impl ClipExtractor for FakeExtractor {
    async fn extract(&self, raw: &Path, output: &Path, _interval: &Interval, _crop: &CropRect) -> bool {
        self.calls.lock().unwrap().push(Call::Extract {
            raw: raw.to_path_buf(),
            output: output.to_path_buf(),
        });
        let output = output.to_string_lossy();
        !self.failing_suffixes.iter().any(|s| output.ends_with(s.as_str()))
    }
}

fn clip(index: usize) -> ClipSpec {
    ClipSpec {
        source_index: index,
        interval: "00:01-00:05".parse().unwrap(),
        crop: CropRect::new(0, 256, 0, 256).unwrap(),
    }
}

fn job(name: &str, video_id: &str, clips: usize) -> VideoJob {
    VideoJob {
        name: name.to_string(),
        video_id: video_id.to_string(),
        resolution: Some(720),
        clips: (0..clips).map(clip).collect(),
        output_dir: PathBuf::from("/out"),
    }
}

fn config(workers: usize) -> WorkerConfig {
    WorkerConfig {
        progress_bar: false,
        ..WorkerConfig::default()
    }
    .with_num_workers(workers)
}

fn pool(calls: &CallLog, failing_videos: &[&str], failing_clips: &[&str], workers: usize) -> TaskPool {
    let acquirer = FakeAcquirer {
        calls: Arc::clone(calls),
        failing: failing_videos.iter().map(|s| s.to_string()).collect(),
        shutdown_tx: None,
    };
    let extractor = FakeExtractor {
        calls: Arc::clone(calls),
        failing_suffixes: failing_clips.iter().map(|s| s.to_string()).collect(),
    };
    TaskPool::new(Arc::new(acquirer), Arc::new(extractor), &config(workers))
}

fn extract_outputs(calls: &[Call]) -> Vec<PathBuf> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::Extract { output, .. } => Some(output.clone()),
            Call::Acquire { .. } => None,
        })
        .collect()
}

#[tokio::test]
async fn failed_download_skips_its_clips_only() {
    let calls = CallLog::default();
    let pool = pool(&calls, &["vidA"], &[], 2);

    let summary = assert_ok!(pool.run(vec![job("RD_A", "vidA", 3), job("RD_B", "vidB", 2)]).await);

    assert_eq!(
        summary,
        PoolSummary {
            jobs_total: 2,
            jobs_completed: 2,
            downloads_failed: 1,
            clips_extracted: 2,
            clips_failed: 0,
        }
    );

    let calls = calls.lock().unwrap();
    let outputs = extract_outputs(&calls);
    assert_eq!(
        outputs,
        vec![PathBuf::from("/out/RD_B_000.mp4"), PathBuf::from("/out/RD_B_001.mp4")]
    );
    assert!(calls.contains(&Call::Acquire {
        video_id: "vidA".to_string(),
        destination: PathBuf::from("/out/_videos_raw/RD_A.mp4"),
    }));
}

#[tokio::test]
async fn failed_clip_does_not_stop_later_clips() {
    let calls = CallLog::default();
    let pool = pool(&calls, &[], &["RD_A_001.mp4"], 1);

    let summary = assert_ok!(pool.run(vec![job("RD_A", "vidA", 3)]).await);
    assert_eq!(summary.clips_extracted, 2);
    assert_eq!(summary.clips_failed, 1);
    assert_eq!(summary.jobs_completed, 1);

    let calls = calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![
            Call::Acquire {
                video_id: "vidA".to_string(),
                destination: PathBuf::from("/out/_videos_raw/RD_A.mp4"),
            },
            Call::Extract {
                raw: PathBuf::from("/out/_videos_raw/RD_A.mp4"),
                output: PathBuf::from("/out/RD_A_000.mp4"),
            },
            Call::Extract {
                raw: PathBuf::from("/out/_videos_raw/RD_A.mp4"),
                output: PathBuf::from("/out/RD_A_001.mp4"),
            },
            Call::Extract {
                raw: PathBuf::from("/out/_videos_raw/RD_A.mp4"),
                output: PathBuf::from("/out/RD_A_002.mp4"),
            },
        ]
    );
}

#[tokio::test]
async fn every_job_counts_as_completed() {
    let calls = CallLog::default();
    let pool = pool(&calls, &["vid3", "vid7"], &["_000.mp4"], 4);

    let jobs: Vec<_> = (0..10)
        .map(|i| job(&format!("WRA_{i}"), &format!("vid{i}"), 2))
        .collect();
    let summary = assert_ok!(pool.run(jobs).await);

    assert_eq!(summary.jobs_total, 10);
    assert_eq!(summary.jobs_completed, 10);
    assert_eq!(summary.downloads_failed, 2);
    assert_eq!(summary.clips_extracted, 8);
    assert_eq!(summary.clips_failed, 8);

    let calls = calls.lock().unwrap();
    let acquired = calls.iter().filter(|c| matches!(c, Call::Acquire { .. })).count();
    assert_eq!(acquired, 10);
}

#[tokio::test]
async fn more_workers_than_jobs() {
    let calls = CallLog::default();
    let pool = pool(&calls, &[], &[], 16);

    let summary = assert_ok!(pool.run(vec![job("RD_A", "vidA", 1)]).await);
    assert_eq!(summary.jobs_completed, 1);
    assert_eq!(summary.clips_extracted, 1);
}

#[tokio::test]
async fn zero_workers_is_rejected() {
    let calls = CallLog::default();
    let pool = pool(&calls, &[], &[], 0);

    let err = assert_err!(pool.run(vec![job("RD_A", "vidA", 1)]).await);
    assert!(matches!(err, WorkerError::ConfigError(_)));
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn shutdown_stops_pulling_jobs() {
    let calls = CallLog::default();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let acquirer = FakeAcquirer {
        calls: Arc::clone(&calls),
        failing: HashSet::new(),
        shutdown_tx: Some(shutdown_tx),
    };
    let extractor = FakeExtractor {
        calls: Arc::clone(&calls),
        failing_suffixes: Vec::new(),
    };
    let pool = TaskPool::new(Arc::new(acquirer), Arc::new(extractor), &config(1)).with_shutdown(shutdown_rx);

    let summary = assert_ok!(pool.run(vec![job("RD_A", "vidA", 2), job("RD_B", "vidB", 2)]).await);

    // The first download went through, but nothing after it ran.
    assert_eq!(summary.jobs_completed, 0);
    assert_eq!(summary.clips_extracted, 0);
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn process_job_reports_outcome() {
    let calls = CallLog::default();
    let pool = pool(&calls, &["bad"], &["_001.mp4"], 1);
    let progress = PoolProgress::new(2, false);

    let good = job("RD_A", "good", 2);
    let logger = JobLogger::new(&good.name);
    let outcome = pool.process_job(&good, &progress, &logger).await;
    assert_eq!(
        outcome,
        JobOutcome::Processed {
            clips_extracted: 1,
            clips_failed: 1,
        }
    );

    let bad = job("RD_B", "bad", 2);
    let outcome = pool.process_job(&bad, &progress, &JobLogger::new(&bad.name)).await;
    assert_eq!(outcome, JobOutcome::DownloadFailed);
    assert_eq!(progress.summary().downloads_failed, 1);
}
