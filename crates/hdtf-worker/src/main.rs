//! HDTF dataset download binary.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hdtf_annotations::AnnotationJoiner;
use hdtf_media::{check_tool, FfmpegClipExtractor, ProcessRunner, YtDlpAcquirer};
use hdtf_models::{raw_videos_dir, Subset};
use hdtf_worker::{TaskPool, WorkerConfig};

#[derive(Parser)]
#[command(name = "hdtf-download")]
#[command(about = "Download the HDTF dataset and cut it into cropped clips")]
#[command(version)]
struct Cli {
    /// Directory holding the annotation files
    #[arg(short, long, default_value = "HDTF_dataset")]
    source_dir: PathBuf,

    /// Where raw videos and clips are written
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Number of videos processed in parallel [default: 8]
    #[arg(short = 'w', long)]
    num_workers: Option<usize>,

    /// Comma-separated subsets to process, in order (RD, WDA, WRA) [default: all]
    #[arg(long, value_delimiter = ',')]
    subsets: Vec<Subset>,
}

impl Cli {
    /// Environment config with command-line overrides applied.
    fn worker_config(&self) -> WorkerConfig {
        let config = WorkerConfig::from_env();
        match self.num_workers {
            Some(num_workers) => config.with_num_workers(num_workers),
            None => config,
        }
    }

    fn joiner(&self) -> AnnotationJoiner {
        let joiner = AnnotationJoiner::new(&self.source_dir, &self.output_dir);
        if self.subsets.is_empty() {
            joiner
        } else {
            joiner.with_subsets(self.subsets.iter().copied())
        }
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = cli.worker_config();
    config.progress_bar = config.progress_bar && std::io::stderr().is_terminal();
    init_tracing(default_log_directive(config.progress_bar));

    if let Err(e) = run(cli, config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Per-job progress goes to the bar when it is drawn, so only warnings are
/// logged by default then.
fn default_log_directive(progress_bar: bool) -> &'static str {
    if progress_bar {
        "hdtf=warn"
    } else {
        "hdtf=info"
    }
}

/// Colored output for terminals, JSON when `LOG_FORMAT=json`.
fn init_tracing(default_directive: &str) {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run(cli: Cli, config: WorkerConfig) -> anyhow::Result<()> {
    config.validate()?;
    info!("Worker config: {:?}", config);

    check_tool(&config.ytdlp_program)?;
    check_tool(&config.ffmpeg_program)?;

    let raw_dir = raw_videos_dir(&cli.output_dir);
    tokio::fs::create_dir_all(&raw_dir)
        .await
        .with_context(|| format!("failed to create {}", raw_dir.display()))?;

    let (jobs, stats) = cli
        .joiner()
        .build_jobs()
        .await
        .context("failed to read annotations")?;
    info!(
        jobs = stats.jobs,
        clips = stats.clips,
        videos_dropped = stats.videos_dropped(),
        "Built job list from {}",
        cli.source_dir.display()
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received shutdown signal, stopping after in-flight work is killed");
            let _ = shutdown_tx.send(true);
        }
    });

    let download_runner = ProcessRunner::new()
        .with_cancel(shutdown_rx.clone())
        .with_timeout(config.download_timeout);
    let clip_runner = ProcessRunner::new()
        .with_cancel(shutdown_rx.clone())
        .with_timeout(config.clip_timeout);

    let acquirer = YtDlpAcquirer::new()
        .with_program(config.ytdlp_program.clone())
        .with_runner(download_runner);
    let extractor = FfmpegClipExtractor::new()
        .with_program(config.ffmpeg_program.clone())
        .with_runner(clip_runner);

    let pool = TaskPool::new(Arc::new(acquirer), Arc::new(extractor), &config).with_shutdown(shutdown_rx);
    let summary = pool.run(jobs).await?;

    if summary.is_clean() {
        println!("Done: {}", summary);
    } else {
        println!("Done with failures: {}", summary);
        println!("Failed downloads and clips were logged as warnings and are not retried.");
    }
    println!(
        "Raw videos are kept in {}; delete it to free disk space.",
        raw_dir.display()
    );

    Ok(())
}
