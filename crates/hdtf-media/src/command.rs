//! FFmpeg command builder and external process runner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// Number of trailing stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Trim to `[start, end]` using timestamps as written.
    ///
    /// Placed after the input so seeking is frame accurate.
    pub fn trim(self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.output_arg("-ss")
            .output_arg(start)
            .output_arg("-to")
            .output_arg(end)
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter:v").output_arg(filter)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.iter().cloned());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for external commands with timeout and cancellation.
///
/// The child never inherits stdin, so a tool can't block on a prompt.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Timeout per invocation
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `program` with `args`, succeeding only on a zero exit status.
    pub async fn run(&self, program: &str, args: &[String]) -> MediaResult<()> {
        if self.is_cancelled() {
            return Err(MediaError::Cancelled);
        }

        debug!("Running: {} {}", program, args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| MediaError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let stderr_handle = child.stderr.take().map(|stderr| tokio::spawn(stderr_tail(stderr)));

        let status = match self.wait_for_completion(program, &mut child).await {
            Ok(status) => status,
            Err(e) => {
                // Grandchildren may still hold the pipe open after a kill.
                if let Some(handle) = stderr_handle {
                    handle.abort();
                }
                return Err(e);
            }
        };

        let stderr = match stderr_handle {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        };

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::process_failed(program, status.code(), stderr))
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Wait for child process with cancellation and timeout.
    async fn wait_for_completion(&self, program: &str, child: &mut Child) -> MediaResult<ExitStatus> {
        let timeout = self.timeout;
        let expired = async move {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            status = child.wait() => Ok(status?),
            _ = expired => {
                let secs = timeout.map_or(0, |t| t.as_secs());
                warn!("{} timed out after {} seconds, killing process", program, secs);
                let _ = child.kill().await;
                Err(MediaError::Timeout(secs))
            }
            _ = cancelled(self.cancel_rx.clone()) => {
                info!("{} cancelled, killing process", program);
                let _ = child.kill().await;
                Err(MediaError::Cancelled)
            }
        }
    }
}

/// Resolves once the cancel flag is set; never resolves without a receiver.
async fn cancelled(cancel_rx: Option<watch::Receiver<bool>>) {
    let Some(mut rx) = cancel_rx else {
        return std::future::pending().await;
    };

    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender dropped without cancelling.
            return std::future::pending().await;
        }
    }
}

/// Collect the last lines a tool wrote to stderr.
async fn stderr_tail(stderr: ChildStderr) -> String {
    let mut lines = BufReader::new(stderr).lines();
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);

    while let Ok(Some(line)) = lines.next_line().await {
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    Vec::from(tail).join("\n")
}

/// Check if a tool is available in PATH.
pub fn check_tool(program: &str) -> MediaResult<PathBuf> {
    which::which(program).map_err(|_| MediaError::ToolNotFound(program.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("raw.mp4", "clip.mp4")
            .trim("00:10", "00:15")
            .video_filter("crop=200:300:10:20")
            .audio_codec("copy");

        assert_eq!(
            cmd.build_args(),
            vec![
                "-y", "-v", "error", "-i", "raw.mp4", "-ss", "00:10", "-to", "00:15",
                "-filter:v", "crop=200:300:10:20", "-c:a", "copy", "clip.mp4",
            ]
        );
    }

    #[tokio::test]
    async fn test_run_success() {
        tokio_test::assert_ok!(ProcessRunner::new().run("sh", &sh("exit 0")).await);
    }

    #[tokio::test]
    async fn test_run_nonzero_exit_keeps_stderr() {
        let err = ProcessRunner::new()
            .run("sh", &sh("echo boom >&2; exit 3"))
            .await
            .unwrap_err();

        match err {
            MediaError::ProcessFailed { exit_code, stderr, .. } => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let err = ProcessRunner::new()
            .run("definitely-not-a-real-tool-hdtf", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_run_timeout_kills_process() {
        let err = ProcessRunner::new()
            .with_timeout(Some(Duration::from_millis(100)))
            .run("sh", &sh("sleep 5"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Timeout(_)));
        assert!(err.is_interrupted());
    }

    #[tokio::test]
    async fn test_run_cancel() {
        let (tx, rx) = watch::channel(false);
        let runner = ProcessRunner::new().with_cancel(rx);

        let handle = tokio::spawn(async move { runner.run("sh", &sh("sleep 5")).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, MediaError::Cancelled));
    }

    #[tokio::test]
    async fn test_run_refuses_after_cancel() {
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let err = ProcessRunner::new()
            .with_cancel(rx)
            .run("sh", &sh("exit 0"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Cancelled));
    }
}
