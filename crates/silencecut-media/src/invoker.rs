//! Engine process invocation.
//!
//! [`EngineInvoker`] is the seam between the trim pipeline and the external
//! engine: it takes an argument vector and returns captured text and the
//! exit status. [`FfmpegInvoker`] is the real implementation on top of
//! `tokio::process`; tests substitute a scripted fake.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::{is_progress_line, parse_progress_line, FfmpegProgress, ProgressCallback};

/// Borrowed progress sink for a single invocation.
pub type ProgressSink<'a> = &'a (dyn Fn(FfmpegProgress) + Send + Sync);

/// Captured result of one engine invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    /// Diagnostic text, minus `-progress` key/value lines.
    pub stderr: String,
}

impl EngineOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs the external engine with a given argument vector.
///
/// Implementations must release the spawned process before returning,
/// whether or not it succeeded. A non-zero exit is not an error at this
/// level; callers decide what a failed status means for their pass.
#[async_trait]
pub trait EngineInvoker: Send + Sync {
    async fn invoke(&self, args: &[String]) -> MediaResult<EngineOutput>;

    /// Like [`invoke`](Self::invoke), delivering this call's `-progress`
    /// snapshots to `on_progress`.
    ///
    /// The sink only sees snapshots of this invocation, so concurrent calls
    /// never share progress state. Invokers that cannot report progress
    /// ignore it.
    async fn invoke_with_progress(
        &self,
        args: &[String],
        on_progress: ProgressSink<'_>,
    ) -> MediaResult<EngineOutput> {
        let _ = on_progress;
        self.invoke(args).await
    }
}

/// Invoker that spawns an FFmpeg binary.
pub struct FfmpegInvoker {
    program: PathBuf,
    timeout_secs: Option<u64>,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for FfmpegInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegInvoker")
            .field("program", &self.program)
            .field("timeout_secs", &self.timeout_secs)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl FfmpegInvoker {
    /// Use `program` as given, without checking that it exists.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout_secs: None,
            progress: None,
        }
    }

    /// Resolve `program` (a bare name looked up in PATH, or a path).
    pub fn resolve(program: &str) -> MediaResult<Self> {
        let path = which::which(program).map_err(|_| MediaError::FfmpegNotFound(program.to_string()))?;
        debug!(program = %path.display(), "Resolved FFmpeg binary");
        Ok(Self::new(path))
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Receive `-progress pipe:2` snapshots of every command run through
    /// [`EngineInvoker::invoke`]. A sink passed to
    /// [`EngineInvoker::invoke_with_progress`] takes precedence for that call.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(FfmpegProgress) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl EngineInvoker for FfmpegInvoker {
    async fn invoke(&self, args: &[String]) -> MediaResult<EngineOutput> {
        self.run(args, self.progress.as_deref()).await
    }

    async fn invoke_with_progress(
        &self,
        args: &[String],
        on_progress: ProgressSink<'_>,
    ) -> MediaResult<EngineOutput> {
        self.run(args, Some(on_progress)).await
    }
}

impl FfmpegInvoker {
    async fn run(
        &self,
        args: &[String],
        progress: Option<ProgressSink<'_>>,
    ) -> MediaResult<EngineOutput> {
        debug!("Running FFmpeg: {} {}", self.program.display(), args.join(" "));

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("stderr not captured"))?;

        let collect = async {
            tokio::join!(
                read_lossy(stdout),
                read_stderr(stderr, progress),
                child.wait()
            )
        };

        let waited = match self.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), collect)
                .await
                .map_err(|_| secs),
            None => Ok(collect.await),
        };

        let (stdout, stderr, status) = match waited {
            Ok(results) => results,
            Err(secs) => {
                warn!("FFmpeg timed out after {} seconds, killing process", secs);
                let _ = child.kill().await;
                return Err(MediaError::Timeout(secs));
            }
        };

        let status = status?;
        let output = EngineOutput {
            exit_code: status.code(),
            stdout: stdout?,
            stderr: stderr?,
        };

        debug!(
            exit_code = ?output.exit_code,
            stderr_bytes = output.stderr.len(),
            "FFmpeg finished"
        );
        Ok(output)
    }
}

async fn read_lossy<R: AsyncRead + Unpin>(mut pipe: R) -> std::io::Result<String> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Collect stderr line by line, routing progress blocks to the callback.
async fn read_stderr<R: AsyncRead + Unpin>(
    pipe: R,
    progress: Option<ProgressSink<'_>>,
) -> std::io::Result<String> {
    let mut reader = BufReader::new(pipe);
    let mut captured = String::new();
    let mut current = FfmpegProgress::default();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&line);

        if is_progress_line(&text) {
            if let Some(snapshot) = parse_progress_line(&text, &mut current) {
                if let Some(callback) = progress {
                    callback(snapshot);
                }
            }
            continue;
        }

        captured.push_str(text.trim_end_matches(['\r', '\n']));
        captured.push('\n');
    }

    Ok(captured)
}
