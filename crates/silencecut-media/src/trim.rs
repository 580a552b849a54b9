//! Silence trimming pipeline.
//!
//! # Flow
//!
//! 1. Detection pass: `silencedetect` over the input, output discarded
//! 2. Parse silence markers from the detection stderr
//! 3. Total duration from the same stderr, or a dedicated probe if absent
//! 4. Complement the silences into keep segments
//! 5. Compile keep segments into a trim/concat filter graph
//! 6. Render pass with the graph, mapping `[outv]` and `[outa]`
//!
//! Engine invocations run strictly one after another. Any failure aborts the
//! operation; nothing is retried and no partial output is reported.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use silencecut_models::{format_seconds, KeepSegmentList, SegmentStats, SilenceLog};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::command::FfmpegCommand;
use crate::config::TrimConfig;
use crate::error::{stderr_tail, MediaError, MediaResult};
use crate::filter_graph::{compile_filter_graph, GraphProgram};
use crate::invoker::{EngineInvoker, EngineOutput, FfmpegInvoker};
use crate::progress::FfmpegProgress;
use crate::metrics::{self, EnginePass};
use crate::probe::{parse_duration, probe_duration};
use crate::silence::{build_keep_segments, parse_silence_log};

/// Result of a successful trim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrimOutcome {
    /// Rendered file
    pub output: PathBuf,
    /// Total input duration in seconds
    pub duration: f64,
    /// Silent spans reported by the detector
    pub silences: SilenceLog,
    /// Spans retained in the output
    pub keep_segments: KeepSegmentList,
    pub stats: SegmentStats,
}

/// Removes silent spans from media files through an [`EngineInvoker`].
pub struct SilenceTrimmer<I = FfmpegInvoker> {
    invoker: I,
    config: TrimConfig,
}

impl SilenceTrimmer<FfmpegInvoker> {
    /// Build a trimmer around the FFmpeg binary named in `config`.
    ///
    /// Fails with [`MediaError::FfmpegNotFound`] if the binary cannot be
    /// resolved.
    pub fn from_config(config: TrimConfig) -> MediaResult<Self> {
        let mut invoker = FfmpegInvoker::resolve(&config.ffmpeg_path)?;
        if let Some(secs) = config.timeout_secs {
            invoker = invoker.with_timeout(secs);
        }
        debug!(
            ffmpeg = %invoker.program().display(),
            timeout_secs = ?config.timeout_secs,
            "Configured silence trimmer"
        );

        Ok(Self { invoker, config })
    }
}

impl<I: EngineInvoker> SilenceTrimmer<I> {
    /// Build a trimmer around an arbitrary invoker.
    pub fn new(invoker: I, config: TrimConfig) -> Self {
        Self { invoker, config }
    }

    pub fn config(&self) -> &TrimConfig {
        &self.config
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// Remove silence from `input`, writing the result to `output`.
    ///
    /// `output` is overwritten if it exists. A trimmer may run several trims
    /// at once; render progress is tracked per call and logged at debug
    /// level.
    pub async fn trim(&self, input: &Path, output: &Path) -> MediaResult<TrimOutcome> {
        metrics::record_trim_started();

        let span = info_span!(
            "trim",
            input = %input.display(),
            output = %output.display()
        );
        let result = self.run(input, output).instrument(span).await;

        match &result {
            Ok(outcome) => metrics::record_trim_completed(outcome.stats.removed_secs),
            Err(e) => {
                warn!(
                    input = %input.display(),
                    error = %e,
                    "Silence trim failed"
                );
                metrics::record_trim_failed(e.kind());
            }
        }

        result
    }

    async fn run(&self, input: &Path, output: &Path) -> MediaResult<TrimOutcome> {
        validate_paths(input, output)?;

        let detect_args = FfmpegCommand::silence_detect(input, &self.config.detect).build_args();
        let detect = self.timed(EnginePass::Detect, &detect_args).await?;
        if !detect.success() {
            return Err(MediaError::ffmpeg_failed(
                "silence detection failed",
                stderr_tail(&detect.stderr),
                detect.exit_code,
            ));
        }

        let silences = parse_silence_log(&detect.stderr);
        info!(
            silences = silences.len(),
            silent_secs = format!("{:.3}", silences.total_secs()),
            "Detected silence"
        );

        let duration = match parse_duration(&detect.stderr) {
            Ok(duration) => duration,
            Err(MediaError::DurationUnavailable) => {
                debug!("No duration in detection output, probing input");
                let started = Instant::now();
                let probed = probe_duration(&self.invoker, input).await;
                metrics::record_engine_duration(EnginePass::Probe, started.elapsed().as_secs_f64());
                probed?
            }
            Err(e) => return Err(e),
        };

        let keep_segments = build_keep_segments(&silences, duration);
        if keep_segments.is_empty() {
            return Err(MediaError::NoRetainableContent { duration });
        }

        let stats = SegmentStats::compute(&keep_segments, &silences, duration);
        info!(
            duration = %format_seconds(duration),
            keep_segments = stats.keep_count,
            kept_secs = format!("{:.3}", stats.kept_secs),
            removed_secs = format!("{:.3}", stats.removed_secs),
            keep_ratio = format!("{:.1}%", stats.keep_ratio * 100.0),
            "Computed keep segments"
        );

        let program = compile_filter_graph(&keep_segments, duration)?;
        let kept_ms = (stats.kept_secs * 1000.0).round() as i64;
        self.render(input, output, &program, kept_ms).await?;

        info!(output = %output.display(), "Render complete");

        Ok(TrimOutcome {
            output: output.to_path_buf(),
            duration,
            silences,
            keep_segments,
            stats,
        })
    }

    async fn render(
        &self,
        input: &Path,
        output: &Path,
        program: &GraphProgram,
        kept_ms: i64,
    ) -> MediaResult<()> {
        let mut cmd = FfmpegCommand::render(input, output);

        // Held until the render invocation returns.
        let script = if program.segment_count() > self.config.max_inline_segments {
            let mut file = tempfile::Builder::new()
                .prefix("silencecut-graph-")
                .suffix(".txt")
                .tempfile()?;
            file.write_all(program.as_str().as_bytes())?;
            file.flush()?;
            debug!(
                segments = program.segment_count(),
                script = %file.path().display(),
                "Passing filter graph as script"
            );
            cmd = cmd.filter_complex_script(file.path());
            Some(file)
        } else {
            cmd = cmd.filter_complex(program.as_str());
            None
        };

        cmd = cmd
            .map_label(program.video_output())
            .map_label(program.audio_output());
        if let Some(codec) = &self.config.video_codec {
            cmd = cmd.video_codec(codec.as_str());
        }
        if let Some(codec) = &self.config.audio_codec {
            cmd = cmd.audio_codec(codec.as_str());
        }

        let on_progress = |p: FfmpegProgress| {
            debug!(
                out_time_ms = p.out_time_ms,
                percent = format!("{:.1}", p.percentage(kept_ms)),
                eta_secs = ?p.eta_seconds(kept_ms),
                speed = p.speed,
                complete = p.is_complete,
                "Render progress"
            );
        };

        let started = Instant::now();
        let result = self
            .invoker
            .invoke_with_progress(&cmd.build_args(), &on_progress)
            .await;
        metrics::record_engine_duration(EnginePass::Render, started.elapsed().as_secs_f64());
        drop(script);

        let rendered = result?;
        if !rendered.success() {
            return Err(MediaError::render_failed(rendered.exit_code, &rendered.stderr));
        }
        Ok(())
    }

    async fn timed(&self, pass: EnginePass, args: &[String]) -> MediaResult<EngineOutput> {
        let started = Instant::now();
        let result = self.invoker.invoke(args).await;
        metrics::record_engine_duration(pass, started.elapsed().as_secs_f64());
        result
    }
}

fn validate_paths(input: &Path, output: &Path) -> MediaResult<()> {
    if !input.is_file() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }
    if input == output {
        return Err(MediaError::InvalidOutput(format!(
            "output would overwrite input: {}",
            output.display()
        )));
    }
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(MediaError::InvalidOutput(format!(
                "directory does not exist: {}",
                parent.display()
            )));
        }
    }
    Ok(())
}
