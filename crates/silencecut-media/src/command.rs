//! FFmpeg command builder.
//!
//! Builds argument vectors for the three engine passes: silence
//! detection, duration probe and render. Spawning lives in
//! [`crate::invoker`].

use std::path::{Path, PathBuf};

use crate::silence::SilenceDetectConfig;

/// Where FFmpeg should write its output.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OutputTarget {
    /// Write to a media file.
    File(PathBuf),
    /// Decode everything but discard it (`-f null -`).
    Discard,
    /// No output at all; FFmpeg only describes its inputs.
    None,
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output target
    output: OutputTarget,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
    /// Whether to emit `-progress pipe:2` key/value lines
    progress: bool,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command writing to `output`.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self::with_target(input, OutputTarget::File(output.as_ref().to_path_buf()))
    }

    fn with_target(input: impl AsRef<Path>, output: OutputTarget) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output,
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
            progress: false,
        }
    }

    /// Detection pass: run `silencedetect` over the audio and discard the result.
    ///
    /// Markers are logged at `info`, which also keeps the input header with
    /// its `Duration:` line. Stats are off so carriage-return progress
    /// chunks never share a line with a marker.
    pub fn silence_detect(input: impl AsRef<Path>, config: &SilenceDetectConfig) -> Self {
        let mut cmd = Self::with_target(input, OutputTarget::Discard)
            .log_level("info")
            .input_arg("-nostats")
            .output_arg("-vn")
            .audio_filter(config.filter_arg());
        cmd.overwrite = false;
        cmd
    }

    /// Probe pass: open the input and print its description, nothing else.
    pub fn probe(input: impl AsRef<Path>) -> Self {
        let mut cmd = Self::with_target(input, OutputTarget::None).log_level("info");
        cmd.overwrite = false;
        cmd
    }

    /// Render pass: overwrite `output`, report progress on stderr.
    ///
    /// The caller adds the filter graph and stream mappings.
    pub fn render(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self::new(input, output).with_progress(true)
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set audio filter.
    pub fn audio_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-af").output_arg(filter)
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Read the filter complex from a script file.
    pub fn filter_complex_script(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_string_lossy().to_string();
        self.output_arg("-filter_complex_script").output_arg(path)
    }

    /// Map a filter graph output label (without brackets) to the output file.
    pub fn map_label(self, label: &str) -> Self {
        self.output_arg("-map").output_arg(format!("[{}]", label))
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Toggle `-progress pipe:2` output.
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Overwrite flag
        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-hide_banner".to_string());
        args.push("-nostdin".to_string());

        // Log level
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Progress output to stderr
        if self.progress {
            args.push("-nostats".to_string());
            args.push("-progress".to_string());
            args.push("pipe:2".to_string());
        }

        // Input args
        args.extend(self.input_args.iter().cloned());

        // Input file
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        // Output args
        args.extend(self.output_args.iter().cloned());

        match &self.output {
            OutputTarget::File(path) => args.push(path.to_string_lossy().to_string()),
            OutputTarget::Discard => {
                args.push("-f".to_string());
                args.push("null".to_string());
                args.push("-".to_string());
            }
            OutputTarget::None => {}
        }

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(args: &[String], value: &str) -> usize {
        args.iter()
            .position(|a| a == value)
            .unwrap_or_else(|| panic!("{value} missing from {args:?}"))
    }

    #[test]
    fn test_silence_detect_args() {
        let config = SilenceDetectConfig::default();
        let args = FfmpegCommand::silence_detect("talk.mp4", &config).build_args();

        assert_eq!(
            args,
            vec![
                "-hide_banner",
                "-nostdin",
                "-v",
                "info",
                "-nostats",
                "-i",
                "talk.mp4",
                "-vn",
                "-af",
                "silencedetect=noise=-60dB:d=0.5",
                "-f",
                "null",
                "-",
            ]
        );
    }

    #[test]
    fn test_probe_args_have_no_output() {
        let args = FfmpegCommand::probe("talk.mp4").build_args();
        assert_eq!(args, vec!["-hide_banner", "-nostdin", "-v", "info", "-i", "talk.mp4"]);
    }

    #[test]
    fn test_render_args() {
        let args = FfmpegCommand::render("in.mp4", "out.mp4")
            .filter_complex("[0:v]trim=start=0.000000,setpts=PTS-STARTPTS[v0]")
            .map_label("outv")
            .map_label("outa")
            .video_codec("libx264")
            .build_args();

        assert_eq!(args[0], "-y");
        assert!(args.contains(&"pipe:2".to_string()));
        assert!(position(&args, "-i") < position(&args, "-filter_complex"));
        assert_eq!(args[position(&args, "-map") + 1], "[outv]");
        assert!(args.contains(&"[outa]".to_string()));
        assert_eq!(args[position(&args, "-c:v") + 1], "libx264");
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn test_filter_script_arg() {
        let args = FfmpegCommand::render("in.mp4", "out.mp4")
            .filter_complex_script("/tmp/graph.txt")
            .build_args();
        assert_eq!(args[position(&args, "-filter_complex_script") + 1], "/tmp/graph.txt");
        assert!(!args.contains(&"-filter_complex".to_string()));
    }

    #[test]
    fn test_input_args_precede_input() {
        let args = FfmpegCommand::new("in.mp4", "out.mp4")
            .input_arg("-ss")
            .input_arg("5.000")
            .output_args(["-c", "copy"])
            .build_args();
        assert!(position(&args, "-ss") < position(&args, "-i"));
        assert!(position(&args, "-c") > position(&args, "-i"));
    }
}
