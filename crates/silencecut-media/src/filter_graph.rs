//! Filter graph compilation for keep segments.
//!
//! Each keep segment becomes one `trim` stage on the video track and one
//! `atrim` stage on the audio track, each re-basing timestamps to zero.
//! Two `concat` stages then splice the trimmed pieces back together in
//! order. For two segments the program reads:
//!
//! ```text
//! [0:v]trim=start=0.000000:end=2.000000,setpts=PTS-STARTPTS[v0];
//! [0:v]trim=start=3.000000,setpts=PTS-STARTPTS[v1];
//! [0:a]atrim=start=0.000000:end=2.000000,asetpts=PTS-STARTPTS[a0];
//! [0:a]atrim=start=3.000000,asetpts=PTS-STARTPTS[a1];
//! [v0][v1]concat=n=2:v=1:a=0[outv];
//! [a0][a1]concat=n=2:v=0:a=1[outa]
//! ```
//!
//! (shown one stage per line; the real program is a single line), for an
//! input of 10 seconds with silence at `[2, 3]`. A trailing segment, one that
//! reaches the total duration, has no `end` so the output runs to the true
//! end of the stream even if the probed duration was slightly short. A last
//! segment followed by silence keeps its `end`.

use std::fmt;

use silencecut_models::{KeepSegmentList, TimeInterval};

use crate::error::{MediaError, MediaResult};

/// Output label of the spliced video stream.
pub const VIDEO_OUTPUT_LABEL: &str = "outv";

/// Output label of the spliced audio stream.
pub const AUDIO_OUTPUT_LABEL: &str = "outa";

/// Separator between stages in a filter graph.
const STAGE_SEPARATOR: &str = ";";

/// Media track a stage operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Track {
    Video,
    Audio,
}

impl Track {
    fn input_pad(self) -> &'static str {
        match self {
            Track::Video => "0:v",
            Track::Audio => "0:a",
        }
    }

    fn trim_filter(self) -> &'static str {
        match self {
            Track::Video => "trim",
            Track::Audio => "atrim",
        }
    }

    fn reset_pts_filter(self) -> &'static str {
        match self {
            Track::Video => "setpts=PTS-STARTPTS",
            Track::Audio => "asetpts=PTS-STARTPTS",
        }
    }

    fn concat_streams(self) -> &'static str {
        match self {
            Track::Video => "v=1:a=0",
            Track::Audio => "v=0:a=1",
        }
    }

    fn output_label(self) -> &'static str {
        match self {
            Track::Video => VIDEO_OUTPUT_LABEL,
            Track::Audio => AUDIO_OUTPUT_LABEL,
        }
    }
}

/// Hands out intermediate labels for one compilation.
///
/// Scoped to a single [`compile_filter_graph`] call, so compilation stays
/// pure and reentrant. Segment `i` gets `v{i}` and `a{i}`; the prefixes keep
/// the two tracks apart and neither collides with the output labels.
#[derive(Debug, Default)]
struct LabelAllocator {
    next: usize,
}

impl LabelAllocator {
    fn next_pair(&mut self) -> SegmentLabels {
        let index = self.next;
        self.next += 1;
        SegmentLabels {
            video: format!("v{index}"),
            audio: format!("a{index}"),
        }
    }
}

#[derive(Debug)]
struct SegmentLabels {
    video: String,
    audio: String,
}

impl SegmentLabels {
    fn for_track(&self, track: Track) -> &str {
        match track {
            Track::Video => &self.video,
            Track::Audio => &self.audio,
        }
    }
}

/// A compiled filter graph ready for `-filter_complex`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphProgram {
    text: String,
    segment_count: usize,
}

impl GraphProgram {
    /// The program text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of keep segments spliced by this program.
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Label of the spliced video output.
    pub fn video_output(&self) -> &'static str {
        VIDEO_OUTPUT_LABEL
    }

    /// Label of the spliced audio output.
    pub fn audio_output(&self) -> &'static str {
        AUDIO_OUTPUT_LABEL
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for GraphProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Compile keep segments into a trim/concat filter graph.
///
/// `total_duration` is the input duration the segments were built against;
/// only a last segment reaching it is left open ended. Fails with
/// [`MediaError::NoRetainableContent`] for an empty list, since a `concat`
/// with zero inputs is not a valid program.
pub fn compile_filter_graph(
    segments: &KeepSegmentList,
    total_duration: f64,
) -> MediaResult<GraphProgram> {
    if segments.is_empty() {
        return Err(MediaError::NoRetainableContent {
            duration: total_duration,
        });
    }

    let mut allocator = LabelAllocator::default();
    let labels: Vec<SegmentLabels> = segments.iter().map(|_| allocator.next_pair()).collect();
    let last = segments.len() - 1;

    let mut stages = Vec::with_capacity(segments.len() * 2 + 2);
    for track in [Track::Video, Track::Audio] {
        for (i, (segment, label)) in segments.iter().zip(&labels).enumerate() {
            let open_ended = i == last && segment.end() >= total_duration;
            stages.push(trim_stage(track, segment, open_ended, label.for_track(track)));
        }
    }
    for track in [Track::Video, Track::Audio] {
        stages.push(concat_stage(track, &labels));
    }

    Ok(GraphProgram {
        text: stages.join(STAGE_SEPARATOR),
        segment_count: segments.len(),
    })
}

fn trim_stage(track: Track, segment: &TimeInterval, open_ended: bool, label: &str) -> String {
    let bounds = if open_ended {
        format!("start={:.6}", segment.start())
    } else {
        format!("start={:.6}:end={:.6}", segment.start(), segment.end())
    };

    format!(
        "[{}]{}={},{}[{}]",
        track.input_pad(),
        track.trim_filter(),
        bounds,
        track.reset_pts_filter(),
        label
    )
}

fn concat_stage(track: Track, labels: &[SegmentLabels]) -> String {
    let inputs: String = labels
        .iter()
        .map(|l| format!("[{}]", l.for_track(track)))
        .collect();

    format!(
        "{}concat=n={}:{}[{}]",
        inputs,
        labels.len(),
        track.concat_streams(),
        track.output_label()
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use regex::Regex;

    use super::*;

    fn keep(pairs: &[(f64, f64)]) -> KeepSegmentList {
        KeepSegmentList::new(
            pairs
                .iter()
                .map(|&(s, e)| TimeInterval::new(s, e).unwrap())
                .collect(),
        )
    }

    fn stages(program: &GraphProgram) -> Vec<&str> {
        program.as_str().split(';').collect()
    }

    fn label_counts(program: &GraphProgram) -> HashMap<String, usize> {
        let re = Regex::new(r"\[([^\]]+)\]").unwrap();
        let mut counts = HashMap::new();
        for cap in re.captures_iter(program.as_str()) {
            let label = cap[1].to_string();
            if label == "0:v" || label == "0:a" {
                continue;
            }
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_empty_segments_rejected() {
        let result = compile_filter_graph(&KeepSegmentList::default(), 12.5);
        match result {
            Err(MediaError::NoRetainableContent { duration }) => assert_eq!(duration, 12.5),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_last_segment_before_trailing_silence_keeps_end() {
        // Silence at [0, 1] and [5, 10] of a 10 second input
        let program = compile_filter_graph(&keep(&[(1.0, 5.0)]), 10.0).unwrap();
        assert_eq!(
            program.as_str(),
            "[0:v]trim=start=1.000000:end=5.000000,setpts=PTS-STARTPTS[v0];\
             [0:a]atrim=start=1.000000:end=5.000000,asetpts=PTS-STARTPTS[a0];\
             [v0]concat=n=1:v=1:a=0[outv];\
             [a0]concat=n=1:v=0:a=1[outa]"
        );
    }

    #[test]
    fn test_trailing_segment_open_only_at_duration() {
        let bounded = compile_filter_graph(&keep(&[(0.0, 2.0), (3.0, 7.5)]), 10.0).unwrap();
        assert!(bounded.as_str().contains("trim=start=3.000000:end=7.500000,"));
        assert!(stages(&bounded).iter().all(|s| s.contains("concat=") || s.contains(":end=")));

        let trailing = compile_filter_graph(&keep(&[(0.0, 2.0), (3.0, 10.0)]), 10.0).unwrap();
        assert!(trailing.as_str().contains("trim=start=3.000000,"));
        assert!(!trailing.as_str().contains("end=10.000000"));
    }

    #[test]
    fn test_single_segment_program() {
        let program = compile_filter_graph(&keep(&[(0.0, 10.0)]), 10.0).unwrap();
        assert_eq!(
            program.as_str(),
            "[0:v]trim=start=0.000000,setpts=PTS-STARTPTS[v0];\
             [0:a]atrim=start=0.000000,asetpts=PTS-STARTPTS[a0];\
             [v0]concat=n=1:v=1:a=0[outv];\
             [a0]concat=n=1:v=0:a=1[outa]"
        );
        assert_eq!(program.segment_count(), 1);
    }

    #[test]
    fn test_two_segment_program() {
        let program = compile_filter_graph(&keep(&[(0.0, 2.0), (3.0, 10.0)]), 10.0).unwrap();
        assert_eq!(
            program.as_str(),
            "[0:v]trim=start=0.000000:end=2.000000,setpts=PTS-STARTPTS[v0];\
             [0:v]trim=start=3.000000,setpts=PTS-STARTPTS[v1];\
             [0:a]atrim=start=0.000000:end=2.000000,asetpts=PTS-STARTPTS[a0];\
             [0:a]atrim=start=3.000000,asetpts=PTS-STARTPTS[a1];\
             [v0][v1]concat=n=2:v=1:a=0[outv];\
             [a0][a1]concat=n=2:v=0:a=1[outa]"
        );
    }

    #[test]
    fn test_only_last_segment_open_ended() {
        let program = compile_filter_graph(&keep(&[(0.0, 1.0), (2.0, 3.0), (4.5, 6.0)]), 6.0).unwrap();
        let open: Vec<&str> = stages(&program)
            .into_iter()
            .filter(|s| s.contains("trim=") && !s.contains(":end="))
            .collect();
        assert_eq!(open.len(), 2);
        assert!(open.iter().all(|s| s.contains("start=4.500000")));
    }

    #[test]
    fn test_microsecond_precision() {
        let program = compile_filter_graph(&keep(&[(0.0, 2.00206), (3.50794, 9.0)]), 9.0).unwrap();
        assert!(program.as_str().contains("end=2.002060"));
        assert!(program.as_str().contains("start=3.507940"));
    }

    #[test]
    fn test_stage_counts_and_label_references() {
        for n in 1..=12 {
            let pairs: Vec<(f64, f64)> = (0..n)
                .map(|i| (i as f64 * 2.0, i as f64 * 2.0 + 1.0))
                .collect();
            let program = compile_filter_graph(&keep(&pairs), n as f64 * 2.0 - 1.0).unwrap();
            let all = stages(&program);

            let video_trims = all.iter().filter(|s| s.starts_with("[0:v]trim=")).count();
            let audio_trims = all.iter().filter(|s| s.starts_with("[0:a]atrim=")).count();
            let concats: Vec<&&str> = all.iter().filter(|s| s.contains("concat=")).collect();

            assert_eq!(video_trims + audio_trims, 2 * n);
            assert_eq!(video_trims, n);
            assert_eq!(concats.len(), 2);
            assert!(concats.iter().all(|s| s.contains(&format!("concat=n={n}:"))));
            assert_eq!(all.len(), 2 * n + 2);

            let counts = label_counts(&program);
            assert_eq!(counts.len(), 2 * n + 2, "unexpected label set for n={n}");
            for (label, count) in &counts {
                if label == VIDEO_OUTPUT_LABEL || label == AUDIO_OUTPUT_LABEL {
                    assert_eq!(*count, 1, "output label {label} for n={n}");
                } else {
                    assert_eq!(*count, 2, "intermediate label {label} for n={n}");
                }
            }
        }
    }

    #[test]
    fn test_concat_preserves_segment_order() {
        let program = compile_filter_graph(&keep(&[(0.0, 1.0), (2.0, 3.0), (4.0, 5.0)]), 5.0).unwrap();
        assert!(program.as_str().contains("[v0][v1][v2]concat=n=3:v=1:a=0[outv]"));
        assert!(program.as_str().ends_with("[a0][a1][a2]concat=n=3:v=0:a=1[outa]"));
    }

    #[test]
    fn test_compilation_is_reentrant() {
        let segments = keep(&[(0.0, 1.0), (2.0, 3.0)]);
        let first = compile_filter_graph(&segments, 3.0).unwrap();
        let second = compile_filter_graph(&segments, 3.0).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.into_string());
    }
}
