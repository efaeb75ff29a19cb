use std::path::Path;
use std::process::{Command, Stdio};

use crate::foundation::core::{FrameRate, FrameSize};
use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Basic metadata about a source video, as needed for atlas planning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeResult {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Duration in milliseconds.
    pub duration_ms: f64,
    /// Frame rate of the first video stream.
    pub frame_rate: FrameRate,
}

impl ProbeResult {
    /// Per-frame dimensions.
    pub fn frame_size(&self) -> FrameSize {
        FrameSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Source of [`ProbeResult`]s for a video path.
pub trait Prober: Sync {
    /// Probe `source_path` for dimensions, duration and frame rate.
    fn probe(&self, source_path: &Path) -> FlipbookResult<ProbeResult>;
}

/// [`Prober`] backed by the system `ffprobe` binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfprobeProber;

impl Prober for FfprobeProber {
    fn probe(&self, source_path: &Path) -> FlipbookResult<ProbeResult> {
        let out = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-hide_banner",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(source_path)
            .output()
            .map_err(|e| FlipbookError::probe(format!("failed to run ffprobe: {e}")))?;
        if !out.status.success() {
            return Err(FlipbookError::probe(format!(
                "ffprobe failed for '{}': {}",
                source_path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        parse_ffprobe_json(&out.stdout)
    }
}

/// Extract a [`ProbeResult`] from `ffprobe -print_format json -show_format -show_streams` output.
pub(crate) fn parse_ffprobe_json(stdout: &[u8]) -> FlipbookResult<ProbeResult> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(stdout)
        .map_err(|e| FlipbookError::probe(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| FlipbookError::probe("no video stream found"))?;

    let width = video_stream
        .width
        .filter(|w| *w > 0)
        .ok_or_else(|| FlipbookError::probe("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .filter(|h| *h > 0)
        .ok_or_else(|| FlipbookError::probe("missing video height from ffprobe"))?;
    let frame_rate: FrameRate = video_stream
        .r_frame_rate
        .as_deref()
        .ok_or_else(|| FlipbookError::probe("missing r_frame_rate from ffprobe"))?
        .parse()
        .map_err(|e| FlipbookError::probe(format!("unusable r_frame_rate: {e}")))?;

    // Containers like Matroska only report duration at the format level.
    let duration_raw = video_stream
        .duration
        .as_deref()
        .or_else(|| parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .ok_or_else(|| FlipbookError::probe("missing duration from ffprobe"))?;
    let duration_secs: f64 = duration_raw
        .trim()
        .parse()
        .map_err(|_| FlipbookError::probe(format!("unparseable duration '{duration_raw}'")))?;
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(FlipbookError::probe(format!(
            "duration must be > 0, got '{duration_raw}'"
        )));
    }

    Ok(ProbeResult {
        width,
        height,
        duration_ms: duration_secs * 1000.0,
        frame_rate,
    })
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    Command::new("ffprobe")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
