// Subtitle markup encoders
//
// Pure functions from segments (and style, for ASS) to markup:
// - srt: SubRip
// - vtt: WebVTT
// - ass: Advanced SubStation Alpha with one computed style

pub mod ass;
pub mod srt;
pub mod vtt;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, info};

pub use ass::{encode_ass, format_ass_time, AssStyle, CANVAS_HEIGHT, CANVAS_WIDTH};
pub use srt::{encode_srt, format_srt_time};
pub use vtt::{encode_vtt, format_vtt_time};

use crate::error::{CaptionError, Result};
use crate::model::{Segment, SubtitleStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
    Ass,
}

impl SubtitleFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Vtt => "vtt",
            SubtitleFormat::Ass => "ass",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SubtitleFormat {
    type Err = CaptionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "srt" => Ok(SubtitleFormat::Srt),
            "vtt" | "webvtt" => Ok(SubtitleFormat::Vtt),
            "ass" | "ssa" => Ok(SubtitleFormat::Ass),
            _ => Err(CaptionError::Validation(format!(
                "Invalid subtitle format '{}'. Valid formats: srt, vtt, ass",
                s
            ))),
        }
    }
}

/// Encode segments in the requested format. Style only affects ASS.
pub fn encode(
    format: SubtitleFormat,
    segments: &[Segment],
    style: &SubtitleStyle,
) -> Result<String> {
    debug!("Encoding {} segments as {}", segments.len(), format);
    match format {
        SubtitleFormat::Srt => Ok(encode_srt(segments)),
        SubtitleFormat::Vtt => Ok(encode_vtt(segments)),
        SubtitleFormat::Ass => encode_ass(segments, style),
    }
}

/// Encode and write a subtitle file
pub async fn write_subtitle<P: AsRef<Path>>(
    format: SubtitleFormat,
    segments: &[Segment],
    style: &SubtitleStyle,
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating {} file: {}", format, output_path.display());

    let content = encode(format, segments, style)?;
    fs::write(output_path, content).await?;

    info!("{} file generated successfully", format);
    Ok(())
}

/// Collapse line breaks to single spaces and trim. Cues are always one line.
pub fn sanitize_cue_text(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
        .trim()
        .to_string()
}

/// Split seconds into (hours, minutes, seconds, fractional part) by floor division
pub(crate) fn split_seconds(seconds: f64) -> (u64, u64, u64, f64) {
    let seconds = seconds.max(0.0);
    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let fraction = seconds % 1.0;
    (hours, minutes, secs, fraction)
}
