use crate::model::Segment;
use super::{sanitize_cue_text, split_seconds};

/// Render segments as SubRip markup
pub fn encode_srt(segments: &[Segment]) -> String {
    let mut srt_content = String::new();

    for (index, segment) in segments.iter().enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_srt_time(segment.start),
            format_srt_time(segment.end),
            sanitize_cue_text(&segment.text)
        ));
    }

    srt_content
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
pub fn format_srt_time(seconds: f64) -> String {
    let (hours, minutes, secs, fraction) = split_seconds(seconds);
    let millis = (fraction * 1000.0).floor() as u64;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
