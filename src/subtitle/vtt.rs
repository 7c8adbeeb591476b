use crate::model::Segment;
use super::{sanitize_cue_text, split_seconds};

/// Render segments as WebVTT markup
pub fn encode_vtt(segments: &[Segment]) -> String {
    let mut vtt_content = String::from("WEBVTT\n\n");

    for segment in segments {
        vtt_content.push_str(&format!(
            "{} --> {}\n{}\n\n",
            format_vtt_time(segment.start),
            format_vtt_time(segment.end),
            sanitize_cue_text(&segment.text)
        ));
    }

    vtt_content
}

/// Format time in seconds to WebVTT time format (HH:MM:SS.mmm)
pub fn format_vtt_time(seconds: f64) -> String {
    let (hours, minutes, secs, fraction) = split_seconds(seconds);
    let millis = (fraction * 1000.0).floor() as u64;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}
