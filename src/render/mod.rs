// Render pipeline: segments + style + video -> captioned video
//
// - job: per-request workspace with guaranteed removal
// - orchestrator: admission control, staging, encoder invocation

pub mod job;
pub mod orchestrator;

use std::fmt;
use uuid::Uuid;

pub use job::{safe_video_extension, RenderJob};
pub use orchestrator::RenderOrchestrator;

use crate::error::{CaptionError, Result};
use crate::model::{validate_segments, Segment, SubtitleStyle};

pub const OUTPUT_CONTENT_TYPE: &str = "video/mp4";
pub const OUTPUT_FILENAME: &str = "video-with-captions.mp4";

/// Burn-in request. Parts are optional so that a partially filled form is
/// representable and rejected by [`RenderRequest::validate`].
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub video: Option<Vec<u8>>,
    /// Original upload name, only used to pick a known extension
    pub filename: Option<String>,
    pub segments: Option<Vec<Segment>>,
    pub style: Option<SubtitleStyle>,
    pub enabled: bool,
}

impl RenderRequest {
    pub fn new(
        video: Vec<u8>,
        filename: Option<String>,
        segments: Vec<Segment>,
        style: SubtitleStyle,
    ) -> Self {
        Self {
            video: Some(video),
            filename,
            segments: Some(segments),
            style: Some(style),
            enabled: true,
        }
    }

    pub fn validate(self) -> Result<ValidatedRequest> {
        if !self.enabled {
            return Err(CaptionError::Validation(
                "captions are disabled, nothing to render".to_string(),
            ));
        }
        let video = self
            .video
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CaptionError::Validation("video is required".to_string()))?;
        let segments = self
            .segments
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                CaptionError::Validation("at least one segment is required".to_string())
            })?;
        let style = self
            .style
            .ok_or_else(|| CaptionError::Validation("style is required".to_string()))?;

        validate_segments(&segments)?;
        style.validate()?;

        Ok(ValidatedRequest {
            video,
            filename: self.filename,
            segments,
            style,
        })
    }
}

/// Request whose parts are all present and valid
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub video: Vec<u8>,
    pub filename: Option<String>,
    pub segments: Vec<Segment>,
    pub style: SubtitleStyle,
}

/// Captioned video returned to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: &'static str,
}

impl RenderOutput {
    pub fn mp4(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: OUTPUT_CONTENT_TYPE,
            filename: OUTPUT_FILENAME,
        }
    }
}

/// Per-job lifecycle: created -> staged -> encoding -> succeeded|failed -> cleaned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Staged,
    Encoding,
    Succeeded,
    Failed,
    Cleaned,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobState::Created => "workspace created",
            JobState::Staged => "inputs staged",
            JobState::Encoding => "encoding",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
            JobState::Cleaned => "workspace removed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobEvent {
    pub job_id: Uuid,
    pub state: JobState,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64) -> Segment {
        Segment { id: "1".to_string(), start, end, text: "hi".to_string() }
    }

    #[test]
    fn test_validate_requires_every_part() {
        let full =
            RenderRequest::new(vec![1], None, vec![segment(0.0, 1.0)], SubtitleStyle::default());
        assert!(full.clone().validate().is_ok());

        let missing_video = RenderRequest { video: None, ..full.clone() };
        let empty_video = RenderRequest { video: Some(Vec::new()), ..full.clone() };
        let missing_style = RenderRequest { style: None, ..full.clone() };
        let no_segments = RenderRequest { segments: Some(Vec::new()), ..full.clone() };
        let disabled = RenderRequest { enabled: false, ..full.clone() };

        for request in [missing_video, empty_video, missing_style, no_segments, disabled] {
            assert!(matches!(request.validate(), Err(CaptionError::Validation(_))));
        }
    }

    #[test]
    fn test_validate_checks_timing_and_style() {
        let bad_timing =
            RenderRequest::new(vec![1], None, vec![segment(5.0, 3.0)], SubtitleStyle::default());
        assert!(matches!(bad_timing.validate(), Err(CaptionError::Validation(_))));

        let bad_style = RenderRequest::new(
            vec![1],
            None,
            vec![segment(0.0, 1.0)],
            SubtitleStyle::default().with_font_size(80),
        );
        assert!(matches!(bad_style.validate(), Err(CaptionError::Validation(_))));
    }

    #[test]
    fn test_output_metadata() {
        let output = RenderOutput::mp4(vec![0, 1]);
        assert_eq!(output.content_type, "video/mp4");
        assert_eq!(output.filename, "video-with-captions.mp4");
    }
}
