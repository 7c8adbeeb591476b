use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CaptionError, Result};

pub const MIN_FONT_SIZE: u32 = 12;
pub const MAX_FONT_SIZE: u32 = 48;

/// One timed unit of transcribed or translated text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn new<I: Into<String>, T: Into<String>>(
        id: I,
        start: f64,
        end: f64,
        text: T,
    ) -> Result<Self> {
        let segment = Self {
            id: id.into(),
            start,
            end,
            text: text.into(),
        };
        segment.validate()?;
        Ok(segment)
    }

    /// Check `0 <= start < end` with finite bounds
    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(CaptionError::Validation(format!(
                "segment '{}' has non-finite timing", self.id
            )));
        }
        if self.start < 0.0 {
            return Err(CaptionError::Validation(format!(
                "segment '{}' starts before zero ({})", self.id, self.start
            )));
        }
        if self.start >= self.end {
            return Err(CaptionError::Validation(format!(
                "segment '{}' has start {} not before end {}", self.id, self.start, self.end
            )));
        }
        Ok(())
    }
}

/// Validate a whole segment list, reporting the first offender
pub fn validate_segments(segments: &[Segment]) -> Result<()> {
    for (index, segment) in segments.iter().enumerate() {
        segment.validate().map_err(|e| match e {
            CaptionError::Validation(msg) => {
                CaptionError::Validation(format!("segment #{}: {}", index + 1, msg))
            }
            other => other,
        })?;
    }
    Ok(())
}

/// Segment list as read from disk: either a bare array or the
/// speech-to-text response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Transcript {
    Response {
        segments: Vec<Segment>,
        #[serde(rename = "detectedLanguageCode", default)]
        detected_language_code: Option<String>,
    },
    Segments(Vec<Segment>),
}

impl Transcript {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            Transcript::Response {
                detected_language_code,
                ..
            } => detected_language_code.as_deref(),
            Transcript::Segments(_) => None,
        }
    }

    pub fn into_segments(self) -> Vec<Segment> {
        match self {
            Transcript::Response { segments, .. } => segments,
            Transcript::Segments(segments) => segments,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalPosition {
    Top,
    #[default]
    Bottom,
}

/// Visual configuration for caption rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubtitleStyle {
    /// Font size in px (12-48)
    pub font_size: u32,
    /// CSS-style fallback list; only the first entry is significant
    pub font_family: String,
    /// Text color, `#RRGGBB`
    pub color: String,
    /// Background color, `#RRGGBB`
    pub background_color: String,
    /// Background opacity (0.0-1.0)
    pub opacity: f64,
    pub bold: bool,
    pub italic: bool,
    pub alignment: Alignment,
    pub position: VerticalPosition,
    /// Suppress the background box and draw a text outline instead
    pub no_background: bool,
    pub custom_position: bool,
    /// Horizontal placement in percent of the canvas (custom mode only)
    pub x_position: f64,
    /// Vertical placement in percent of the canvas (custom mode only)
    pub y_position: f64,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_size: 24,
            font_family: "Arial, sans-serif".to_string(),
            color: "#FFFFFF".to_string(),
            background_color: "#000000".to_string(),
            opacity: 0.7,
            bold: false,
            italic: false,
            alignment: Alignment::Center,
            position: VerticalPosition::Bottom,
            no_background: false,
            custom_position: false,
            x_position: 50.0,
            y_position: 90.0,
        }
    }
}

impl SubtitleStyle {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reject numeric fields outside their documented ranges. Values are never clamped.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size) {
            return Err(CaptionError::Validation(format!(
                "fontSize {} outside {}-{}", self.font_size, MIN_FONT_SIZE, MAX_FONT_SIZE
            )));
        }
        check_range("opacity", self.opacity, 0.0, 1.0)?;
        check_range("xPosition", self.x_position, 0.0, 100.0)?;
        check_range("yPosition", self.y_position, 0.0, 100.0)?;
        Ok(())
    }

    /// First entry of the font fallback list with quotes stripped
    pub fn primary_font(&self) -> String {
        let first = self.font_family.split(',').next().unwrap_or_default().trim();
        first.trim_matches(|c| c == '"' || c == '\'').trim().to_string()
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_font_family<S: Into<String>>(mut self, font_family: S) -> Self {
        self.font_family = font_family.into();
        self
    }

    pub fn with_colors<C: Into<String>, B: Into<String>>(
        mut self,
        color: C,
        background_color: B,
    ) -> Self {
        self.color = color.into();
        self.background_color = background_color.into();
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_emphasis(mut self, bold: bool, italic: bool) -> Self {
        self.bold = bold;
        self.italic = italic;
        self
    }

    pub fn with_placement(mut self, alignment: Alignment, position: VerticalPosition) -> Self {
        self.alignment = alignment;
        self.position = position;
        self.custom_position = false;
        self
    }

    pub fn with_custom_position(mut self, x_position: f64, y_position: f64) -> Self {
        self.custom_position = true;
        self.x_position = x_position;
        self.y_position = y_position;
        self
    }

    pub fn with_no_background(mut self, no_background: bool) -> Self {
        self.no_background = no_background;
        self
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(CaptionError::Validation(format!(
            "{} {} outside {}-{}", field, value, min, max
        )));
    }
    Ok(())
}

/// CSS `#RRGGBB` color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl FromStr for HexColor {
    type Err = CaptionError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| CaptionError::Format(format!("color '{}' must start with '#'", s)))?;

        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CaptionError::Format(format!("color '{}' is not #RRGGBB", s)));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| CaptionError::Format(format!("color '{}': {}", s, e)))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
