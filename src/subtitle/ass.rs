//! ASS (Advanced SubStation Alpha) generation.
//!
//! One computed `Default` style per document, one `Dialogue` event per
//! segment. Positions are resolved against a fixed 1280x720 canvas; the
//! encoder never sees the real video dimensions, so percentage placement is
//! only exact for 16:9 sources.

use std::fmt::Write;

use crate::error::Result;
use crate::model::{Alignment, HexColor, Segment, SubtitleStyle, VerticalPosition};
use super::{sanitize_cue_text, split_seconds};

pub const CANVAS_WIDTH: u32 = 1280;
pub const CANVAS_HEIGHT: u32 = 720;

const STYLE_NAME: &str = "Default";
const SIDE_MARGIN: u32 = 20;
const BOTTOM_MARGIN_V: u32 = 30;
const TOP_MARGIN_V: u32 = 50;
/// Box padding as a fraction of the font size
const BOX_PADDING_RATIO: f64 = 0.075;
const OUTLINE_WIDTH: u32 = 2;
const OUTLINE_SHADOW: u32 = 1;
const SECONDARY_COLOUR: &str = "&H000000FF";
const ALPHA_OPAQUE: u8 = 0x00;
const ALPHA_TRANSPARENT: u8 = 0xFF;

/// ASS `BorderStyle` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    /// Outline plus drop shadow
    Outline = 1,
    /// Opaque box behind the text, padded by the outline width
    OpaqueBox = 3,
}

/// Fully resolved `[V4+ Styles]` entry
#[derive(Debug, Clone, PartialEq)]
pub struct AssStyle {
    pub font_name: String,
    pub font_size: u32,
    pub primary_colour: String,
    pub outline_colour: String,
    pub back_colour: String,
    pub bold: bool,
    pub italic: bool,
    pub border_style: BorderStyle,
    pub outline: u32,
    pub shadow: u32,
    /// Numpad layout: 1-3 bottom, 4-6 middle, 7-9 top
    pub alignment: u8,
    pub margin_l: u32,
    pub margin_r: u32,
    pub margin_v: u32,
}

impl AssStyle {
    /// Resolve a caption style into ASS style fields.
    /// Fails with `CaptionError::Format` on malformed colors.
    pub fn from_style(style: &SubtitleStyle) -> Result<Self> {
        let text_color: HexColor = style.color.parse()?;
        let background: HexColor = style.background_color.parse()?;
        let back_colour = ass_color(background, background_alpha(style));

        let (border_style, outline, shadow, outline_colour) = if style.no_background {
            (
                BorderStyle::Outline,
                OUTLINE_WIDTH,
                OUTLINE_SHADOW,
                ass_color(background, ALPHA_OPAQUE),
            )
        } else {
            (
                BorderStyle::OpaqueBox,
                box_padding(style.font_size),
                0,
                back_colour.clone(),
            )
        };

        let (alignment, margin_v) = if style.custom_position {
            (5, 0)
        } else {
            (
                alignment_code(style.alignment, style.position),
                match style.position {
                    VerticalPosition::Bottom => BOTTOM_MARGIN_V,
                    VerticalPosition::Top => TOP_MARGIN_V,
                },
            )
        };

        Ok(Self {
            font_name: style.primary_font(),
            font_size: style.font_size,
            primary_colour: ass_color(text_color, ALPHA_OPAQUE),
            outline_colour,
            back_colour,
            bold: style.bold,
            italic: style.italic,
            border_style,
            outline,
            shadow,
            alignment,
            margin_l: SIDE_MARGIN,
            margin_r: SIDE_MARGIN,
            margin_v,
        })
    }

    /// Format the style line for the ASS file.
    fn to_style_line(&self) -> String {
        format!(
            "Style: {name},{font},{size},{primary},{secondary},{outline_c},{back},{bold},{italic},0,0,100,100,0,0,{border},{outline_w},{shadow},{align},{ml},{mr},{mv},1",
            name = STYLE_NAME,
            font = self.font_name,
            size = self.font_size,
            primary = self.primary_colour,
            secondary = SECONDARY_COLOUR,
            outline_c = self.outline_colour,
            back = self.back_colour,
            bold = self.bold as u8,
            italic = self.italic as u8,
            border = self.border_style as u8,
            outline_w = self.outline,
            shadow = self.shadow,
            align = self.alignment,
            ml = self.margin_l,
            mr = self.margin_r,
            mv = self.margin_v,
        )
    }
}

/// `&HAABBGGRR` color tag
pub fn ass_color(color: HexColor, alpha: u8) -> String {
    format!("&H{:02X}{:02X}{:02X}{:02X}", alpha, color.b, color.g, color.r)
}

/// Background alpha: `round((1 - opacity) * 255)`, transparent when the box is off
pub fn background_alpha(style: &SubtitleStyle) -> u8 {
    if style.no_background {
        return ALPHA_TRANSPARENT;
    }
    ((1.0 - style.opacity.clamp(0.0, 1.0)) * 255.0).round() as u8
}

fn box_padding(font_size: u32) -> u32 {
    ((font_size as f64 * BOX_PADDING_RATIO).round() as u32).max(1)
}

/// Map alignment and position onto the numpad anchor grid
pub fn alignment_code(alignment: Alignment, position: VerticalPosition) -> u8 {
    let row_base = match position {
        VerticalPosition::Bottom => 1,
        VerticalPosition::Top => 7,
    };
    let column = match alignment {
        Alignment::Left => 0,
        Alignment::Center => 1,
        Alignment::Right => 2,
    };
    row_base + column
}

/// Pixel placement on the canonical canvas, custom mode only
pub fn custom_position_override(style: &SubtitleStyle) -> Option<(u32, u32)> {
    if !style.custom_position {
        return None;
    }
    let x = (style.x_position / 100.0 * CANVAS_WIDTH as f64).round() as u32;
    let y = (style.y_position / 100.0 * CANVAS_HEIGHT as f64).round() as u32;
    Some((x, y))
}

/// Format time in seconds to ASS time format (H:MM:SS.cc)
pub fn format_ass_time(seconds: f64) -> String {
    let (hours, minutes, secs, fraction) = split_seconds(seconds);
    let centis = (fraction * 100.0).floor() as u64;

    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}

/// Render segments and style as an ASS document
pub fn encode_ass(segments: &[Segment], style: &SubtitleStyle) -> Result<String> {
    let ass_style = AssStyle::from_style(style)?;
    let placement = custom_position_override(style)
        .map(|(x, y)| format!("{{\\pos({},{})}}", x, y))
        .unwrap_or_default();

    let mut content = String::new();
    // Writing into a String cannot fail
    let _ = write!(
        content,
        "[Script Info]\n\
         ScriptType: v4.00+\n\
         PlayResX: {width}\n\
         PlayResY: {height}\n\
         WrapStyle: 0\n\
         ScaledBorderAndShadow: yes\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         {style_line}\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        width = CANVAS_WIDTH,
        height = CANVAS_HEIGHT,
        style_line = ass_style.to_style_line(),
    );

    for segment in segments {
        let _ = writeln!(
            content,
            "Dialogue: 0,{},{},{},,0,0,0,,{}{}",
            format_ass_time(segment.start),
            format_ass_time(segment.end),
            STYLE_NAME,
            placement,
            sanitize_cue_text(&segment.text)
        );
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptionError;

    fn segment(start: f64, end: f64, text: &str) -> Segment {
        Segment { id: "s".to_string(), start, end, text: text.to_string() }
    }

    fn style_line(document: &str) -> &str {
        document.lines().find(|l| l.starts_with("Style: ")).unwrap()
    }

    fn style_fields(document: &str) -> Vec<String> {
        style_line(document)
            .trim_start_matches("Style: ")
            .split(',')
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_format_ass_time() {
        assert_eq!(format_ass_time(1.5), "0:00:01.50");
        assert_eq!(format_ass_time(3.25), "0:00:03.25");
        assert_eq!(format_ass_time(3725.0), "1:02:05.00");
    }

    #[test]
    fn test_dialogue_timing_and_text() {
        let doc =
            encode_ass(&[segment(1.5, 3.25, "Hello\nWorld")], &SubtitleStyle::default()).unwrap();
        assert!(doc.contains("Dialogue: 0,0:00:01.50,0:00:03.25,Default,,0,0,0,,Hello World\n"));
        assert!(doc.contains("PlayResX: 1280\nPlayResY: 720\n"));
    }

    #[test]
    fn test_color_conversion() {
        let style = SubtitleStyle::default().with_colors("#FFFFFF", "#000000").with_opacity(0.7);
        let resolved = AssStyle::from_style(&style).unwrap();

        assert_eq!(resolved.primary_colour, "&H00FFFFFF");
        assert_eq!(resolved.back_colour, "&H4D000000");
        assert_eq!(background_alpha(&style), 77);

        let red: HexColor = "#FF8000".parse().unwrap();
        assert_eq!(ass_color(red, 0), "&H000080FF");
    }

    #[test]
    fn test_opacity_extremes() {
        let opaque = SubtitleStyle::default().with_opacity(1.0);
        let clear = SubtitleStyle::default().with_opacity(0.0);
        assert_eq!(background_alpha(&opaque), 0x00);
        assert_eq!(background_alpha(&clear), 0xFF);
    }

    #[test]
    fn test_no_background_overrides_opacity() {
        for opacity in [0.0, 0.5, 1.0] {
            let style = SubtitleStyle::default().with_opacity(opacity).with_no_background(true);
            let resolved = AssStyle::from_style(&style).unwrap();

            assert_eq!(background_alpha(&style), 0xFF);
            assert!(resolved.back_colour.starts_with("&HFF"));
            assert_eq!(resolved.border_style, BorderStyle::Outline);
            assert_eq!(resolved.shadow, 1);
        }
    }

    #[test]
    fn test_box_padding_scales_with_font() {
        let doc = encode_ass(&[], &SubtitleStyle::default().with_font_size(40)).unwrap();
        let fields = style_fields(&doc);
        // BorderStyle, Outline, Shadow
        assert_eq!(fields[15], "3");
        assert_eq!(fields[16], "3");
        assert_eq!(fields[17], "0");

        let small = AssStyle::from_style(&SubtitleStyle::default().with_font_size(12)).unwrap();
        assert_eq!(small.outline, 1);
    }

    #[test]
    fn test_alignment_mapping() {
        assert_eq!(alignment_code(Alignment::Left, VerticalPosition::Top), 7);
        assert_eq!(alignment_code(Alignment::Center, VerticalPosition::Top), 8);
        assert_eq!(alignment_code(Alignment::Right, VerticalPosition::Bottom), 3);
        assert_eq!(alignment_code(Alignment::Center, VerticalPosition::Bottom), 2);

        let top = AssStyle::from_style(
            &SubtitleStyle::default().with_placement(Alignment::Left, VerticalPosition::Top),
        )
        .unwrap();
        let bottom = AssStyle::from_style(&SubtitleStyle::default()).unwrap();
        assert_eq!(top.alignment, 7);
        assert!(bottom.margin_v < top.margin_v);
    }

    #[test]
    fn test_custom_position_resolution() {
        let style = SubtitleStyle::default().with_custom_position(50.0, 90.0);
        assert_eq!(custom_position_override(&style), Some((640, 648)));

        let segments = [segment(0.0, 1.0, "hi"), segment(1.0, 2.0, "there")];
        let doc = encode_ass(&segments, &style).unwrap();
        assert_eq!(style_fields(&doc)[18], "5");
        assert!(doc.contains(",,{\\pos(640,648)}hi\n"));
        assert!(doc.contains(",,{\\pos(640,648)}there\n"));
        assert_eq!(doc.lines().filter(|l| l.starts_with("Style: ")).count(), 1);
    }

    #[test]
    fn test_font_and_flags() {
        let style = SubtitleStyle::default()
            .with_font_family("\"Roboto\", Arial")
            .with_emphasis(true, false);
        let fields = style_fields(&encode_ass(&[], &style).unwrap());

        assert_eq!(fields[1], "Roboto");
        assert_eq!(fields[7], "1");
        assert_eq!(fields[8], "0");
    }

    #[test]
    fn test_malformed_color_is_format_error() {
        let style = SubtitleStyle::default().with_colors("white", "#000000");
        assert!(matches!(encode_ass(&[], &style), Err(CaptionError::Format(_))));
    }
}
