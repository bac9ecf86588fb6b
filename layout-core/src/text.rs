//! Text measurement and line layout.
//!
//! Layout is greedy word wrapping at the box width with explicit `\n`
//! breaks. Measurement is injected through [`TextMeasure`] so the engine can
//! run headless with [`ApproximateMetrics`] while a renderer supplies real
//! font metrics.

use crate::{TextAlign, TextStyle, Unit};

/// Measures the advance width of a single line of text.
pub trait TextMeasure {
    /// Width of `text` rendered on one line, in the same unit as `font_size`.
    ///
    /// `font_size` is already converted to document units; tracking is
    /// included by the implementation.
    fn line_width(&self, text: &str, style: &TextStyle, font_size: f32) -> f32;
}

/// Font-independent estimate based on average glyph proportions.
#[derive(Debug, Clone, Copy)]
pub struct ApproximateMetrics {
    /// Average glyph advance as a fraction of the em.
    pub average_advance: f32,
}

impl Default for ApproximateMetrics {
    fn default() -> Self {
        Self {
            average_advance: 0.55,
        }
    }
}

impl TextMeasure for ApproximateMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn line_width(&self, text: &str, style: &TextStyle, font_size: f32) -> f32 {
        let glyphs = text.chars().count() as f32;
        if glyphs == 0.0 {
            return 0.0;
        }
        let weight_factor = if style.font_weight >= 600 { 1.08 } else { 1.0 };
        let advance = font_size * self.average_advance * weight_factor;
        let tracking = tracking_offset(style, font_size);
        glyphs * advance + (glyphs - 1.0) * tracking
    }
}

/// Extra space between glyphs for the style's tracking.
#[must_use]
pub fn tracking_offset(style: &TextStyle, font_size: f32) -> f32 {
    style.tracking / 1000.0 * font_size
}

/// One laid-out line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Text of the line, without the trailing break.
    pub text: String,
    /// Measured width.
    pub width: f32,
    /// Left edge relative to the box, after alignment.
    pub offset_x: f32,
    /// Baseline relative to the box top.
    pub baseline: f32,
}

/// Result of laying text out in a box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    /// Lines in reading order.
    pub lines: Vec<TextLine>,
    /// Widest line.
    pub width: f32,
    /// Total height of all lines.
    pub height: f32,
    /// Font size in document units.
    pub font_size: f32,
    /// Distance between baselines.
    pub line_advance: f32,
}

impl TextLayout {
    /// Whether the laid-out extent exceeds a `width` × `height` box.
    #[must_use]
    pub fn overflows(&self, width: f32, height: f32) -> bool {
        const TOLERANCE: f32 = 1e-3;
        self.width > width + TOLERANCE || self.height > height + TOLERANCE
    }
}

/// Lay out `text` inside a box of `box_width`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn layout_text(
    text: &str,
    style: &TextStyle,
    box_width: f32,
    unit: Unit,
    measure: &dyn TextMeasure,
) -> TextLayout {
    let font_size = unit.from_points(style.font_size);
    let line_advance = font_size * style.line_height;

    let mut raw_lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, style, font_size, box_width, measure, &mut raw_lines);
    }
    if text.is_empty() {
        raw_lines.clear();
    }

    // Centre the em box inside each line and put the baseline at 80% of it.
    let leading = (line_advance - font_size) / 2.0;
    let lines: Vec<TextLine> = raw_lines
        .into_iter()
        .enumerate()
        .map(|(idx, (text, width))| {
            let offset_x = match style.align {
                TextAlign::Left => 0.0,
                TextAlign::Center => (box_width - width) / 2.0,
                TextAlign::Right => box_width - width,
            };
            TextLine {
                text,
                width,
                offset_x,
                baseline: idx as f32 * line_advance + leading + font_size * 0.8,
            }
        })
        .collect();

    let width = lines.iter().map(|l| l.width).fold(0.0_f32, f32::max);
    let height = lines.len() as f32 * line_advance;

    TextLayout {
        lines,
        width,
        height,
        font_size,
        line_advance,
    }
}

fn wrap_paragraph(
    paragraph: &str,
    style: &TextStyle,
    font_size: f32,
    box_width: f32,
    measure: &dyn TextMeasure,
    out: &mut Vec<(String, f32)>,
) {
    let mut current = String::new();
    let mut current_width = 0.0;

    for word in paragraph.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        let candidate_width = measure.line_width(&candidate, style, font_size);

        if candidate_width <= box_width || current.is_empty() {
            current = candidate;
            current_width = candidate_width;
        } else {
            out.push((std::mem::take(&mut current), current_width));
            current_width = measure.line_width(word, style, font_size);
            current = word.to_string();
        }
    }

    // Blank paragraphs still take a line.
    out.push((current, current_width));
}
