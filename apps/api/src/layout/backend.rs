//! Drawing-primitive contract consumed by the layout engine.
//!
//! Coordinates are millimetres from the top-left corner of the page and `y` is
//! the top of the line box. The engine never measures text itself: it only uses
//! the line breaks and heights a backend reports through `measure_text`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::layout::font_metrics::{em_to_mm, FontBook, FontFace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    /// `x` is the left edge of the text.
    #[default]
    Left,
    /// `x` is the horizontal centre of the text.
    Center,
    /// `x` is the right edge of the text.
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub face: FontFace,
    pub size_pt: f32,
    /// Multiplier on the font size giving the distance between baselines.
    pub line_height: f32,
    pub align: Align,
}

impl TextStyle {
    pub fn new(face: FontFace, size_pt: f32) -> Self {
        Self {
            face,
            size_pt,
            line_height: 1.15,
            align: Align::Left,
        }
    }

    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn with_face(mut self, face: FontFace) -> Self {
        self.face = face;
        self
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Height of one printed line in millimetres.
    pub fn line_height_mm(&self) -> f32 {
        em_to_mm(self.size_pt) * self.line_height
    }
}

/// Result of wrapping a piece of text at a given width.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasuredText {
    pub lines: Vec<String>,
    /// Total height of all lines, in millimetres.
    pub height: f32,
    pub line_height: f32,
}

impl MeasuredText {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Y of the top of line `i` when the first line starts at `top`.
    pub fn line_y(&self, top: f32, i: usize) -> f32 {
        top + i as f32 * self.line_height
    }
}

/// Capability set the layout engine needs from a document backend.
///
/// A backend starts with one open page. Implementations must measure
/// deterministically: the same text, width and style always produce the same
/// lines.
pub trait RenderBackend {
    fn measure_text(&self, text: &str, max_width: f32, style: &TextStyle) -> MeasuredText;

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle);

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32);

    fn new_page(&mut self);

    /// Number of pages opened so far (at least 1).
    fn page_count(&self) -> usize;

    fn finalize_document(self) -> Result<Vec<u8>, AppError>
    where
        Self: Sized;
}

/// Shared text measurement used by the bundled backends.
#[derive(Debug, Clone)]
pub struct TextMeasurer {
    fonts: Arc<FontBook>,
}

impl TextMeasurer {
    pub fn new(fonts: Arc<FontBook>) -> Self {
        Self { fonts }
    }

    pub fn measure(&self, text: &str, max_width: f32, style: &TextStyle) -> MeasuredText {
        let lines = self
            .fonts
            .wrap_mm(text, max_width, style.face, style.size_pt);
        let line_height = style.line_height_mm();
        MeasuredText {
            height: lines.len() as f32 * line_height,
            lines,
            line_height,
        }
    }

    pub fn text_width(&self, text: &str, style: &TextStyle) -> f32 {
        self.fonts.text_width_mm(text, style.face, style.size_pt)
    }

    /// Left edge of `text` drawn at `x` with the style's alignment.
    pub fn aligned_x(&self, text: &str, x: f32, style: &TextStyle) -> f32 {
        match style.align {
            Align::Left => x,
            Align::Center => x - self.text_width(text, style) / 2.0,
            Align::Right => x - self.text_width(text, style),
        }
    }
}
