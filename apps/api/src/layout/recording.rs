//! Backend that buffers draw operations instead of encoding a document.
//!
//! Finalizes to a JSON draw-op stream. Used for golden-output comparisons and
//! for clients that render papers themselves.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::layout::backend::{Align, MeasuredText, RenderBackend, TextMeasurer, TextStyle};
use crate::layout::font_metrics::{FontBook, FontFace};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Text {
        page: usize,
        text: String,
        /// Left edge after alignment.
        x: f32,
        y: f32,
        face: FontFace,
        size_pt: f32,
        align: Align,
    },
    Line {
        page: usize,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    NewPage {
        page: usize,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordedDocument {
    pub page_count: usize,
    pub ops: Vec<DrawOp>,
}

pub struct RecordingBackend {
    measurer: TextMeasurer,
    ops: Vec<DrawOp>,
    pages: usize,
}

impl RecordingBackend {
    pub fn new(fonts: Arc<FontBook>) -> Self {
        Self {
            measurer: TextMeasurer::new(fonts),
            ops: Vec::new(),
            pages: 1,
        }
    }
}

#[cfg(test)]
impl RecordingBackend {
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text drawn on `page` (1-based), in drawing order.
    pub fn texts_on_page(&self, page: usize) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { page: p, text, .. } if *p == page => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl RenderBackend for RecordingBackend {
    fn measure_text(&self, text: &str, max_width: f32, style: &TextStyle) -> MeasuredText {
        self.measurer.measure(text, max_width, style)
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        self.ops.push(DrawOp::Text {
            page: self.pages,
            text: text.to_string(),
            x: self.measurer.aligned_x(text, x, style),
            y,
            face: style.face,
            size_pt: style.size_pt,
            align: style.align,
        });
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.ops.push(DrawOp::Line {
            page: self.pages,
            x1,
            y1,
            x2,
            y2,
        });
    }

    fn new_page(&mut self) {
        self.pages += 1;
        self.ops.push(DrawOp::NewPage { page: self.pages });
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn finalize_document(self) -> Result<Vec<u8>, AppError> {
        let document = RecordedDocument {
            page_count: self.pages,
            ops: self.ops,
        };
        serde_json::to_vec(&document)
            .map_err(|e| AppError::Render(format!("Failed to serialize draw ops: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> RecordingBackend {
        RecordingBackend::new(Arc::new(FontBook::builtin()))
    }

    #[test]
    fn test_starts_with_one_page() {
        let b = backend();
        assert_eq!(b.page_count(), 1);
        assert!(b.ops().is_empty());
    }

    #[test]
    fn test_ops_are_tagged_with_current_page() {
        let mut b = backend();
        let style = TextStyle::new(FontFace::Regular, 12.0);
        b.draw_text("first", 10.0, 20.0, &style);
        b.new_page();
        b.draw_text("second", 10.0, 20.0, &style);
        b.draw_line(0.0, 1.0, 2.0, 1.0);

        assert_eq!(b.page_count(), 2);
        assert_eq!(b.texts_on_page(1), vec!["first"]);
        assert_eq!(b.texts_on_page(2), vec!["second"]);
        assert!(matches!(b.ops()[3], DrawOp::Line { page: 2, .. }));
    }

    #[test]
    fn test_centered_text_records_left_edge() {
        let mut b = backend();
        let style = TextStyle::new(FontFace::Bold, 12.0).aligned(Align::Center);
        b.draw_text("Page 1", 105.0, 288.0, &style);
        match &b.ops()[0] {
            DrawOp::Text { x, align, .. } => {
                assert!(*x < 105.0);
                assert_eq!(*align, Align::Center);
            }
            other => panic!("expected text op, got {other:?}"),
        }
    }

    #[test]
    fn test_finalize_produces_json_document() {
        let mut b = backend();
        b.draw_line(0.0, 0.0, 10.0, 0.0);
        b.new_page();
        let bytes = b.finalize_document().unwrap();
        let doc: RecordedDocument = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc.page_count, 2);
        assert_eq!(doc.ops.len(), 2);
        assert_eq!(doc.ops[1], DrawOp::NewPage { page: 2 });
    }
}
