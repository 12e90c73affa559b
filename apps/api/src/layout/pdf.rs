//! PDF backend built on `pdf-writer`.
//!
//! Uses the four standard Helvetica faces, so nothing is embedded and the
//! measurement tables in `font_metrics` describe exactly what gets printed.
//! Text is encoded as WinAnsi; characters outside that code page print as `?`.

use std::sync::Arc;

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use tracing::debug;

use crate::errors::AppError;
use crate::layout::backend::{MeasuredText, RenderBackend, TextMeasurer, TextStyle};
use crate::layout::font_metrics::{em_to_mm, FontBook, FontFace, PT_TO_MM};

/// Distance from the top of a line box to the baseline, as a fraction of the
/// font size.
const BASELINE_RATIO: f32 = 0.8;
const LINE_WIDTH_PT: f32 = 0.5;

pub struct PdfBackend {
    measurer: TextMeasurer,
    page_width_mm: f32,
    page_height_mm: f32,
    pages: Vec<Content>,
}

impl PdfBackend {
    pub fn new(fonts: Arc<FontBook>, page_width_mm: f32, page_height_mm: f32) -> Self {
        Self {
            measurer: TextMeasurer::new(fonts),
            page_width_mm,
            page_height_mm,
            pages: vec![Content::new()],
        }
    }

    fn current(&mut self) -> &mut Content {
        if self.pages.is_empty() {
            self.pages.push(Content::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Converts a top-left millimetre position to bottom-left points.
    fn to_pdf(&self, x_mm: f32, y_mm: f32) -> (f32, f32) {
        (x_mm / PT_TO_MM, (self.page_height_mm - y_mm) / PT_TO_MM)
    }
}

impl RenderBackend for PdfBackend {
    fn measure_text(&self, text: &str, max_width: f32, style: &TextStyle) -> MeasuredText {
        self.measurer.measure(text, max_width, style)
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        let left = self.measurer.aligned_x(text, x, style);
        let baseline = y + em_to_mm(style.size_pt) * BASELINE_RATIO;
        let (px, py) = self.to_pdf(left, baseline);
        let bytes = encode_win_ansi(text);

        self.current()
            .begin_text()
            .set_font(Name(style.face.resource_name().as_bytes()), style.size_pt)
            .next_line(px, py)
            .show(Str(&bytes))
            .end_text();
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let (ax, ay) = self.to_pdf(x1, y1);
        let (bx, by) = self.to_pdf(x2, y2);
        let content = self.current();
        content.set_line_width(LINE_WIDTH_PT);
        content.move_to(ax, ay);
        content.line_to(bx, by);
        content.stroke();
    }

    fn new_page(&mut self) {
        self.pages.push(Content::new());
    }

    fn page_count(&self) -> usize {
        self.pages.len().max(1)
    }

    fn finalize_document(self) -> Result<Vec<u8>, AppError> {
        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();

        let font_refs: Vec<(FontFace, Ref)> = FontFace::ALL
            .iter()
            .map(|face| (*face, alloc()))
            .collect();
        for (face, font_ref) in &font_refs {
            pdf.type1_font(*font_ref)
                .base_font(Name(face.base_font().as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        let page_count = self.pages.len();
        let page_ids: Vec<Ref> = (0..page_count).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..page_count).map(|_| alloc()).collect();

        for (content, id) in self.pages.into_iter().zip(&content_ids) {
            pdf.stream(*id, &content.finish());
        }

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(page_count as i32);

        let width_pt = self.page_width_mm / PT_TO_MM;
        let height_pt = self.page_height_mm / PT_TO_MM;
        for (page_id, content_id) in page_ids.iter().zip(&content_ids) {
            let mut page = pdf.page(*page_id);
            page.media_box(Rect::new(0.0, 0.0, width_pt, height_pt))
                .parent(pages_id)
                .contents(*content_id);
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            for (face, font_ref) in &font_refs {
                fonts.pair(Name(face.resource_name().as_bytes()), *font_ref);
            }
        }

        let bytes = pdf.finish();
        debug!(pages = page_count, bytes = bytes.len(), "PDF document assembled");
        Ok(bytes)
    }
}

/// Maps text to WinAnsi (CP-1252) bytes.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '\t' => b' ',
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02C6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8A,
            '\u{2039}' => 0x8B,
            '\u{0152}' => 0x8C,
            '\u{017D}' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02DC}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9A,
            '\u{203A}' => 0x9B,
            '\u{0153}' => 0x9C,
            '\u{017E}' => 0x9E,
            '\u{0178}' => 0x9F,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> PdfBackend {
        PdfBackend::new(Arc::new(FontBook::builtin()), 210.0, 297.0)
    }

    #[test]
    fn test_finalize_emits_pdf_header() {
        let mut b = backend();
        let style = TextStyle::new(FontFace::Bold, 12.0);
        b.draw_text("SET A", 15.0, 72.5, &style);
        b.draw_line(10.0, 80.0, 200.0, 80.0);
        let bytes = b.finalize_document().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_page_count_tracks_new_pages() {
        let mut b = backend();
        assert_eq!(b.page_count(), 1);
        b.new_page();
        b.new_page();
        assert_eq!(b.page_count(), 3);
        let bytes = b.finalize_document().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 3"));
    }

    #[test]
    fn test_fonts_are_registered_by_resource_name() {
        let bytes = backend().finalize_document().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Helvetica-BoldOblique"));
        assert!(text.contains("/F4"));
        assert!(text.contains("/WinAnsiEncoding"));
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("A.b"), b"A.b".to_vec());
        assert_eq!(encode_win_ansi("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("\u{201C}x\u{201D}"), vec![0x93, b'x', 0x94]);
        assert_eq!(encode_win_ansi("\u{03C0}"), b"?".to_vec());
    }

    #[test]
    fn test_y_axis_is_flipped() {
        let b = backend();
        let (_, top) = b.to_pdf(0.0, 0.0);
        let (_, bottom) = b.to_pdf(0.0, 297.0);
        assert!(top > bottom);
        assert!(bottom.abs() < 1e-3);
    }
}
