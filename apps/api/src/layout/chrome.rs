//! Page chrome: headers, column divider, footer.
//!
//! Chrome is drawn once per page, right after the page is opened and before
//! any question block lands on it. It never moves the layout cursor; the
//! content-start Y values in `LayoutConfig` already clear it.

use crate::layout::backend::{Align, RenderBackend, TextStyle};
use crate::layout::config::{Column, LayoutConfig};
use crate::layout::engine::PaperContext;
use crate::layout::font_metrics::FontFace;

const STUDENT_INFO_SIZE_PT: f32 = 12.0;

/// Draws everything that decorates a page: header (full or compact),
/// column divider and footer.
pub fn draw_page_chrome<B: RenderBackend>(
    backend: &mut B,
    config: &LayoutConfig,
    context: &PaperContext<'_>,
    page_number: usize,
    is_first_page: bool,
) {
    if is_first_page {
        draw_first_page_header(backend, config, context);
    } else {
        draw_later_page_header(backend, config, context);
    }
    draw_column_divider(backend, config, is_first_page);
    draw_footer(backend, config, page_number);
}

/// College name, address, test title, student-info band and set band.
pub fn draw_first_page_header<B: RenderBackend>(
    backend: &mut B,
    config: &LayoutConfig,
    context: &PaperContext<'_>,
) {
    let header = &config.header;
    let centre = config.page.width / 2.0;
    let details = context.details;

    backend.draw_text(
        &details.college_name,
        centre,
        header.college_y,
        &TextStyle::new(FontFace::Bold, header.college_size_pt).aligned(Align::Center),
    );
    backend.draw_text(
        &details.college_address,
        centre,
        header.address_y,
        &TextStyle::new(FontFace::Bold, header.address_size_pt).aligned(Align::Center),
    );
    backend.draw_text(
        &context.title(),
        centre,
        header.title_y,
        &TextStyle::new(FontFace::Italic, header.title_size_pt).aligned(Align::Center),
    );

    draw_rule(backend, config, header.info_top_rule_y);
    draw_student_info(backend, config);
    draw_rule(backend, config, header.info_bottom_rule_y);
    backend.draw_line(centre, header.info_top_rule_y, centre, header.info_bottom_rule_y);

    draw_set_band(backend, config, context, header.set_band_y);
    draw_rule(backend, config, header.set_rule_y);
}

/// Compact header for every page after the first.
pub fn draw_later_page_header<B: RenderBackend>(
    backend: &mut B,
    config: &LayoutConfig,
    context: &PaperContext<'_>,
) {
    draw_set_band(backend, config, context, config.header.later_set_band_y);
    draw_rule(backend, config, config.header.later_rule_y);
}

pub fn draw_column_divider<B: RenderBackend>(
    backend: &mut B,
    config: &LayoutConfig,
    is_first_page: bool,
) {
    let top = if is_first_page {
        config.header.set_rule_y
    } else {
        config.header.later_rule_y
    };
    let x = config.divider_x();
    backend.draw_line(x, top, x, config.footer_rule_y());
}

pub fn draw_footer<B: RenderBackend>(backend: &mut B, config: &LayoutConfig, page_number: usize) {
    let rule_y = config.footer_rule_y();
    draw_rule(backend, config, rule_y);
    backend.draw_text(
        &format!("Page {page_number}"),
        config.page.width / 2.0,
        rule_y + config.footer.page_number_gap,
        &TextStyle::new(FontFace::Italic, config.footer.page_number_size_pt).aligned(Align::Center),
    );
}

fn draw_student_info<B: RenderBackend>(backend: &mut B, config: &LayoutConfig) {
    let header = &config.header;
    let style = TextStyle::new(FontFace::Regular, STUDENT_INFO_SIZE_PT);
    let left_x = header.band_inset;
    let second_row = header.student_info_y + header.student_info_row_gap;

    backend.draw_text("Name:", left_x, header.student_info_y, &style);
    backend.draw_text("Class:", left_x, second_row, &style);
    backend.draw_text("Section:", config.column_x(Column::Right), second_row, &style);
}

fn draw_set_band<B: RenderBackend>(
    backend: &mut B,
    config: &LayoutConfig,
    context: &PaperContext<'_>,
    y: f32,
) {
    let inset = config.header.band_inset;
    let style = TextStyle::new(FontFace::Bold, config.header.band_size_pt);

    backend.draw_text(&format!("SET {}", context.set_name), inset, y, &style);
    backend.draw_text(
        context.paper.band_title(),
        config.page.width - inset,
        y,
        &style.aligned(Align::Right),
    );
}

/// Full-width horizontal rule between the side margins.
fn draw_rule<B: RenderBackend>(backend: &mut B, config: &LayoutConfig, y: f32) {
    backend.draw_line(
        config.page.margin_left,
        y,
        config.page.width - config.page.margin_right,
        y,
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::layout::config::default_layout_config;
    use crate::layout::engine::Paper;
    use crate::layout::font_metrics::FontBook;
    use crate::layout::recording::{DrawOp, RecordingBackend};
    use crate::models::{SetName, TestDetails};

    fn details() -> TestDetails {
        TestDetails {
            college_name: "Riverside College".to_string(),
            college_address: "12 Hill Road".to_string(),
            test_name: "Unit Test".to_string(),
            test_number: "3".to_string(),
        }
    }

    fn record(paper: Paper, is_first_page: bool, page_number: usize) -> RecordingBackend {
        let config = default_layout_config();
        let details = details();
        let context = PaperContext {
            set_name: SetName::from_index(1).unwrap(),
            paper,
            details: &details,
        };
        let mut backend = RecordingBackend::new(Arc::new(FontBook::builtin()));
        draw_page_chrome(&mut backend, &config, &context, page_number, is_first_page);
        backend
    }

    #[test]
    fn test_first_page_question_header() {
        let backend = record(Paper::Question, true, 1);
        let texts = backend.texts_on_page(1);
        assert!(texts.contains(&"Riverside College"));
        assert!(texts.contains(&"12 Hill Road"));
        assert!(texts.contains(&">> Unit Test :: 3 <<"));
        assert!(texts.contains(&"SET B"));
        assert!(texts.contains(&"Multiple Choice Questions"));
        assert!(texts.contains(&"Name:"));
        assert!(texts.contains(&"Section:"));
        assert!(texts.contains(&"Page 1"));
    }

    #[test]
    fn test_answer_paper_title_and_band() {
        let backend = record(Paper::Answer, true, 1);
        let texts = backend.texts_on_page(1);
        assert!(texts.contains(&">> Unit Test :: 3 << (ANSWERS)"));
        assert!(texts.contains(&"Multiple Choice Questions - Answer Key"));
    }

    #[test]
    fn test_later_page_header_is_compact() {
        let backend = record(Paper::Question, false, 4);
        let texts = backend.texts_on_page(1);
        assert!(!texts.contains(&"Riverside College"));
        assert!(!texts.contains(&"Name:"));
        assert!(texts.contains(&"SET B"));
        assert!(texts.contains(&"Page 4"));
    }

    #[test]
    fn test_chrome_stays_out_of_content_area() {
        let config = default_layout_config();
        for (is_first_page, start) in [(true, config.content_start_y(true)), (false, config.content_start_y(false))] {
            let backend = record(Paper::Question, is_first_page, 1);
            for op in backend.ops() {
                if let DrawOp::Text { y, size_pt, .. } = op {
                    let bottom = y + crate::layout::font_metrics::em_to_mm(*size_pt);
                    let in_header = bottom <= start;
                    let in_footer = *y >= config.footer_rule_y();
                    assert!(in_header || in_footer, "chrome text at y={y} overlaps content");
                }
            }
        }
    }

    #[test]
    fn test_divider_spans_to_footer_rule() {
        let config = default_layout_config();
        let backend = record(Paper::Question, false, 2);
        let x = config.divider_x();
        let found = backend.ops().iter().any(|op| {
            matches!(op, DrawOp::Line { x1, x2, y2, .. }
                if (*x1 - x).abs() < 1e-4 && (*x2 - x).abs() < 1e-4
                    && (*y2 - config.footer_rule_y()).abs() < 1e-4)
        });
        assert!(found);
    }
}
