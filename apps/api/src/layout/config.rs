//! Fixed page geometry for exam papers.
//!
//! All lengths are millimetres measured from the top-left corner of the page.
//! Font sizes are points. The config is built once at startup and shared
//! read-only by every layout pass.

use serde::{Deserialize, Serialize};

use crate::layout::backend::TextStyle;
use crate::layout::font_metrics::FontFace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

/// Vertical positions of the header chrome.
///
/// The first page carries the full college/test header and a student-info
/// band; later pages only repeat the set band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderBands {
    pub college_y: f32,
    pub college_size_pt: f32,
    pub address_y: f32,
    pub address_size_pt: f32,
    pub title_y: f32,
    pub title_size_pt: f32,
    pub info_top_rule_y: f32,
    pub student_info_y: f32,
    pub student_info_row_gap: f32,
    pub info_bottom_rule_y: f32,
    pub set_band_y: f32,
    pub set_rule_y: f32,
    pub later_set_band_y: f32,
    pub later_rule_y: f32,
    pub band_size_pt: f32,
    /// Inset of the set band text from the page edges.
    pub band_inset: f32,
    pub first_page_content_start_y: f32,
    pub later_page_content_start_y: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FooterBand {
    /// Gap kept clear between the last block and the footer rule.
    pub reserve: f32,
    pub page_number_gap: f32,
    pub page_number_size_pt: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub gap: f32,
    /// Right-hand padding inside each column, kept clear of text.
    pub padding: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionConfig {
    pub font_size_pt: f32,
    /// Line-height multiplier applied to the font size.
    pub line_height: f32,
    /// Width of the gutter holding the question number.
    pub number_width: f32,
    /// Space between the statement and the first option row.
    pub spacing: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionConfig {
    pub font_size_pt: f32,
    pub label_size_pt: f32,
    pub line_height: f32,
    /// Width reserved for the `A.` label in front of each option.
    pub label_width: f32,
    /// Space after every option row.
    pub spacing: f32,
    /// Horizontal gap between two paired options.
    pub pair_gutter: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub page: PageGeometry,
    pub header: HeaderBands,
    pub footer: FooterBand,
    pub columns: ColumnConfig,
    pub question: QuestionConfig,
    pub options: OptionConfig,
    /// Space added after every question block.
    pub block_spacing: f32,
}

/// Returns the default layout: A4 portrait, 10mm margins, 12pt text.
pub fn default_layout_config() -> LayoutConfig {
    LayoutConfig {
        page: PageGeometry {
            width: 210.0,
            height: 297.0,
            margin_top: 10.0,
            margin_bottom: 10.0,
            margin_left: 10.0,
            margin_right: 10.0,
        },
        header: HeaderBands {
            college_y: 5.0,
            college_size_pt: 26.0,
            address_y: 17.0,
            address_size_pt: 15.0,
            title_y: 27.5,
            title_size_pt: 18.0,
            info_top_rule_y: 40.0,
            student_info_y: 45.0,
            student_info_row_gap: 10.0,
            info_bottom_rule_y: 70.0,
            set_band_y: 72.5,
            set_rule_y: 80.0,
            later_set_band_y: 5.0,
            later_rule_y: 15.0,
            band_size_pt: 12.0,
            band_inset: 15.0,
            first_page_content_start_y: 92.0,
            later_page_content_start_y: 25.0,
        },
        footer: FooterBand {
            reserve: 5.0,
            page_number_gap: 1.5,
            page_number_size_pt: 10.0,
        },
        columns: ColumnConfig {
            gap: 10.0,
            padding: 2.0,
        },
        question: QuestionConfig {
            font_size_pt: 12.0,
            line_height: 1.2,
            number_width: 8.0,
            spacing: 1.0,
        },
        options: OptionConfig {
            font_size_pt: 12.0,
            label_size_pt: 10.0,
            line_height: 1.15,
            label_width: 6.0,
            spacing: 1.0,
            pair_gutter: 6.0,
        },
        block_spacing: 2.0,
    }
}

impl LayoutConfig {
    pub fn usable_width(&self) -> f32 {
        self.page.width - self.page.margin_left - self.page.margin_right
    }

    pub fn column_width(&self) -> f32 {
        (self.usable_width() - self.columns.gap) / 2.0
    }

    /// Left edge of a column (where the question number is printed).
    pub fn column_x(&self, column: Column) -> f32 {
        match column {
            Column::Left => self.page.margin_left,
            Column::Right => self.page.margin_left + self.column_width() + self.columns.gap,
        }
    }

    /// X of the divider rule between the two columns.
    pub fn divider_x(&self) -> f32 {
        self.page.margin_left + self.column_width() + self.columns.gap / 2.0
    }

    /// Width available to statement text and option rows.
    pub fn text_width(&self) -> f32 {
        self.column_width() - self.question.number_width - self.columns.padding
    }

    /// Text width of an option printed alone on its row.
    pub fn single_option_width(&self) -> f32 {
        self.text_width() - self.options.label_width
    }

    /// Width of one half of a paired option row, label included.
    pub fn pair_cell_width(&self) -> f32 {
        (self.text_width() - self.options.pair_gutter) / 2.0
    }

    /// Text width of an option printed in a pair.
    pub fn paired_option_width(&self) -> f32 {
        self.pair_cell_width() - self.options.label_width
    }

    pub fn footer_rule_y(&self) -> f32 {
        self.page.height - self.page.margin_bottom
    }

    /// No block may extend below this Y.
    pub fn footer_start_y(&self) -> f32 {
        self.footer_rule_y() - self.footer.reserve
    }

    pub fn content_start_y(&self, is_first_page: bool) -> f32 {
        if is_first_page {
            self.header.first_page_content_start_y
        } else {
            self.header.later_page_content_start_y
        }
    }

    /// Vertical space in a fresh column on the given page type.
    pub fn column_capacity(&self, is_first_page: bool) -> f32 {
        self.footer_start_y() - self.content_start_y(is_first_page)
    }

    pub fn statement_style(&self) -> TextStyle {
        TextStyle::new(FontFace::Italic, self.question.font_size_pt)
            .with_line_height(self.question.line_height)
    }

    pub fn number_style(&self) -> TextStyle {
        TextStyle::new(FontFace::Bold, self.question.font_size_pt)
            .with_line_height(self.question.line_height)
    }

    /// Style used to measure every option, emphasized or not.
    pub fn option_style(&self) -> TextStyle {
        TextStyle::new(FontFace::Regular, self.options.font_size_pt)
            .with_line_height(self.options.line_height)
    }

    pub fn emphasized_option_style(&self) -> TextStyle {
        self.option_style().with_face(FontFace::Bold)
    }

    pub fn option_label_style(&self) -> TextStyle {
        TextStyle::new(FontFace::Bold, self.options.label_size_pt)
            .with_line_height(self.options.line_height)
    }
}
