//! Two-column paginated layout of question blocks.
//!
//! # Flow
//! Each question becomes one indivisible block. Blocks are placed in order,
//! top to bottom in the left column, then the right column, then on a new
//! page. There is no backtracking: once a block is placed its page, column
//! and Y are final.
//!
//! # Parity
//! The block plan (wrapped lines and row pairing) is computed once per block
//! and drives both the height used for flow decisions and the drawing. Options
//! are always measured in the regular option face; the answer paper only
//! changes the face used to draw the correct option. A question paper and an
//! answer paper for the same set therefore paginate identically.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::layout::backend::{MeasuredText, RenderBackend};
use crate::layout::chrome::draw_page_chrome;
use crate::layout::config::{Column, LayoutConfig};
use crate::models::{option_letter, SetName, ShuffledQuestion, TestDetails};

// ────────────────────────────────────────────────────────────────────────────
// Paper identity
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Paper {
    Question,
    Answer,
}

impl Paper {
    /// Whether the correct option is drawn in the emphasized face.
    pub fn emphasizes_answer(self) -> bool {
        matches!(self, Paper::Answer)
    }

    /// Right-hand text of the set band.
    pub fn band_title(self) -> &'static str {
        match self {
            Paper::Question => "Multiple Choice Questions",
            Paper::Answer => "Multiple Choice Questions - Answer Key",
        }
    }
}

/// What a paper is about: which set, which variant, which test.
#[derive(Debug, Clone, Copy)]
pub struct PaperContext<'a> {
    pub set_name: SetName,
    pub paper: Paper,
    pub details: &'a TestDetails,
}

impl PaperContext<'_> {
    pub fn title(&self) -> String {
        let title = format!(
            ">> {} :: {} <<",
            self.details.test_name, self.details.test_number
        );
        match self.paper {
            Paper::Question => title,
            Paper::Answer => format!("{title} (ANSWERS)"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout state and flow decisions
// ────────────────────────────────────────────────────────────────────────────

/// Mutable cursor of one paper. Created per paper and never shared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutState {
    pub cursor_y: f32,
    pub column: Column,
    /// 1-based.
    pub page_number: usize,
    pub is_first_page: bool,
    pub column_has_content: bool,
}

/// Where the next block goes relative to the current cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlowDecision {
    Current,
    NextColumn,
    NewPage,
}

impl LayoutState {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            cursor_y: config.content_start_y(true),
            column: Column::Left,
            page_number: 1,
            is_first_page: true,
            column_has_content: false,
        }
    }

    /// Moves the cursor according to `decision`. `Current` is a no-op.
    pub fn apply(&mut self, decision: FlowDecision, config: &LayoutConfig) {
        match decision {
            FlowDecision::Current => {}
            FlowDecision::NextColumn => {
                self.column = Column::Right;
                self.cursor_y = config.content_start_y(self.is_first_page);
                self.column_has_content = false;
            }
            FlowDecision::NewPage => {
                self.page_number += 1;
                self.is_first_page = false;
                self.column = Column::Left;
                self.cursor_y = config.content_start_y(false);
                self.column_has_content = false;
            }
        }
    }

    /// Records a block of `height` placed at the cursor.
    pub fn advance(&mut self, height: f32, config: &LayoutConfig) {
        self.cursor_y += height + config.block_spacing;
        self.column_has_content = true;
    }
}

/// Decides where a block of `height` goes. Pure.
///
/// A block taller than any fresh column is placed in the current column when
/// that column is empty: moving on would only produce an empty column or page.
/// A block that fits a later page still moves on, even from an empty column.
pub fn decide_flow(state: &LayoutState, height: f32, config: &LayoutConfig) -> FlowDecision {
    let footer_start = config.footer_start_y();

    if state.cursor_y + height <= footer_start {
        return FlowDecision::Current;
    }
    if !state.column_has_content && is_oversize(height, config) {
        return FlowDecision::Current;
    }
    if state.column == Column::Left
        && config.content_start_y(state.is_first_page) + height <= footer_start
    {
        return FlowDecision::NextColumn;
    }
    FlowDecision::NewPage
}

/// Taller than the largest column any page offers.
fn is_oversize(height: f32, config: &LayoutConfig) -> bool {
    height > config.column_capacity(false)
}

// ────────────────────────────────────────────────────────────────────────────
// Block planning
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedOption {
    /// Position in `shuffled_choices`.
    pub index: usize,
    pub letter: char,
    pub text: MeasuredText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OptionRow {
    /// Two consecutive options sharing one row, each exactly one line.
    Pair(PlannedOption, PlannedOption),
    Single(PlannedOption),
}

impl OptionRow {
    /// Height of the row's text, excluding the spacing after it.
    pub fn content_height(&self) -> f32 {
        match self {
            OptionRow::Pair(a, b) => a.text.height.max(b.text.height),
            OptionRow::Single(o) => o.text.height,
        }
    }
}

/// Wrapped lines and row structure of one question block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockPlan {
    pub statement: MeasuredText,
    pub rows: Vec<OptionRow>,
    /// Total height of the block, excluding `block_spacing`.
    pub height: f32,
}

/// Measures a question and groups its options into rows.
///
/// Options are scanned left to right with a lookahead of one: a pair is
/// formed when both options wrap to exactly one line at the paired width.
pub fn plan_block<B: RenderBackend>(
    backend: &B,
    config: &LayoutConfig,
    question: &ShuffledQuestion,
) -> BlockPlan {
    let statement = backend.measure_text(
        &question.text,
        config.text_width(),
        &config.statement_style(),
    );

    let style = config.option_style();
    let choices = &question.shuffled_choices;
    let planned = |index: usize, text: MeasuredText| PlannedOption {
        index,
        letter: option_letter(index),
        text,
    };

    let mut rows = Vec::with_capacity(choices.len());
    let mut i = 0;
    while i < choices.len() {
        if i + 1 < choices.len() {
            let width = config.paired_option_width();
            let first = backend.measure_text(&choices[i], width, &style);
            let second = backend.measure_text(&choices[i + 1], width, &style);
            if first.line_count() == 1 && second.line_count() == 1 {
                rows.push(OptionRow::Pair(planned(i, first), planned(i + 1, second)));
                i += 2;
                continue;
            }
        }
        let single = backend.measure_text(&choices[i], config.single_option_width(), &style);
        rows.push(OptionRow::Single(planned(i, single)));
        i += 1;
    }

    let options_height: f32 = rows
        .iter()
        .map(|row| row.content_height() + config.options.spacing)
        .sum();

    BlockPlan {
        height: statement.height + config.question.spacing + options_height,
        statement,
        rows,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Final position of one numbered block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub number: usize,
    pub original_index: usize,
    pub page: usize,
    pub column: Column,
    pub y: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperLayout {
    pub placements: Vec<Placement>,
    pub page_count: usize,
}

#[derive(Debug, Clone)]
pub struct RenderedPaper {
    pub bytes: Vec<u8>,
    pub layout: PaperLayout,
}

pub struct LayoutEngine<'a, B: RenderBackend> {
    backend: B,
    config: &'a LayoutConfig,
    context: PaperContext<'a>,
    state: LayoutState,
    placements: Vec<Placement>,
}

impl<'a, B: RenderBackend> LayoutEngine<'a, B> {
    /// Takes a backend with one fresh page and draws the first-page chrome.
    pub fn new(mut backend: B, config: &'a LayoutConfig, context: PaperContext<'a>) -> Self {
        let state = LayoutState::new(config);
        draw_page_chrome(&mut backend, config, &context, state.page_number, true);
        Self {
            backend,
            config,
            context,
            state,
            placements: Vec::new(),
        }
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    /// Places the next question. Numbers run 1..N in call order.
    pub fn place_question(&mut self, question: &ShuffledQuestion) -> Placement {
        let plan = plan_block(&self.backend, self.config, question);

        let decision = decide_flow(&self.state, plan.height, self.config);
        match decision {
            FlowDecision::Current => {}
            FlowDecision::NextColumn => self.state.apply(decision, self.config),
            FlowDecision::NewPage => {
                self.state.apply(decision, self.config);
                self.backend.new_page();
                draw_page_chrome(
                    &mut self.backend,
                    self.config,
                    &self.context,
                    self.state.page_number,
                    false,
                );
            }
        }

        let number = self.placements.len() + 1;
        if is_oversize(plan.height, self.config) {
            warn!(
                set = %self.context.set_name,
                number,
                height = plan.height,
                capacity = self.config.column_capacity(false),
                "Question block taller than a column, placing it at the top of an empty column"
            );
        }

        let placement = Placement {
            number,
            original_index: question.original_index,
            page: self.state.page_number,
            column: self.state.column,
            y: self.state.cursor_y,
            height: plan.height,
        };
        self.draw_block(number, question, &plan, &placement);
        self.state.advance(plan.height, self.config);
        self.placements.push(placement);
        placement
    }

    fn draw_block(
        &mut self,
        number: usize,
        question: &ShuffledQuestion,
        plan: &BlockPlan,
        placement: &Placement,
    ) {
        let config = self.config;
        let x = config.column_x(placement.column);
        let text_x = x + config.question.number_width;
        let top = placement.y;

        self.backend
            .draw_text(&format!("{number}."), x, top, &config.number_style());

        let statement_style = config.statement_style();
        for (i, line) in plan.statement.lines.iter().enumerate() {
            self.backend
                .draw_text(line, text_x, plan.statement.line_y(top, i), &statement_style);
        }

        let correct = question.correct_index();
        let mut row_y = top + plan.statement.height + config.question.spacing;
        for row in &plan.rows {
            match row {
                OptionRow::Pair(first, second) => {
                    let second_x = text_x + config.pair_cell_width() + config.options.pair_gutter;
                    self.draw_option(first, text_x, row_y, correct);
                    self.draw_option(second, second_x, row_y, correct);
                }
                OptionRow::Single(option) => self.draw_option(option, text_x, row_y, correct),
            }
            row_y += row.content_height() + config.options.spacing;
        }
    }

    fn draw_option(&mut self, option: &PlannedOption, x: f32, y: f32, correct: usize) {
        let config = self.config;
        self.backend.draw_text(
            &format!("{}.", option.letter),
            x,
            y,
            &config.option_label_style(),
        );

        let style = if self.context.paper.emphasizes_answer() && option.index == correct {
            config.emphasized_option_style()
        } else {
            config.option_style()
        };
        let text_x = x + config.options.label_width;
        for (i, line) in option.text.lines.iter().enumerate() {
            self.backend
                .draw_text(line, text_x, option.text.line_y(y, i), &style);
        }
    }

    /// Finalizes the backend and returns the document with its layout.
    pub fn finish(self) -> Result<RenderedPaper, AppError> {
        let page_count = self.backend.page_count();
        if page_count != self.state.page_number {
            return Err(AppError::Render(format!(
                "backend reports {page_count} pages but layout opened {}",
                self.state.page_number
            )));
        }

        debug!(
            set = %self.context.set_name,
            paper = ?self.context.paper,
            questions = self.placements.len(),
            pages = page_count,
            "Paper laid out"
        );

        let bytes = self.backend.finalize_document()?;
        Ok(RenderedPaper {
            bytes,
            layout: PaperLayout {
                placements: self.placements,
                page_count,
            },
        })
    }
}

/// Lays out every question of a set on one paper and finalizes it.
pub fn layout_paper<B: RenderBackend>(
    backend: B,
    config: &LayoutConfig,
    context: PaperContext<'_>,
    questions: &[ShuffledQuestion],
) -> Result<RenderedPaper, AppError> {
    let mut engine = LayoutEngine::new(backend, config, context);
    for question in questions {
        engine.place_question(question);
    }
    engine.finish()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
