//! Batch generation: validation, shuffling, layout and the answer key.
//!
//! Flow: validate_batch → base seed → per set (spawn_blocking): shuffle →
//!       question paper → answer paper → join in set order → answer key.
//!
//! Sets share nothing mutable. Each set task owns its RNG, its backends and
//! its layout states, so sets run concurrently while each paper is laid out
//! sequentially.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::answer_key::{AnswerKeyAggregator, AnswerKeyTable};
use crate::bank::validate_batch;
use crate::errors::AppError;
use crate::generation::naming::{answer_key_file_name, paper_file_name};
use crate::layout::{
    layout_paper, FontBook, LayoutConfig, Paper, PaperContext, PaperLayout, PdfBackend,
    RecordingBackend,
};
use crate::models::{ExamSet, Question, SetName, TestDetails};
use crate::shuffle::{build_exam_set, derive_set_seed};

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Which artifacts a batch produces. Every flag defaults to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSelection {
    #[serde(alias = "questionPapers")]
    pub question_papers: bool,
    #[serde(alias = "answerPapers")]
    pub answer_papers: bool,
    #[serde(alias = "answerKey")]
    pub answer_key: bool,
}

impl Default for OutputSelection {
    fn default() -> Self {
        Self {
            question_papers: true,
            answer_papers: true,
            answer_key: true,
        }
    }
}

impl OutputSelection {
    pub fn any(&self) -> bool {
        self.question_papers || self.answer_papers || self.answer_key
    }

    pub fn includes(&self, paper: Paper) -> bool {
        match paper {
            Paper::Question => self.question_papers,
            Paper::Answer => self.answer_papers,
        }
    }
}

/// Encoding of generated papers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    #[default]
    Pdf,
    /// JSON draw-op stream from the recording backend.
    DrawOps,
}

impl DocumentFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::DrawOps => "application/json",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::DrawOps => "json",
        }
    }
}

/// Request body for batch generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub questions: Vec<Question>,
    #[serde(alias = "numSets")]
    pub num_sets: usize,
    #[serde(alias = "testDetails")]
    pub test_details: TestDetails,
    /// Base seed. Drawn at random when absent and reported back.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub outputs: OutputSelection,
    #[serde(default)]
    pub format: DocumentFormat,
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub file_name: String,
    pub bytes: Bytes,
    pub layout: PaperLayout,
}

#[derive(Debug, Clone)]
pub struct GeneratedSet {
    pub set: ExamSet,
    pub seed: u64,
    pub question_paper: Option<GeneratedDocument>,
    pub answer_paper: Option<GeneratedDocument>,
}

impl GeneratedSet {
    pub fn paper(&self, paper: Paper) -> Option<&GeneratedDocument> {
        match paper {
            Paper::Question => self.question_paper.as_ref(),
            Paper::Answer => self.answer_paper.as_ref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedAnswerKey {
    pub file_name: String,
    pub table: AnswerKeyTable,
    pub csv: String,
}

#[derive(Debug, Clone)]
pub struct GeneratedBatch {
    pub base_seed: u64,
    pub format: DocumentFormat,
    pub sets: Vec<GeneratedSet>,
    pub answer_key: Option<GeneratedAnswerKey>,
}

impl GeneratedBatch {
    pub fn set(&self, name: SetName) -> Option<&GeneratedSet> {
        self.sets.iter().find(|s| s.set.name == name)
    }

    /// Number of documents produced across all sets.
    pub fn document_count(&self) -> usize {
        self.sets
            .iter()
            .map(|s| s.question_paper.is_some() as usize + s.answer_paper.is_some() as usize)
            .sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Generates every set of a batch and the shared answer key.
///
/// Validation runs first and rejects the whole batch with every problem
/// found; no set is generated from an invalid batch. If any set fails, the
/// batch is aborted and the error names that set.
///
/// `fonts` must come from `FontGate::ready`, so layout never starts before
/// metrics are loaded.
pub async fn generate_batch(
    request: GenerateRequest,
    fonts: Arc<FontBook>,
    config: Arc<LayoutConfig>,
) -> Result<GeneratedBatch, AppError> {
    let GenerateRequest {
        questions,
        num_sets,
        test_details,
        seed,
        outputs,
        format,
    } = request;

    validate_batch(&questions, num_sets, &test_details, &outputs).map_err(|issues| {
        warn!(problems = issues.len(), "Batch rejected before layout");
        AppError::InvalidBatch(issues)
    })?;

    let base_seed = seed.unwrap_or_else(rand::random);
    info!(
        sets = num_sets,
        questions = questions.len(),
        base_seed,
        ?format,
        "Generating batch"
    );

    let bank = Arc::new(questions);
    let details = Arc::new(test_details);

    let mut tasks = Vec::with_capacity(num_sets);
    for index in 0..num_sets {
        let name = SetName::from_index(index)
            .ok_or_else(|| AppError::Validation(format!("no set name for index {index}")))?;
        let set_seed = derive_set_seed(base_seed, index);
        let job = SetJob {
            name,
            seed: set_seed,
            bank: Arc::clone(&bank),
            details: Arc::clone(&details),
            outputs,
            format,
            fonts: Arc::clone(&fonts),
            config: Arc::clone(&config),
        };
        tasks.push((name, tokio::task::spawn_blocking(move || generate_set(&job))));
    }

    // Joined in set order so the answer key columns follow generation order.
    let mut sets = Vec::with_capacity(num_sets);
    let mut key = AnswerKeyAggregator::new();
    for (name, task) in tasks {
        let generated = task
            .await
            .map_err(|e| AppError::SetFailed {
                set: name,
                message: format!("set task panicked or was cancelled: {e}"),
            })?
            .map_err(|e| match e {
                AppError::SetFailed { .. } => e,
                other => AppError::SetFailed {
                    set: name,
                    message: other.to_string(),
                },
            })?;
        key.record_set(&generated.set);
        sets.push(generated);
    }

    let answer_key = outputs.answer_key.then(|| {
        let table = key.to_table();
        GeneratedAnswerKey {
            file_name: answer_key_file_name(&details),
            csv: table.to_csv(),
            table,
        }
    });

    let batch = GeneratedBatch {
        base_seed,
        format,
        sets,
        answer_key,
    };
    info!(
        sets = batch.sets.len(),
        documents = batch.document_count(),
        base_seed,
        "Batch generated"
    );
    Ok(batch)
}

/// Everything one set task owns.
pub struct SetJob {
    pub name: SetName,
    pub seed: u64,
    pub bank: Arc<Vec<Question>>,
    pub details: Arc<TestDetails>,
    pub outputs: OutputSelection,
    pub format: DocumentFormat,
    pub fonts: Arc<FontBook>,
    pub config: Arc<LayoutConfig>,
}

/// Shuffles one set and lays out its selected papers. CPU-bound, sequential.
pub fn generate_set(job: &SetJob) -> Result<GeneratedSet, AppError> {
    let set = build_exam_set(job.name, &job.bank, job.seed)?;

    let render = |paper: Paper| -> Result<Option<GeneratedDocument>, AppError> {
        if !job.outputs.includes(paper) {
            return Ok(None);
        }
        render_paper(job, &set, paper).map(Some)
    };
    let question_paper = render(Paper::Question)?;
    let answer_paper = render(Paper::Answer)?;

    if let (Some(q), Some(a)) = (&question_paper, &answer_paper) {
        if q.layout != a.layout {
            return Err(AppError::Render(format!(
                "Set {}: question and answer papers paginated differently",
                job.name
            )));
        }
    }

    Ok(GeneratedSet {
        set,
        seed: job.seed,
        question_paper,
        answer_paper,
    })
}

fn render_paper(job: &SetJob, set: &ExamSet, paper: Paper) -> Result<GeneratedDocument, AppError> {
    let config = job.config.as_ref();
    let context = PaperContext {
        set_name: job.name,
        paper,
        details: &job.details,
    };

    let rendered = match job.format {
        DocumentFormat::Pdf => {
            let backend = PdfBackend::new(
                Arc::clone(&job.fonts),
                config.page.width,
                config.page.height,
            );
            layout_paper(backend, config, context, &set.questions)?
        }
        DocumentFormat::DrawOps => {
            let backend = RecordingBackend::new(Arc::clone(&job.fonts));
            layout_paper(backend, config, context, &set.questions)?
        }
    };

    Ok(GeneratedDocument {
        file_name: paper_file_name(&job.details, job.name, paper, job.format),
        bytes: Bytes::from(rendered.bytes),
        layout: rendered.layout,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::default_layout_config;

    fn details() -> TestDetails {
        TestDetails {
            college_name: "Riverside College".to_string(),
            college_address: "12 Hill Road".to_string(),
            test_name: "Chemistry".to_string(),
            test_number: "2".to_string(),
        }
    }

    fn bank(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                question: format!("Which element is number {i}?"),
                choices: (0..4).map(|c| format!("element {i}-{c}")).collect(),
                answer: format!("element {i}-{}", (i + 1) % 4),
            })
            .collect()
    }

    fn request(num_sets: usize, format: DocumentFormat) -> GenerateRequest {
        GenerateRequest {
            questions: bank(4),
            num_sets,
            test_details: details(),
            seed: Some(2024),
            outputs: OutputSelection::default(),
            format,
        }
    }

    async fn run(request: GenerateRequest) -> Result<GeneratedBatch, AppError> {
        generate_batch(
            request,
            Arc::new(FontBook::builtin()),
            Arc::new(default_layout_config()),
        )
        .await
    }

    #[tokio::test]
    async fn test_two_sets_produce_four_documents_and_key() {
        let batch = run(request(2, DocumentFormat::Pdf)).await.unwrap();
        assert_eq!(batch.document_count(), 4);

        let key = batch.answer_key.as_ref().unwrap();
        assert_eq!(key.table.header, vec!["Question Number", "Set A", "Set B"]);
        assert_eq!(key.table.rows.len(), 4);
        assert!(key.csv.starts_with("Question Number,Set A,Set B\n1,"));
        assert_eq!(key.file_name, "Riverside_College_Chemistry_answer_key.csv");

        for set in &batch.sets {
            let paper = set.question_paper.as_ref().unwrap();
            assert!(paper.bytes.starts_with(b"%PDF"));
            for row in &key.table.rows {
                assert!(["A", "B", "C", "D"].contains(&row[set.set.name.index() + 1].as_str()));
            }
        }
    }

    #[tokio::test]
    async fn test_key_cells_match_each_set() {
        let batch = run(request(3, DocumentFormat::DrawOps)).await.unwrap();
        let key = batch.answer_key.unwrap();
        for set in &batch.sets {
            for (position, question) in set.set.questions.iter().enumerate() {
                let cell = &key.table.rows[position][set.set.name.index() + 1];
                assert_eq!(cell, &question.correct_letter.to_string());
            }
        }
    }

    #[tokio::test]
    async fn test_same_seed_reproduces_batch() {
        let first = run(request(2, DocumentFormat::DrawOps)).await.unwrap();
        let second = run(request(2, DocumentFormat::DrawOps)).await.unwrap();
        assert_eq!(first.base_seed, 2024);
        for (a, b) in first.sets.iter().zip(&second.sets) {
            assert_eq!(a.set, b.set);
            assert_eq!(a.question_paper.as_ref().unwrap().bytes, b.question_paper.as_ref().unwrap().bytes);
        }
    }

    #[tokio::test]
    async fn test_missing_seed_is_drawn_and_reported() {
        let mut req = request(1, DocumentFormat::DrawOps);
        req.seed = None;
        let batch = run(req).await.unwrap();
        let expected = build_exam_set(
            SetName::from_index(0).unwrap(),
            &bank(4),
            derive_set_seed(batch.base_seed, 0),
        )
        .unwrap();
        assert_eq!(batch.sets[0].set, expected);
    }

    #[tokio::test]
    async fn test_twenty_six_sets_named_a_to_z() {
        let batch = run(request(26, DocumentFormat::DrawOps)).await.unwrap();
        let names: String = batch.sets.iter().map(|s| s.set.name.letter()).collect();
        assert_eq!(names, "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    }

    #[tokio::test]
    async fn test_twenty_seven_sets_rejected_before_layout() {
        let err = run(request(27, DocumentFormat::Pdf)).await.unwrap_err();
        match err {
            AppError::InvalidBatch(issues) => {
                assert!(issues.iter().any(|i| i.field == "num_sets"));
            }
            other => panic!("expected InvalidBatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_output_selection_skips_papers() {
        let mut req = request(2, DocumentFormat::DrawOps);
        req.outputs = OutputSelection {
            question_papers: false,
            answer_papers: true,
            answer_key: false,
        };
        let batch = run(req).await.unwrap();
        assert_eq!(batch.document_count(), 2);
        assert!(batch.answer_key.is_none());
        assert!(batch.sets.iter().all(|s| s.question_paper.is_none()));
        let answer = batch.sets[1].paper(Paper::Answer).unwrap();
        assert_eq!(answer.file_name, "Riverside_College_Chemistry_SetB_answers.json");
    }

    #[test]
    fn test_generate_set_paginates_both_papers_alike() {
        let job = SetJob {
            name: SetName::from_index(0).unwrap(),
            seed: 9,
            bank: Arc::new(bank(50)),
            details: Arc::new(details()),
            outputs: OutputSelection::default(),
            format: DocumentFormat::DrawOps,
            fonts: Arc::new(FontBook::builtin()),
            config: Arc::new(default_layout_config()),
        };
        let set = generate_set(&job).unwrap();
        let q = set.question_paper.unwrap();
        let a = set.answer_paper.unwrap();
        assert_eq!(q.layout, a.layout);
        assert_eq!(q.layout.placements.len(), 50);
    }

    #[test]
    fn test_request_defaults_and_aliases() {
        let json = serde_json::json!({
            "questions": [{"question": "q", "choices": ["a", "b"], "answer": "a"}],
            "numSets": 2,
            "testDetails": {
                "collegeName": "C", "collegeAddress": "A", "testName": "T", "testNumber": "1"
            }
        });
        let req: GenerateRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.num_sets, 2);
        assert_eq!(req.outputs, OutputSelection::default());
        assert_eq!(req.format, DocumentFormat::Pdf);
        assert!(req.seed.is_none());
    }
}
