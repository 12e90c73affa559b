//! Axum route handlers for the Papers API.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::answer_key::AnswerKeyTable;
use crate::errors::AppError;
use crate::generation::generator::{
    generate_batch, DocumentFormat, GenerateRequest, GeneratedDocument, GeneratedSet,
};
use crate::generation::store::StoredBatch;
use crate::layout::Paper;
use crate::models::SetName;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub file_name: String,
    pub page_count: usize,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct SetSummary {
    pub set: SetName,
    pub seed: u64,
    pub question_count: usize,
    pub question_paper: Option<DocumentSummary>,
    pub answer_paper: Option<DocumentSummary>,
}

#[derive(Debug, Serialize)]
pub struct AnswerKeySummary {
    pub file_name: String,
    pub download_url: String,
    pub table: AnswerKeyTable,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub batch_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Send this back as `seed` to reproduce the batch.
    pub base_seed: u64,
    pub format: DocumentFormat,
    pub sets: Vec<SetSummary>,
    pub answer_key: Option<AnswerKeySummary>,
}

impl BatchResponse {
    fn from_stored(stored: &StoredBatch) -> Self {
        let batch_id = stored.id;
        let batch = &stored.batch;

        let document = |set: &GeneratedSet, paper: Paper, doc: &GeneratedDocument| DocumentSummary {
            file_name: doc.file_name.clone(),
            page_count: doc.layout.page_count,
            download_url: format!(
                "/api/v1/papers/{batch_id}/sets/{}/{}",
                set.set.name,
                paper_segment(paper)
            ),
        };

        let sets = batch
            .sets
            .iter()
            .map(|set| SetSummary {
                set: set.set.name,
                seed: set.seed,
                question_count: set.set.questions.len(),
                question_paper: set
                    .question_paper
                    .as_ref()
                    .map(|doc| document(set, Paper::Question, doc)),
                answer_paper: set
                    .answer_paper
                    .as_ref()
                    .map(|doc| document(set, Paper::Answer, doc)),
            })
            .collect();

        let answer_key = batch.answer_key.as_ref().map(|key| AnswerKeySummary {
            file_name: key.file_name.clone(),
            download_url: format!("/api/v1/papers/{batch_id}/answer-key.csv"),
            table: key.table.clone(),
        });

        BatchResponse {
            batch_id,
            created_at: stored.created_at,
            base_seed: batch.base_seed,
            format: batch.format,
            sets,
            answer_key,
        }
    }
}

fn paper_segment(paper: Paper) -> &'static str {
    match paper {
        Paper::Question => "question",
        Paper::Answer => "answer",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/papers
///
/// Validates the bank, generates every set and stores the batch for download.
/// Waits for font metrics before any layout begins.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(mut request): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<BatchResponse>), AppError> {
    if request.seed.is_none() {
        request.seed = state.config.shuffle_seed;
    }

    let fonts = state.fonts.ready().await?;
    let batch = generate_batch(request, fonts, state.layout.clone()).await?;
    let stored = state.store.insert(batch).await;

    info!(batch_id = %stored.id, "Batch stored");
    Ok((StatusCode::CREATED, Json(BatchResponse::from_stored(&stored))))
}

/// GET /api/v1/papers/:batch_id/sets/:set/:paper
pub async fn handle_download_paper(
    State(state): State<AppState>,
    Path((batch_id, set, paper)): Path<(Uuid, String, Paper)>,
) -> Result<impl IntoResponse, AppError> {
    let set_name = parse_set_name(&set)?;
    let stored = find_batch(&state, batch_id).await?;

    let document = stored
        .batch
        .set(set_name)
        .ok_or_else(|| AppError::NotFound(format!("Set {set_name} is not part of batch {batch_id}")))?
        .paper(paper)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "{} paper for Set {set_name} was not generated",
                paper_segment(paper)
            ))
        })?;

    Ok(attachment(
        stored.batch.format.content_type(),
        &document.file_name,
        document.bytes.clone(),
    ))
}

/// GET /api/v1/papers/:batch_id/answer-key.csv
pub async fn handle_download_answer_key(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let stored = find_batch(&state, batch_id).await?;
    let key = stored
        .batch
        .answer_key
        .as_ref()
        .ok_or_else(|| AppError::NotFound(format!("Batch {batch_id} has no answer key")))?;

    Ok(attachment(
        "text/csv; charset=utf-8",
        &key.file_name,
        Bytes::from(key.csv.clone()),
    ))
}

async fn find_batch(state: &AppState, batch_id: Uuid) -> Result<std::sync::Arc<StoredBatch>, AppError> {
    state
        .store
        .get(batch_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Batch {batch_id} not found")))
}

fn parse_set_name(raw: &str) -> Result<SetName, AppError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => SetName::try_from(c).map_err(AppError::Validation),
        _ => Err(AppError::Validation(format!(
            "'{raw}' is not a set name (expected A-Z)"
        ))),
    }
}

fn attachment(content_type: &str, file_name: &str, body: Bytes) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
}
