//! services/api/src/web/library.rs
//!
//! Endpoints for a user's saved summaries, flashcard decks, and Q&A history.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_assistant_core::domain::{Flashcard, FlashcardRecord, QARecord, SummaryRecord};
use study_assistant_core::library::{save_deck, save_summary};
use study_assistant_core::preferences::CardCount;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::web::extract::ApiJson;
use crate::web::functions::CardBody;
use crate::web::state::AppState;

//=========================================================================================
// API Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SaveSummaryRequest {
    pub original_text: String,
    pub summary_text: String,
    pub title: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    pub id: Uuid,
    pub title: Option<String>,
    pub original_text: String,
    pub summary_text: String,
    pub created_at: DateTime<Utc>,
}

impl From<SummaryRecord> for SummaryResponse {
    fn from(record: SummaryRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            original_text: record.original_text,
            summary_text: record.summary_text,
            created_at: record.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct SaveDeckRequest {
    #[serde(default)]
    pub original_text: String,
    pub title: Option<String>,
    #[serde(default)]
    pub cards: Vec<CardBody>,
}

#[derive(Serialize, ToSchema)]
pub struct SaveDeckResponse {
    pub saved: usize,
    pub title: String,
}

#[derive(Serialize, ToSchema)]
pub struct FlashcardResponse {
    pub id: Uuid,
    pub title: Option<String>,
    pub original_text: String,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl From<FlashcardRecord> for FlashcardResponse {
    fn from(record: FlashcardRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            original_text: record.original_text,
            question: record.question,
            answer: record.answer,
            created_at: record.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct QAResponse {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl From<QARecord> for QAResponse {
    fn from(record: QARecord) -> Self {
        Self {
            id: record.id,
            question: record.question,
            answer: record.answer,
            created_at: record.created_at,
        }
    }
}

//=========================================================================================
// Summaries
//=========================================================================================

/// Save a summary. A missing title becomes "Summary YYYY-MM-DD".
#[utoipa::path(
    post,
    path = "/library/summaries",
    request_body = SaveSummaryRequest,
    responses(
        (status = 201, description = "Summary saved", body = SummaryResponse),
        (status = 401, description = "Not signed in", body = ErrorBody)
    ),
    security(("session" = [])),
    tag = "library"
)]
pub async fn save_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    ApiJson(req): ApiJson<SaveSummaryRequest>,
) -> Result<(StatusCode, Json<SummaryResponse>), ApiError> {
    let record = save_summary(
        state.db.as_ref(),
        user_id,
        &req.original_text,
        &req.summary_text,
        req.title.as_deref(),
    )
    .await?;
    info!(summary_id = %record.id, "Summary saved");
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// List the caller's summaries, newest first.
#[utoipa::path(
    get,
    path = "/library/summaries",
    responses(
        (status = 200, description = "Saved summaries", body = [SummaryResponse]),
        (status = 401, description = "Not signed in", body = ErrorBody)
    ),
    security(("session" = [])),
    tag = "library"
)]
pub async fn list_summaries_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<SummaryResponse>>, ApiError> {
    let summaries = state.db.list_summaries(user_id).await?;
    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

/// Fetch one of the caller's summaries.
#[utoipa::path(
    get,
    path = "/library/summaries/{id}",
    params(("id" = Uuid, Path, description = "Summary id")),
    responses(
        (status = 200, description = "The summary", body = SummaryResponse),
        (status = 404, description = "No such summary for this user", body = ErrorBody)
    ),
    security(("session" = [])),
    tag = "library"
)]
pub async fn get_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(summary_id): Path<Uuid>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let summary = state.db.get_summary(user_id, summary_id).await?;
    Ok(Json(summary.into()))
}

//=========================================================================================
// Flashcards
//=========================================================================================

/// Save a deck, one row per card. A missing title becomes "Deck - YYYY-MM-DD".
/// Decks larger than the maximum generated card count are rejected.
///
/// Cards are inserted concurrently without a transaction. If any insert fails the
/// response is a 500 listing the failed positions; the other cards stay saved.
#[utoipa::path(
    post,
    path = "/library/flashcards",
    request_body = SaveDeckRequest,
    responses(
        (status = 201, description = "Every card saved", body = SaveDeckResponse),
        (status = 400, description = "Empty or oversized deck", body = ErrorBody),
        (status = 500, description = "Some cards were not saved", body = ErrorBody)
    ),
    security(("session" = [])),
    tag = "library"
)]
pub async fn save_deck_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    ApiJson(req): ApiJson<SaveDeckRequest>,
) -> Result<(StatusCode, Json<SaveDeckResponse>), ApiError> {
    if req.cards.is_empty() {
        return Err(ApiError::BadRequest("No flashcards to save".to_string()));
    }
    // One insert runs per card, so the deck size bounds the concurrent inserts.
    if req.cards.len() > CardCount::MAX as usize {
        return Err(ApiError::BadRequest(format!(
            "A deck holds at most {} flashcards",
            CardCount::MAX
        )));
    }
    let cards: Vec<Flashcard> = req.cards.into_iter().map(Flashcard::from).collect();

    let report = save_deck(
        state.db.as_ref(),
        user_id,
        &req.original_text,
        req.title.as_deref(),
        &cards,
    )
    .await;

    if !report.is_complete() {
        warn!(
            saved = report.saved.len(),
            failed = report.failed.len(),
            "Deck saved partially"
        );
        return Err(ApiError::DeckSave {
            saved: report.saved.len(),
            failed: report
                .failed
                .into_iter()
                .map(|f| (f.index, f.error))
                .collect(),
        });
    }

    info!(saved = report.saved.len(), title = %report.title, "Deck saved");
    Ok((
        StatusCode::CREATED,
        Json(SaveDeckResponse {
            saved: report.saved.len(),
            title: report.title,
        }),
    ))
}

/// List the caller's saved cards, newest first.
#[utoipa::path(
    get,
    path = "/library/flashcards",
    responses(
        (status = 200, description = "Saved cards", body = [FlashcardResponse]),
        (status = 401, description = "Not signed in", body = ErrorBody)
    ),
    security(("session" = [])),
    tag = "library"
)]
pub async fn list_flashcards_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<FlashcardResponse>>, ApiError> {
    let cards = state.db.list_flashcards(user_id).await?;
    Ok(Json(cards.into_iter().map(Into::into).collect()))
}

//=========================================================================================
// Q&A History
//=========================================================================================

/// List the caller's answered questions, newest first.
#[utoipa::path(
    get,
    path = "/library/qa",
    responses(
        (status = 200, description = "Q&A history", body = [QAResponse]),
        (status = 401, description = "Not signed in", body = ErrorBody)
    ),
    security(("session" = [])),
    tag = "library"
)]
pub async fn list_qa_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<QAResponse>>, ApiError> {
    let history = state.db.list_qa(user_id).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}
