//! services/api/src/web/functions.rs
//!
//! The three generation endpoints. Each request makes at most one call to the
//! configured completion provider.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_assistant_core::domain::Flashcard;
use study_assistant_core::preferences::{FlashcardPreferences, SummaryPreferences};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::web::extract::ApiJson;
use crate::web::state::AppState;

//=========================================================================================
// API Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// `{style, tone, length}`; every field is optional.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub preferences: Option<SummaryPreferences>,
}

#[derive(Serialize, ToSchema)]
pub struct SummarizeResponse {
    pub summary: String,
}

#[derive(Deserialize, ToSchema)]
pub struct FlashcardsRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// `{count, format, difficulty}`; `count` is 5 to 25 in steps of 5.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub preferences: Option<FlashcardPreferences>,
}

/// One question/answer card.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CardBody {
    pub question: String,
    pub answer: String,
}

impl From<Flashcard> for CardBody {
    fn from(card: Flashcard) -> Self {
        Self {
            question: card.question,
            answer: card.answer,
        }
    }
}

impl From<CardBody> for Flashcard {
    fn from(card: CardBody) -> Self {
        Flashcard::new(card.question, card.answer)
    }
}

#[derive(Deserialize, ToSchema)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AskResponse {
    pub answer: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Summarize a block of study material.
#[utoipa::path(
    post,
    path = "/functions/summarize",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "Summary produced", body = SummarizeResponse),
        (status = 400, description = "No text provided", body = ErrorBody),
        (status = 500, description = "Provider or configuration failure", body = ErrorBody)
    ),
    tag = "functions"
)]
pub async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    // Absent and null fields fall through to the empty-input check.
    let text = req.text.unwrap_or_default();
    let preferences = req.preferences.unwrap_or_default();
    info!(chars = text.len(), "Summarize request");
    let summary = state.study.summarize(&text, &preferences).await?;
    Ok(Json(SummarizeResponse { summary }))
}

/// Generate a flashcard deck from study material.
#[utoipa::path(
    post,
    path = "/functions/generate-flashcards",
    request_body = FlashcardsRequest,
    responses(
        (status = 200, description = "Generated cards, in order", body = [CardBody]),
        (status = 400, description = "No text provided", body = ErrorBody),
        (status = 500, description = "Provider failure or unusable deck", body = ErrorBody)
    ),
    tag = "functions"
)]
pub async fn generate_flashcards_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<FlashcardsRequest>,
) -> Result<Json<Vec<CardBody>>, ApiError> {
    let text = req.text.unwrap_or_default();
    let preferences = req.preferences.unwrap_or_default();
    info!(
        chars = text.len(),
        count = preferences.count.get(),
        "Flashcard request"
    );
    let cards = state.study.generate_flashcards(&text, &preferences).await?;
    info!(cards = cards.len(), "Flashcards generated");
    Ok(Json(cards.into_iter().map(CardBody::from).collect()))
}

/// Answer a question as a tutor and record the exchange in the caller's history.
#[utoipa::path(
    post,
    path = "/functions/ask-question",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer produced and saved", body = AskResponse),
        (status = 400, description = "No question provided", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 500, description = "Provider or storage failure", body = ErrorBody)
    ),
    security(("session" = [])),
    tag = "functions"
)]
pub async fn ask_question_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    ApiJson(req): ApiJson<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = req.question.unwrap_or_default();
    info!(%user_id, chars = question.len(), "Question received");
    let answer = state.study.answer_question(&question).await?;

    let record = state.db.insert_qa(user_id, &question, &answer).await?;
    info!(qa_id = %record.id, "Answer saved to history");

    Ok(Json(AskResponse { answer }))
}
