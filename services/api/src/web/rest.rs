//! services/api/src/web/rest.rs
//!
//! Contains the small service endpoints and the master definition for the
//! OpenAPI specification.

use axum::{http::Uri, Json};
use serde::Serialize;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi, ToSchema,
};

use crate::error::{ApiError, ErrorBody};
use crate::web::{auth, functions, library};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        functions::summarize_handler,
        functions::generate_flashcards_handler,
        functions::ask_question_handler,
        library::save_summary_handler,
        library::list_summaries_handler,
        library::get_summary_handler,
        library::save_deck_handler,
        library::list_flashcards_handler,
        library::list_qa_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBody,
            functions::SummarizeRequest,
            functions::SummarizeResponse,
            functions::FlashcardsRequest,
            functions::CardBody,
            functions::AskRequest,
            functions::AskResponse,
            library::SaveSummaryRequest,
            library::SummaryResponse,
            library::SaveDeckRequest,
            library::SaveDeckResponse,
            library::FlashcardResponse,
            library::QAResponse,
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
        )
    ),
    modifiers(&SessionAuth),
    tags(
        (name = "functions", description = "Summaries, flashcards, and tutoring answers."),
        (name = "library", description = "A user's saved study material."),
        (name = "auth", description = "Accounts and sessions.")
    )
)]
pub struct ApiDoc;

/// Registers the session token as a bearer scheme.
struct SessionAuth;

impl Modify for SessionAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Unknown routes get the same error body as everything else.
pub async fn fallback_handler(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
