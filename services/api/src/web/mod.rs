pub mod auth;
pub mod extract;
pub mod functions;
pub mod library;
pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::require_auth;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::state::AppState;

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Builds the complete application router: API routes, docs, and middleware.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Browser clients may call from any origin; auth travels as a bearer token.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(rest::health_handler))
        .route("/functions/summarize", post(functions::summarize_handler))
        .route(
            "/functions/generate-flashcards",
            post(functions::generate_flashcards_handler),
        )
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/functions/ask-question", post(functions::ask_question_handler))
        .route(
            "/library/summaries",
            post(library::save_summary_handler).get(library::list_summaries_handler),
        )
        .route("/library/summaries/{id}", get(library::get_summary_handler))
        .route(
            "/library/flashcards",
            post(library::save_deck_handler).get(library::list_flashcards_handler),
        )
        .route("/library/qa", get(library::list_qa_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(rest::fallback_handler)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", rest::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
