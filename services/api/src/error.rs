//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how it is
//! rendered to clients. Every failure leaves as `{error, details?}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use study_assistant_core::ports::{GenerationError, PortError};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the persistence port.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A summary, deck, or answer could not be produced.
    #[error("Generation Error: {0}")]
    Generation(#[from] GenerationError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidLogin,

    #[error("{0}")]
    NotFound(String),

    /// Some cards of a deck were not stored. The stored ones stay stored.
    #[error("Failed to save flashcards")]
    DeckSave {
        saved: usize,
        failed: Vec<(usize, PortError)>,
    },

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidLogin => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Port(PortError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Port(PortError::Unauthorized) => StatusCode::UNAUTHORIZED,
            Self::Generation(GenerationError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Self::Generation(err) => err
                .upstream_status()
                .and_then(|status| StatusCode::from_u16(status).ok())
                .filter(|status| status.is_client_error() || status.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            Self::Generation(err) => (err.to_string(), err.details()),
            Self::Port(PortError::NotFound(what)) => (what.clone(), None),
            Self::Port(PortError::Conflict(what)) => (what.clone(), None),
            Self::Port(PortError::Unauthorized) | Self::Unauthorized => {
                ("Unauthorized".to_string(), None)
            }
            Self::InvalidLogin => (self.to_string(), None),
            Self::BadRequest(message) | Self::NotFound(message) => (message.clone(), None),
            Self::DeckSave { saved, failed } => {
                let failed: Vec<Value> = failed
                    .iter()
                    .map(|(index, error)| json!({ "index": index, "error": port_message(error) }))
                    .collect();
                (
                    self.to_string(),
                    Some(json!({ "saved": saved, "failed": failed })),
                )
            }
            // Internal causes stay in the logs.
            Self::Port(PortError::Unexpected(_))
            | Self::Config(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Internal(_) => (INTERNAL_MESSAGE.to_string(), None),
        };
        ErrorBody { error, details }
    }
}

/// Client-facing text for a port failure. Unexpected causes stay in the logs.
fn port_message(error: &PortError) -> String {
    match error {
        PortError::NotFound(what) | PortError::Conflict(what) => what.clone(),
        PortError::Unauthorized => "Unauthorized".to_string(),
        PortError::Unexpected(_) => INTERNAL_MESSAGE.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "Request failed: {:?}", self);
        } else {
            warn!(status = status.as_u16(), "Request rejected: {}", self);
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
