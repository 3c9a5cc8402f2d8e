//! crates/study_assistant_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{FlashcardRecord, QARecord, SummaryRecord, User, UserCredentials};
use crate::normalize::ChatCompletion;
use crate::prompt::CompletionRequest;
use crate::provider::{ApiCredential, ProviderDescriptor};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all persistence port operations.
/// This abstracts away the specific errors from the underlying store.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Failures reported by a completion provider adapter.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The provider rejected the credential (`invalid_api_key` or HTTP 401).
    #[error("provider rejected the credential (status {status})")]
    InvalidCredential { status: u16, details: Value },
    /// Any other non-2xx answer. `details` is the provider's error payload.
    #[error("provider returned status {status}")]
    Upstream { status: u16, details: Value },
    /// The provider could not be reached, including timeouts.
    #[error("could not reach provider: {0}")]
    Transport(String),
    /// A 2xx answer whose body is not a chat-completion document.
    #[error("provider returned a malformed body: {0}")]
    MalformedBody(String),
}

/// Everything that can go wrong while producing a summary, deck, or answer.
///
/// The `Display` text of each variant is the message shown to the caller.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("API key is not configured")]
    NotConfigured,

    #[error("Your API key appears to be invalid. Please update it in the service configuration.")]
    InvalidCredential { status: u16, details: Value },

    #[error("{message}")]
    ServiceFailure {
        message: &'static str,
        status: u16,
        details: Value,
    },

    #[error("Error connecting to AI service")]
    Transport(String),

    #[error("Unexpected response structure from AI service")]
    MalformedResponse(String),

    #[error("No answer was produced by the AI service")]
    NoContent,

    #[error("Failed to parse AI response")]
    Parse { content: String, reason: String },

    #[error("Unexpected response shape from AI service")]
    UnexpectedShape(String),
}

impl GenerationError {
    /// Diagnostic payload attached to the error response, if any.
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::InvalidCredential { details, .. } | Self::ServiceFailure { details, .. } => {
                Some(details.clone())
            }
            Self::Transport(cause) | Self::MalformedResponse(cause) => {
                Some(Value::String(cause.clone()))
            }
            Self::Parse { content, .. } => Some(Value::String(content.clone())),
            Self::UnexpectedShape(reason) => Some(Value::String(reason.clone())),
            Self::InvalidInput(_) | Self::NotConfigured | Self::NoContent => None,
        }
    }

    /// The provider's HTTP status, for errors relayed from upstream.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::InvalidCredential { status, .. } | Self::ServiceFailure { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth Methods ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the owner of an unexpired session, or `Unauthorized`.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Library ---
    async fn insert_summary(
        &self,
        user_id: Uuid,
        original_text: &str,
        summary_text: &str,
        title: Option<&str>,
    ) -> PortResult<SummaryRecord>;

    /// Inserts a single card. Decks are saved with one call per card.
    async fn insert_flashcard(
        &self,
        user_id: Uuid,
        original_text: &str,
        question: &str,
        answer: &str,
        title: Option<&str>,
    ) -> PortResult<FlashcardRecord>;

    async fn insert_qa(&self, user_id: Uuid, question: &str, answer: &str)
        -> PortResult<QARecord>;

    // Listings are ordered newest first.
    async fn list_summaries(&self, user_id: Uuid) -> PortResult<Vec<SummaryRecord>>;

    async fn get_summary(&self, user_id: Uuid, summary_id: Uuid) -> PortResult<SummaryRecord>;

    async fn list_flashcards(&self, user_id: Uuid) -> PortResult<Vec<FlashcardRecord>>;

    async fn list_qa(&self, user_id: Uuid) -> PortResult<Vec<QARecord>>;
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends one chat-completion request and returns the decoded provider payload.
    async fn send(
        &self,
        provider: &ProviderDescriptor,
        request: &CompletionRequest,
        credential: &ApiCredential,
    ) -> Result<ChatCompletion, CompletionError>;
}
