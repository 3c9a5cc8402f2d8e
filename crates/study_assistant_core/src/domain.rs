//! crates/study_assistant_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or web framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: Option<String>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a login session (cookie or bearer token)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// A single generated study card.
///
/// Decoding is strict: both fields must be present and be strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A summary saved to a user's library.
#[derive(Debug, Clone)]
pub struct SummaryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub original_text: String,
    pub summary_text: String,
    pub created_at: DateTime<Utc>,
}

/// One saved card of a deck. `title` is the deck name shared by all cards saved together.
#[derive(Debug, Clone)]
pub struct FlashcardRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub original_text: String,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

/// Represents a single question-and-answer exchange in a user's history.
#[derive(Debug, Clone)]
pub struct QARecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}
