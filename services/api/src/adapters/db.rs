//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use study_assistant_core::domain::{
    AuthSession, FlashcardRecord, QARecord, SummaryRecord, User, UserCredentials,
};
use study_assistant_core::ports::{DatabaseService, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRow {
    user_id: Uuid,
    email: Option<String>,
}
impl UserRow {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRow {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRow {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRow {
    id: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}
impl AuthSessionRow {
    fn to_domain(self) -> AuthSession {
        AuthSession {
            id: self.id,
            user_id: self.user_id,
            expires_at: self.expires_at,
        }
    }
}

#[derive(FromRow)]
struct SummaryRow {
    id: Uuid,
    user_id: Uuid,
    title: Option<String>,
    original_text: String,
    summary_text: String,
    created_at: DateTime<Utc>,
}
impl SummaryRow {
    fn to_domain(self) -> SummaryRecord {
        SummaryRecord {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            original_text: self.original_text,
            summary_text: self.summary_text,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct FlashcardRow {
    id: Uuid,
    user_id: Uuid,
    title: Option<String>,
    original_text: String,
    question: String,
    answer: String,
    created_at: DateTime<Utc>,
}
impl FlashcardRow {
    fn to_domain(self) -> FlashcardRecord {
        FlashcardRecord {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            original_text: self.original_text,
            question: self.question,
            answer: self.answer,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct QARow {
    id: Uuid,
    user_id: Uuid,
    question: String,
    answer: String,
    created_at: DateTime<Utc>,
}
impl QARow {
    fn to_domain(self) -> QARecord {
        QARecord {
            id: self.id,
            user_id: self.user_id,
            question: self.question,
            answer: self.answer,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                PortError::Conflict("Email already registered".to_string())
            }
            _ => unexpected(e),
        })?;
        Ok(row.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))?;
        Ok(row.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let session = sqlx::query_as::<_, AuthSessionRow>(
            "SELECT id, user_id, expires_at FROM auth_sessions \
             WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)?
        .to_domain();
        Ok(session.user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn insert_summary(
        &self,
        user_id: Uuid,
        original_text: &str,
        summary_text: &str,
        title: Option<&str>,
    ) -> PortResult<SummaryRecord> {
        let row = sqlx::query_as::<_, SummaryRow>(
            "INSERT INTO summaries (id, user_id, title, original_text, summary_text) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, user_id, title, original_text, summary_text, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(original_text)
        .bind(summary_text)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(row.to_domain())
    }

    async fn insert_flashcard(
        &self,
        user_id: Uuid,
        original_text: &str,
        question: &str,
        answer: &str,
        title: Option<&str>,
    ) -> PortResult<FlashcardRecord> {
        let row = sqlx::query_as::<_, FlashcardRow>(
            "INSERT INTO flashcards (id, user_id, title, original_text, question, answer) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, user_id, title, original_text, question, answer, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(original_text)
        .bind(question)
        .bind(answer)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(row.to_domain())
    }

    async fn insert_qa(&self, user_id: Uuid, question: &str, answer: &str) -> PortResult<QARecord> {
        let row = sqlx::query_as::<_, QARow>(
            "INSERT INTO qa_history (id, user_id, question, answer) VALUES ($1, $2, $3, $4) \
             RETURNING id, user_id, question, answer, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(question)
        .bind(answer)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(row.to_domain())
    }

    async fn list_summaries(&self, user_id: Uuid) -> PortResult<Vec<SummaryRecord>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT id, user_id, title, original_text, summary_text, created_at FROM summaries \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let summaries = rows.into_iter().map(|r| r.to_domain()).collect();
        Ok(summaries)
    }

    async fn get_summary(&self, user_id: Uuid, summary_id: Uuid) -> PortResult<SummaryRecord> {
        // Scoped by owner: another user's summary reads as missing.
        let row = sqlx::query_as::<_, SummaryRow>(
            "SELECT id, user_id, title, original_text, summary_text, created_at FROM summaries \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(summary_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Summary {} not found", summary_id)))?;
        Ok(row.to_domain())
    }

    async fn list_flashcards(&self, user_id: Uuid) -> PortResult<Vec<FlashcardRecord>> {
        let rows = sqlx::query_as::<_, FlashcardRow>(
            "SELECT id, user_id, title, original_text, question, answer, created_at \
             FROM flashcards WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let cards = rows.into_iter().map(|r| r.to_domain()).collect();
        Ok(cards)
    }

    async fn list_qa(&self, user_id: Uuid) -> PortResult<Vec<QARecord>> {
        let rows = sqlx::query_as::<_, QARow>(
            "SELECT id, user_id, question, answer, created_at FROM qa_history \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let history = rows.into_iter().map(|r| r.to_domain()).collect();
        Ok(history)
    }
}
