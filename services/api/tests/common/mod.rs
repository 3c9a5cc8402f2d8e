//! In-memory stand-ins for both ports, plus request helpers for router tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use api_lib::config::Config;
use api_lib::web::{router, state::AppState};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use study_assistant_core::domain::{
    AuthSession, FlashcardRecord, QARecord, SummaryRecord, User, UserCredentials,
};
use study_assistant_core::normalize::ChatCompletion;
use study_assistant_core::ports::{
    CompletionError, CompletionService, DatabaseService, PortError, PortResult,
};
use study_assistant_core::prompt::CompletionRequest;
use study_assistant_core::provider::{ApiCredential, ProviderDescriptor};
use study_assistant_core::service::StudyService;
use tower::ServiceExt;
use uuid::Uuid;

//=========================================================================================
// In-memory Database
//=========================================================================================

#[derive(Default)]
pub struct InMemoryDb {
    pub users: Mutex<Vec<UserCredentials>>,
    pub sessions: Mutex<HashMap<String, AuthSession>>,
    pub summaries: Mutex<Vec<SummaryRecord>>,
    pub flashcards: Mutex<Vec<FlashcardRecord>>,
    pub qa: Mutex<Vec<QARecord>>,
    /// Card questions whose insert fails.
    pub reject_questions: Vec<String>,
}

impl InMemoryDb {
    /// Opens a session for a fresh user and returns `(user_id, token)`.
    pub fn signed_in_user(&self) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let token = Uuid::new_v4().to_string();
        self.sessions.lock().unwrap().insert(
            token.clone(),
            AuthSession {
                id: token.clone(),
                user_id,
                expires_at: Utc::now() + Duration::days(1),
            },
        );
        (user_id, token)
    }
}

fn newest_first<T, F, G>(items: &[T], owner: Uuid, user_of: F, created: G) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> Uuid,
    G: Fn(&T) -> DateTime<Utc>,
{
    let mut mine: Vec<T> = items.iter().filter(|i| user_of(i) == owner).cloned().collect();
    mine.sort_by_key(|i| std::cmp::Reverse(created(i)));
    mine
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user_with_email(&self, email: &str, hashed_password: &str) -> PortResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(PortError::Conflict("Email already registered".to_string()));
        }
        let user_id = Uuid::new_v4();
        users.push(UserCredentials {
            user_id,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        });
        Ok(User {
            user_id,
            email: Some(email.to_string()),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.sessions.lock().unwrap().insert(
            session_id.to_string(),
            AuthSession {
                id: session_id.to_string(),
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .filter(|s| s.expires_at > Utc::now())
            .map(|s| s.user_id)
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn insert_summary(
        &self,
        user_id: Uuid,
        original_text: &str,
        summary_text: &str,
        title: Option<&str>,
    ) -> PortResult<SummaryRecord> {
        let record = SummaryRecord {
            id: Uuid::new_v4(),
            user_id,
            title: title.map(str::to_string),
            original_text: original_text.to_string(),
            summary_text: summary_text.to_string(),
            created_at: Utc::now(),
        };
        self.summaries.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn insert_flashcard(
        &self,
        user_id: Uuid,
        original_text: &str,
        question: &str,
        answer: &str,
        title: Option<&str>,
    ) -> PortResult<FlashcardRecord> {
        if self.reject_questions.iter().any(|q| q == question) {
            return Err(PortError::Unexpected("constraint violation".to_string()));
        }
        let record = FlashcardRecord {
            id: Uuid::new_v4(),
            user_id,
            title: title.map(str::to_string),
            original_text: original_text.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            created_at: Utc::now(),
        };
        self.flashcards.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn insert_qa(&self, user_id: Uuid, question: &str, answer: &str) -> PortResult<QARecord> {
        let record = QARecord {
            id: Uuid::new_v4(),
            user_id,
            question: question.to_string(),
            answer: answer.to_string(),
            created_at: Utc::now(),
        };
        self.qa.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_summaries(&self, user_id: Uuid) -> PortResult<Vec<SummaryRecord>> {
        let items = self.summaries.lock().unwrap();
        Ok(newest_first(items.as_slice(), user_id, |s| s.user_id, |s| s.created_at))
    }

    async fn get_summary(&self, user_id: Uuid, summary_id: Uuid) -> PortResult<SummaryRecord> {
        self.summaries
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == summary_id && s.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Summary {} not found", summary_id)))
    }

    async fn list_flashcards(&self, user_id: Uuid) -> PortResult<Vec<FlashcardRecord>> {
        let items = self.flashcards.lock().unwrap();
        Ok(newest_first(items.as_slice(), user_id, |c| c.user_id, |c| c.created_at))
    }

    async fn list_qa(&self, user_id: Uuid) -> PortResult<Vec<QARecord>> {
        let items = self.qa.lock().unwrap();
        Ok(newest_first(items.as_slice(), user_id, |q| q.user_id, |q| q.created_at))
    }
}

//=========================================================================================
// Scripted Completion Provider
//=========================================================================================

/// Replays queued outcomes in order and records every request.
#[derive(Default)]
pub struct ScriptedCompletion {
    outcomes: Mutex<VecDeque<Result<ChatCompletion, CompletionError>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn replying(content: &str) -> Arc<Self> {
        Self::with(Ok(ChatCompletion::from_content(content)))
    }

    pub fn with(outcome: Result<ChatCompletion, CompletionError>) -> Arc<Self> {
        let scripted = Self::default();
        scripted.outcomes.lock().unwrap().push_back(outcome);
        Arc::new(scripted)
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn send(
        &self,
        _provider: &ProviderDescriptor,
        request: &CompletionRequest,
        _credential: &ApiCredential,
    ) -> Result<ChatCompletion, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Transport("no scripted reply".to_string())))
    }
}

//=========================================================================================
// App and Request Helpers
//=========================================================================================

pub const TEST_KEY: &str = "test-openai-key";

pub fn app(db: Arc<InMemoryDb>, completion: Arc<ScriptedCompletion>, api_key: Option<&str>) -> Router {
    let mut vars: HashMap<&str, String> = HashMap::new();
    vars.insert("DATABASE_URL", "postgres://unused/test".to_string());
    if let Some(key) = api_key {
        vars.insert("OPENAI_API_KEY", key.to_string());
    }
    let config = Config::from_vars(|key| vars.get(key).cloned()).unwrap();

    let study = StudyService::new(completion, config.ai_settings());
    router(Arc::new(AppState {
        db,
        config: Arc::new(config),
        study: Arc::new(study),
    }))
}

pub fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Sends one request and returns the status and JSON body (`Null` when empty).
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
