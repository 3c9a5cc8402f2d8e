//! Builds the chat messages for each kind of study task.

use serde::{Deserialize, Serialize};

use crate::preferences::{FlashcardPreferences, SummaryPreferences};
use crate::provider::ProviderDescriptor;

pub const SUMMARY_INSTRUCTIONS: &str = "You are a helpful study assistant that creates clear, concise summaries. Focus on the most important information.";

pub const FLASHCARD_INSTRUCTIONS: &str = r#"Create concise flashcards from the given text. Return an array of question-answer pairs in JSON format like this: {"flashcards": [{"question": "What is photosynthesis?", "answer": "Process by which plants convert sunlight into energy"}]}"#;

pub const TUTOR_INSTRUCTIONS: &str =
    "You are a helpful AI tutor. Provide clear, concise answers to student questions.";

const SUMMARY_USER_PREFIX: &str = "Please summarize the following text:\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The three things a user can ask the assistant to do.
#[derive(Debug, Clone, Copy)]
pub enum Task<'a> {
    Summarize {
        text: &'a str,
        preferences: &'a SummaryPreferences,
    },
    Flashcards {
        text: &'a str,
        preferences: &'a FlashcardPreferences,
    },
    Ask {
        question: &'a str,
    },
}

impl Task<'_> {
    /// Whether the provider should be put into JSON output mode.
    pub fn wants_json(&self) -> bool {
        matches!(self, Task::Flashcards { .. })
    }
}

/// Renders the system message followed by the user message for `task`.
pub fn build_messages(task: &Task<'_>) -> Vec<ChatMessage> {
    match task {
        Task::Summarize { text, preferences } => vec![
            ChatMessage::system(format!(
                "{SUMMARY_INSTRUCTIONS} {}",
                preferences.instruction()
            )),
            ChatMessage::user(format!("{SUMMARY_USER_PREFIX}{text}")),
        ],
        Task::Flashcards { text, preferences } => vec![
            ChatMessage::system(format!(
                "{FLASHCARD_INSTRUCTIONS}\n\n{}",
                preferences.instruction()
            )),
            ChatMessage::user(*text),
        ],
        Task::Ask { question } => vec![
            ChatMessage::system(TUTOR_INSTRUCTIONS),
            ChatMessage::user(*question),
        ],
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
        }
    }
}

/// Request body for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl CompletionRequest {
    pub fn for_task(provider: &ProviderDescriptor, task: &Task<'_>) -> Self {
        Self {
            model: provider.model.clone(),
            messages: build_messages(task),
            response_format: task.wants_json().then(ResponseFormat::json_object),
        }
    }
}
