//! crates/study_assistant_core/src/service.rs
//!
//! The generation pipeline: validate input, pick the provider, render the prompt,
//! call the completion port once, then normalize the result.

use std::sync::Arc;

use crate::domain::Flashcard;
use crate::normalize::{first_message_content, message_content, parse_flashcards, ChatCompletion};
use crate::ports::{CompletionError, CompletionService, GenerationError};
use crate::preferences::{FlashcardPreferences, SummaryPreferences};
use crate::prompt::{CompletionRequest, Task};
use crate::provider::AiSettings;

/// Which pipeline an error came from; selects the caller-facing failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Summarize,
    GenerateFlashcards,
    AskQuestion,
}

impl Operation {
    fn empty_input_message(self) -> &'static str {
        match self {
            Self::Summarize => "No text provided for summarization",
            Self::GenerateFlashcards => "No text provided for flashcard generation",
            Self::AskQuestion => "No question provided",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Self::Summarize => "Failed to get summary from AI service",
            Self::GenerateFlashcards => "Failed to generate flashcards from AI service",
            Self::AskQuestion => "Failed to get answer from AI service",
        }
    }

    fn upstream_error(self, error: CompletionError) -> GenerationError {
        match error {
            CompletionError::InvalidCredential { status, details } => {
                GenerationError::InvalidCredential { status, details }
            }
            CompletionError::Upstream { status, details } => GenerationError::ServiceFailure {
                message: self.failure_message(),
                status,
                details,
            },
            CompletionError::Transport(cause) => GenerationError::Transport(cause),
            CompletionError::MalformedBody(cause) => GenerationError::MalformedResponse(cause),
        }
    }
}

/// Runs the three study operations against a single configured provider.
pub struct StudyService {
    completion: Arc<dyn CompletionService>,
    settings: AiSettings,
}

impl StudyService {
    pub fn new(completion: Arc<dyn CompletionService>, settings: AiSettings) -> Self {
        Self {
            completion,
            settings,
        }
    }

    pub async fn summarize(
        &self,
        text: &str,
        preferences: &SummaryPreferences,
    ) -> Result<String, GenerationError> {
        let operation = Operation::Summarize;
        require_text(operation, text)?;
        let completion = self
            .complete(operation, &Task::Summarize { text, preferences })
            .await?;
        first_message_content(&completion).map(str::to_string)
    }

    pub async fn generate_flashcards(
        &self,
        text: &str,
        preferences: &FlashcardPreferences,
    ) -> Result<Vec<Flashcard>, GenerationError> {
        let operation = Operation::GenerateFlashcards;
        require_text(operation, text)?;
        let completion = self
            .complete(operation, &Task::Flashcards { text, preferences })
            .await?;
        // Blank or missing content is unparseable, not absent.
        parse_flashcards(message_content(&completion).unwrap_or(""))
    }

    pub async fn answer_question(&self, question: &str) -> Result<String, GenerationError> {
        let operation = Operation::AskQuestion;
        require_text(operation, question)?;
        let completion = self.complete(operation, &Task::Ask { question }).await?;
        first_message_content(&completion).map(str::to_string)
    }

    async fn complete(
        &self,
        operation: Operation,
        task: &Task<'_>,
    ) -> Result<ChatCompletion, GenerationError> {
        let (provider, credential) = self.settings.resolve()?;
        let request = CompletionRequest::for_task(&provider, task);
        self.completion
            .send(&provider, &request, credential)
            .await
            .map_err(|e| operation.upstream_error(e))
    }
}

fn require_text(operation: Operation, text: &str) -> Result<(), GenerationError> {
    if text.trim().is_empty() {
        return Err(GenerationError::InvalidInput(operation.empty_input_message()));
    }
    Ok(())
}
