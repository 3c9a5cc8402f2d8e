//! Turns provider payloads into validated results.
//!
//! The flashcard path allows exactly one fallback: if the parsed JSON has no
//! `flashcards` wrapper, the value itself must be the array of cards.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::Flashcard;
use crate::ports::GenerationError;

/// Decoded body of a successful `/chat/completions` call.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: Option<CompletionMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletion {
    /// Builds a single-choice completion. Handy for adapters and fakes.
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            choices: vec![CompletionChoice {
                message: Some(CompletionMessage {
                    content: Some(content.into()),
                }),
            }],
            model: None,
        }
    }
}

/// The first choice's message content, as sent.
pub fn message_content(completion: &ChatCompletion) -> Option<&str> {
    completion
        .choices
        .first()
        .and_then(|choice| choice.message.as_ref())
        .and_then(|message| message.content.as_deref())
}

/// Returns the first choice's message content, rejecting missing or blank text.
pub fn first_message_content(completion: &ChatCompletion) -> Result<&str, GenerationError> {
    message_content(completion)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GenerationError::NoContent)
}

/// Parses the assistant content of a flashcard request into an ordered deck.
pub fn parse_flashcards(content: &str) -> Result<Vec<Flashcard>, GenerationError> {
    let parsed: Value = serde_json::from_str(content).map_err(|e| GenerationError::Parse {
        content: content.to_string(),
        reason: e.to_string(),
    })?;

    let candidate = match parsed {
        Value::Object(mut object) => match object.remove("flashcards") {
            Some(cards) => cards,
            None => Value::Object(object),
        },
        other => other,
    };

    let items = match candidate {
        Value::Array(items) => items,
        other => {
            return Err(GenerationError::UnexpectedShape(format!(
                "expected an array of flashcards, found {}",
                kind_of(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| decode_card(index, item))
        .collect()
}

fn decode_card(index: usize, item: Value) -> Result<Flashcard, GenerationError> {
    let card: Flashcard = serde_json::from_value(item).map_err(|e| {
        GenerationError::UnexpectedShape(format!("flashcard {index} is invalid: {e}"))
    })?;
    if card.question.trim().is_empty() || card.answer.trim().is_empty() {
        return Err(GenerationError::UnexpectedShape(format!(
            "flashcard {index} has an empty question or answer"
        )));
    }
    Ok(card)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
