//! services/api/src/adapters/completion.rs
//!
//! This module contains the adapter for OpenAI-compatible chat-completion
//! endpoints (OpenAI and DeepSeek). It implements the `CompletionService` port
//! from the `core` crate over plain HTTPS.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use study_assistant_core::normalize::ChatCompletion;
use study_assistant_core::ports::{CompletionError, CompletionService};
use study_assistant_core::prompt::CompletionRequest;
use study_assistant_core::provider::{ApiCredential, ProviderDescriptor};
use tracing::{info, warn};

const INVALID_KEY_CODE: &str = "invalid_api_key";
const REDACTED: &str = "[REDACTED]";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` with a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpCompletionAdapter {
    client: reqwest::Client,
}

impl HttpCompletionAdapter {
    /// Creates a new adapter whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for HttpCompletionAdapter {
    async fn send(
        &self,
        provider: &ProviderDescriptor,
        request: &CompletionRequest,
        credential: &ApiCredential,
    ) -> Result<ChatCompletion, CompletionError> {
        info!(
            provider = provider.kind.as_str(),
            model = %provider.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&provider.endpoint)
            .bearer_auth(credential.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        if !status.is_success() {
            let status = status.as_u16();
            let details = error_details(&body, credential.expose());
            warn!(
                provider = provider.kind.as_str(),
                status, "Provider answered with an error status"
            );
            return Err(if is_invalid_credential(status, &details) {
                CompletionError::InvalidCredential { status, details }
            } else {
                CompletionError::Upstream { status, details }
            });
        }

        let completion: ChatCompletion = serde_json::from_slice(&body)
            .map_err(|e| CompletionError::MalformedBody(e.to_string()))?;
        info!(
            provider = provider.kind.as_str(),
            choices = completion.choices.len(),
            "Completion received"
        );
        Ok(completion)
    }
}

//=========================================================================================
// Error Body Helpers
//=========================================================================================

/// The provider's `error` object when present, else the whole body. Non-JSON
/// bodies are kept as a string. The credential is scrubbed either way.
fn error_details(body: &[u8], secret: &str) -> Value {
    let parsed = serde_json::from_slice::<Value>(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()));
    let mut details = match parsed {
        Value::Object(mut object) => match object.remove("error") {
            Some(error) if !error.is_null() => error,
            _ => Value::Object(object),
        },
        other => other,
    };
    redact(&mut details, secret);
    details
}

fn is_invalid_credential(status: u16, details: &Value) -> bool {
    status == 401 || details.get("code").and_then(Value::as_str) == Some(INVALID_KEY_CODE)
}

fn redact(value: &mut Value, secret: &str) {
    if secret.is_empty() {
        return;
    }
    match value {
        Value::String(text) if text.contains(secret) => {
            *text = text.replace(secret, REDACTED);
        }
        Value::Array(items) => items.iter_mut().for_each(|item| redact(item, secret)),
        Value::Object(object) => object.values_mut().for_each(|item| redact(item, secret)),
        _ => {}
    }
}
