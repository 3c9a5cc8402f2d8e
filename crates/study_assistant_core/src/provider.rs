//! Chat-completion provider selection.
//!
//! The provider is chosen explicitly when configured. Otherwise the credential
//! prefix decides: `sk-` keys go to DeepSeek, anything else goes to OpenAI.

use std::fmt;
use std::str::FromStr;

use crate::ports::GenerationError;

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEEPSEEK_MODEL: &str = "deepseek-chat";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_MODEL: &str = "gpt-4o-mini";

const DEEPSEEK_KEY_PREFIX: &str = "sk-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    DeepSeek,
    OpenAi,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown provider '{0}', expected 'deepseek' or 'openai'")]
pub struct UnknownProvider(pub String);

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek",
            Self::OpenAi => "openai",
        }
    }

    /// Infers the provider from the shape of the credential.
    pub fn sniff(credential: &str) -> Self {
        if credential.starts_with(DEEPSEEK_KEY_PREFIX) {
            Self::DeepSeek
        } else {
            Self::OpenAi
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Self::DeepSeek => DEEPSEEK_BASE_URL,
            Self::OpenAi => OPENAI_BASE_URL,
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Self::DeepSeek => DEEPSEEK_MODEL,
            Self::OpenAi => OPENAI_MODEL,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Ok(Self::DeepSeek),
            "openai" => Ok(Self::OpenAi),
            _ => Err(UnknownProvider(value.to_string())),
        }
    }
}

/// Where and with which model a completion request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub kind: ProviderKind,
    pub endpoint: String,
    pub model: String,
}

/// Secret used to authenticate against the provider. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Trims surrounding whitespace before the prefix is sniffed. Returns `None`
    /// for blank values so an empty variable counts as unset.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();
        (!value.is_empty()).then_some(Self(value))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(***)")
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Per-provider overrides for the endpoint base URL and model.
#[derive(Debug, Clone, Default)]
pub struct ProviderOverride {
    pub base_url: Option<String>,
    pub model: Option<String>,
}

/// Provider settings assembled once from configuration and handed to the service.
#[derive(Debug, Clone, Default)]
pub struct AiSettings {
    pub credential: Option<ApiCredential>,
    pub provider: Option<ProviderKind>,
    pub deepseek: ProviderOverride,
    pub openai: ProviderOverride,
}

impl AiSettings {
    /// Picks the provider for the next request. Fails before any network call when
    /// no credential is configured.
    pub fn resolve(&self) -> Result<(ProviderDescriptor, &ApiCredential), GenerationError> {
        let credential = self
            .credential
            .as_ref()
            .ok_or(GenerationError::NotConfigured)?;
        let kind = self
            .provider
            .unwrap_or_else(|| ProviderKind::sniff(credential.expose()));

        let overrides = match kind {
            ProviderKind::DeepSeek => &self.deepseek,
            ProviderKind::OpenAi => &self.openai,
        };
        let base_url = overrides
            .base_url
            .as_deref()
            .unwrap_or(kind.default_base_url());
        let model = overrides
            .model
            .clone()
            .unwrap_or_else(|| kind.default_model().to_string());

        let descriptor = ProviderDescriptor {
            kind,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model,
        };
        Ok((descriptor, credential))
    }
}
