//! Chat-completion provider seam and the OpenAI-compatible implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use omnes_core::config::ProviderConfig;
use omnes_core::OmnesError;

/// Role of a message in the provider's conversation format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    System,
    User,
    Assistant,
}

/// One message sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMessage {
    pub role: ProviderRole,
    pub content: String,
}

impl ProviderMessage {
    pub fn new(role: ProviderRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A fully composed chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ProviderMessage>,
    pub temperature: f32,
}

/// Errors from a provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The request could not be sent or the connection failed.
    #[error("transport error: {0}")]
    Transport(String),
    /// The provider answered successfully but the body was not usable.
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<ProviderError> for OmnesError {
    fn from(err: ProviderError) -> Self {
        OmnesError::Provider(err.to_string())
    }
}

/// An external chat-completion service.
///
/// The credential is passed per call so the relay can refuse to call the
/// provider at all when it is not configured.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run one completion and return the text of the first choice.
    async fn complete(
        &self,
        credential: &str,
        request: &CompletionRequest,
    ) -> Result<String, ProviderError>;
}

// =============================================================================
// OpenAI-compatible provider
// =============================================================================

/// Provider speaking the OpenAI `/chat/completions` protocol.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider for the given base URL (e.g. `https://api.openai.com/v1`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a provider from the `[provider]` configuration section.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs.max(1)),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn complete(
        &self,
        credential: &str,
        request: &CompletionRequest,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(credential)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let first = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode("response contained no choices".to_string()))?;

        first
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| ProviderError::Decode("first choice has no message content".to_string()))
    }
}
