//! OpenAI-compatible provider implementation.
//!
//! Works with OpenAI and any endpoint exposing `/v1/embeddings` and
//! `/v1/chat/completions` with the same wire format (OpenRouter, Ollama,
//! vLLM, ...).
//!
//! One provider serves both collaborator roles: it implements [`Embedder`]
//! and [`Completer`]. The credential arrives with every call.

use async_trait::async_trait;
use ait_config::ProviderConfig;
use ait_core::error::ProviderError;
use ait_core::message::Turn;
use ait_core::provider::{Completer, Embedder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Sent ahead of every conversation unless overridden.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are Ait, a helpful AI assistant. \
You have extensive knowledge of many facts documented on the world wide web. \
However, you are not able to perfectly recall those facts. \
When you are unsure about a detail, do not attempt to provide an answer. \
You instead state that you do not know the answer.\
";

/// An OpenAI-compatible embedding and chat-completion provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    chat_model: String,
    embedding_model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a provider for `base_url` with default models and limits.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {e}")))?;

        let defaults = ProviderConfig::default();
        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chat_model: defaults.chat_model,
            embedding_model: defaults.embedding_model,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            client,
        })
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai() -> Result<Self, ProviderError> {
        let defaults = ProviderConfig::default();
        Self::new("openai", defaults.api_url, Duration::from_secs(defaults.timeout_secs))
    }

    /// Build a provider from the `[provider]` config section.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut provider = Self::new(
            config.name.clone(),
            config.api_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        provider.chat_model = config.chat_model.clone();
        provider.embedding_model = config.embedding_model.clone();
        provider.temperature = config.temperature;
        provider.max_tokens = config.max_tokens;
        if let Some(prompt) = &config.system_prompt {
            provider.system_prompt = prompt.clone();
        }
        Ok(provider)
    }

    /// Convert the turn history to OpenAI chat messages.
    ///
    /// The system message comes first, then each turn as a user message
    /// followed by its assistant reply. The pending final turn has no reply.
    fn to_api_messages(system_prompt: &str, turns: &[Turn]) -> Vec<ApiMessage> {
        let mut messages = Vec::with_capacity(turns.len() * 2 + 1);
        messages.push(ApiMessage {
            role: "system".into(),
            content: system_prompt.to_string(),
        });
        for turn in turns {
            messages.push(ApiMessage {
                role: "user".into(),
                content: turn.query.clone(),
            });
            if !turn.is_pending() {
                messages.push(ApiMessage {
                    role: "assistant".into(),
                    content: turn.response.clone(),
                });
            }
        }
        messages
    }

    async fn post(
        &self,
        path: &str,
        credential: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(credential)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(provider = %self.name, status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Embedder for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn embed(&self, credential: &str, text: &str) -> Result<Vec<f32>, ProviderError> {
        let body = serde_json::json!({
            "model": self.embedding_model,
            "input": text,
            "encoding_format": "float",
        });

        debug!(
            provider = %self.name,
            model = %self.embedding_model,
            chars = text.len(),
            "Sending embedding request"
        );

        let response = self.post("embeddings", credential, &body).await?;
        let api_resp: EmbeddingApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse embedding response: {e}"),
            })?;

        api_resp.first_embedding()
    }
}

#[async_trait]
impl Completer for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, credential: &str, turns: &[Turn]) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "model": self.chat_model,
            "messages": Self::to_api_messages(&self.system_prompt, turns),
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": false,
        });

        debug!(
            provider = %self.name,
            model = %self.chat_model,
            turns = turns.len(),
            "Sending completion request"
        );

        let response = self.post("chat/completions", credential, &body).await?;
        let api_resp: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        api_resp.first_content()
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

impl ApiResponse {
    fn first_content(self) -> Result<String, ProviderError> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })
    }
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
}

impl EmbeddingApiResponse {
    fn first_embedding(self) -> Result<Vec<f32>, ProviderError> {
        self.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 200,
                message: "No embedding in response".into(),
            })
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_constructor() {
        let provider = OpenAiCompatProvider::openai().unwrap();
        assert_eq!(Embedder::name(&provider), "openai");
        assert!(provider.base_url.contains("api.openai.com"));
        assert_eq!(provider.embedding_model, "text-embedding-ada-002");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let provider =
            OpenAiCompatProvider::new("local", "http://localhost:11434/v1/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(provider.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn from_config_applies_overrides() {
        let config = ProviderConfig {
            chat_model: "gpt-4o-mini".into(),
            temperature: 0.3,
            system_prompt: Some("Be brief.".into()),
            ..ProviderConfig::default()
        };
        let provider = OpenAiCompatProvider::from_config(&config).unwrap();
        assert_eq!(provider.chat_model, "gpt-4o-mini");
        assert!((provider.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(provider.system_prompt, "Be brief.");
    }

    #[test]
    fn turns_become_user_assistant_pairs_after_system() {
        let turns = vec![
            Turn::new("Is a pear buoyant?", "No."),
            Turn::pending("Does a pear sink in water?"),
        ];
        let messages = OpenAiCompatProvider::to_api_messages("sys", &turns);

        let roles: Vec<_> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(messages[0].content, "sys");
        assert_eq!(messages[1].content, "Is a pear buoyant?");
        assert_eq!(messages[2].content, "No.");
        assert_eq!(messages[3].content, "Does a pear sink in water?");
    }

    #[test]
    fn parse_chat_response() {
        let data = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "gpt-3.5-turbo",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "  It floats.  "}, "finish_reason": "stop"}]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.first_content().unwrap(), "  It floats.  ");
    }

    #[test]
    fn empty_choices_is_api_error() {
        let parsed: ApiResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            parsed.first_content(),
            Err(ProviderError::ApiError { status_code: 200, .. })
        ));
    }

    #[test]
    fn parse_embedding_response() {
        let data = r#"{
            "object": "list",
            "data": [{"object": "embedding", "embedding": [0.1, 0.2, 0.3], "index": 0}],
            "model": "text-embedding-ada-002",
            "usage": {"prompt_tokens": 8, "total_tokens": 8}
        }"#;
        let parsed: EmbeddingApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.first_embedding().unwrap(), vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        // Port 9 (discard) on localhost: connection refused
        let provider =
            OpenAiCompatProvider::new("dead", "http://127.0.0.1:9/v1", Duration::from_secs(2))
                .unwrap();
        let err = provider.embed("sk-test", "hello").await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }
}
