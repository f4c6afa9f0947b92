//! Chat-completion client for the financial assistant endpoint.
//!
//! One prompt in, one answer out. No retries, streaming or conversation state.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::AiConfig;

#[derive(Debug, Error)]
pub enum AiError {
    /// No API key configured for the provider.
    #[error("Missing API key for the completion provider")]
    MissingApiKey,

    /// Transport or decode failure.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the provider.
    #[error("Provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

/// Sends a single user prompt and returns the model's answer text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// An empty string means the provider returned no content.
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatResponse {
    fn into_answer(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiClient {
    http: HttpClient,
    config: AiConfig,
}

impl OpenAiClient {
    pub fn new(config: AiConfig) -> Self {
        Self {
            http: HttpClient::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self.config.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!("Requesting completion from model {}", self.config.model);
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        Ok(parsed.into_answer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_choice_content() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Save 20% of income."}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_answer(), "Save 20% of income.");
    }

    #[test]
    fn missing_content_is_empty_answer() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(parsed.into_answer(), "");

        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#).unwrap();
        assert_eq!(parsed.into_answer(), "");
    }

    #[test]
    fn request_carries_system_prompt_and_settings() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "be helpful",
                },
                ChatMessage {
                    role: "user",
                    content: "How do I budget?",
                },
            ],
            temperature: 0.7,
            max_tokens: 800,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "How do I budget?");
        assert_eq!(json["max_tokens"], 800);
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let mut config = crate::config::AppConfig::development().ai;
        config.api_key = None;
        let client = OpenAiClient::new(config);
        assert!(matches!(client.complete("hi").await, Err(AiError::MissingApiKey)));
    }
}
