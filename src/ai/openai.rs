//! OpenAI API Provider
//!
//! LLM provider using OpenAI's Chat Completions API (or any compatible
//! endpoint via `api_base`). Returns [`LlmResponse`] with token usage.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{LlmProvider, LlmResponse, ProviderConfig, TokenUsage, extract_json_from_response};
use crate::types::{BidError, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI API Provider with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                BidError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BidError::LlmApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model: config.model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, system: &str, user: &str, schema: &Value) -> ChatCompletionRequest {
        let system_content = if schema.is_null() {
            format!("{system}\n\nResponda sempre com JSON válido.")
        } else {
            let schema_str = match serde_json::to_string_pretty(schema) {
                Ok(s) => s,
                Err(e) => {
                    warn!("Failed to pretty-print schema, using compact format: {}", e);
                    serde_json::to_string(schema).unwrap_or_else(|_| "{}".to_string())
                }
            };
            format!(
                "{system}\n\nResponda APENAS com JSON válido seguindo este schema:\n\n```json\n{schema_str}\n```"
            )
        };

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_content,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, system: &str, user: &str, schema: &Value) -> Result<LlmResponse> {
        info!(
            model = %self.model,
            temperature = self.temperature,
            "generating with OpenAI"
        );

        let request = self.build_request(system, user, schema);
        let url = format!("{}/chat/completions", self.api_base);

        debug!("Sending request to OpenAI API");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| BidError::LlmApi(format!("OpenAI request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BidError::LlmApi(format!(
                "OpenAI API error ({status}): {body}"
            )));
        }

        let response_body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| BidError::LlmApi(format!("Failed to parse OpenAI response: {e}")))?;

        let usage = response_body
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        let content_str = response_body
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| BidError::LlmApi("No content in OpenAI response".to_string()))?;

        debug!("Received response from OpenAI, parsing JSON");
        let content = extract_json_from_response(content_str)?;

        Ok(LlmResponse { content, usage })
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_schema_in_system() {
        let provider = OpenAiProvider::new(ProviderConfig {
            api_key: Some("sk-test".to_string()),
            ..ProviderConfig::default()
        })
        .unwrap();
        let schema = serde_json::json!({"type": "object", "required": ["is_relevant"]});
        let request = provider.build_request("Você é um analista.", "Target: RPA", &schema);
        assert_eq!(request.messages.len(), 2);
        assert!(request.messages[0].content.contains("is_relevant"));
        assert_eq!(request.messages[1].content, "Target: RPA");
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = OpenAiProvider::new(ProviderConfig {
            api_key: Some("sk-super-secret".to_string()),
            ..ProviderConfig::default()
        })
        .unwrap();
        assert!(!format!("{provider:?}").contains("sk-super-secret"));
    }
}
