//! Client for the external text-completion service.
//!
//! - `CompletionClient` is the seam the estimator talks to.
//! - `AnthropicClient` implements it against the Messages API: one call, no retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{AiError, Secret};

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const USER_AGENT: &str = concat!("estimo/", env!("CARGO_PKG_VERSION"));

/// Model service settings. A missing or blank key disables the AI path.
#[derive(Debug, Clone, Deserialize)]
pub struct AiSettings {
    #[serde(default)]
    pub api_key: Option<Secret>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_model() -> String { DEFAULT_MODEL.to_string() }
fn default_max_tokens() -> u32 { DEFAULT_MAX_TOKENS }
fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            base_url: default_base_url(),
        }
    }
}

impl AiSettings {
    pub fn credential(&self) -> Option<&Secret> {
        self.api_key.as_ref().filter(|key| !key.is_blank())
    }
}

/// One single-turn prompt to the model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    pub prompt: String,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the prompt and return the model's text reply
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError>;
}

#[derive(Clone)]
pub struct AnthropicClient {
    http: Client,
    endpoint: String,
    api_key: Secret,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl AnthropicClient {
    pub fn new(base_url: &str, api_key: Secret) -> Result<Self, AiError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/v1/messages", base_url.trim_end_matches('/')),
            api_key,
        })
    }

    /// `None` when no credential is configured
    pub fn from_settings(settings: &AiSettings) -> Result<Option<Self>, AiError> {
        match settings.credential() {
            Some(key) => Self::new(&settings.base_url, key.clone()).map(Some),
            None => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn request_body(request: &CompletionRequest) -> MessagesRequest<'_> {
    MessagesRequest {
        model: &request.model,
        max_tokens: request.max_tokens,
        messages: [Message {
            role: "user",
            content: &request.prompt,
        }],
    }
}

fn first_text(response: MessagesResponse) -> Result<String, AiError> {
    response
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or(AiError::EmptyResponse)
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.expose())
            .header("anthropic-version", API_VERSION)
            .json(&request_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&detail)
                .map(|envelope| envelope.error.message)
                .unwrap_or(detail);
            return Err(AiError::Service(format!("{}: {}", status, message)));
        }

        let payload: MessagesResponse = response.json().await?;
        first_text(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = CompletionRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1000,
            prompt: "Price this".to_string(),
        };

        let body = serde_json::to_value(request_body(&request)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "claude-sonnet-4-20250514",
                "max_tokens": 1000,
                "messages": [{ "role": "user", "content": "Price this" }]
            })
        );
    }

    #[test]
    fn test_first_text_block() {
        let response: MessagesResponse = serde_json::from_value(serde_json::json!({
            "id": "msg_1",
            "content": [
                { "type": "thinking", "thinking": "..." },
                { "type": "text", "text": "{\"total_price\": 1}" }
            ]
        }))
        .unwrap();

        assert_eq!(first_text(response).unwrap(), "{\"total_price\": 1}");
    }

    #[test]
    fn test_empty_content_is_an_error() {
        let response: MessagesResponse =
            serde_json::from_value(serde_json::json!({ "content": [] })).unwrap();
        assert!(matches!(first_text(response), Err(AiError::EmptyResponse)));
    }

    #[test]
    fn test_settings_defaults_and_credential() {
        let settings: AiSettings = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.max_tokens, 1000);
        assert!(settings.credential().is_none());

        let blank: AiSettings =
            serde_json::from_value(serde_json::json!({ "api_key": "  " })).unwrap();
        assert!(blank.credential().is_none());
        assert!(AnthropicClient::from_settings(&blank).unwrap().is_none());
    }

    #[test]
    fn test_client_endpoint() {
        let settings = AiSettings {
            api_key: Some(Secret::new("sk-test")),
            base_url: "http://localhost:9999/".to_string(),
            ..Default::default()
        };
        let client = AnthropicClient::from_settings(&settings).unwrap().unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9999/v1/messages");
        assert!(!format!("{:?}", settings).contains("sk-test"));
    }
}
