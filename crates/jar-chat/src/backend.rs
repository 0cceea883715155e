//! Completion backends.
//!
//! [`ConversationBackend`] turns a conversation history into the next
//! assistant message.  [`OpenAiCompatibleBackend`] speaks the OpenAI Chat
//! Completions wire format, which Groq, OpenAI and most local servers accept.

use std::time::Duration;

use async_trait::async_trait;
use jar_kernel::Turn;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use tracing::debug;

use crate::credentials::ApiKeyResolver;
use crate::error::{ChatError, Result};

/// Default OpenAI-compatible endpoint (Groq).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "qwen/qwen3-32b";

/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "JAR_CHAT_BASE_URL";

/// Environment variable overriding [`DEFAULT_MODEL`].
pub const MODEL_ENV: &str = "JAR_CHAT_MODEL";

/// Something that can continue a conversation.
#[async_trait]
pub trait ConversationBackend: Send + Sync {
    /// API key for the next request, or `None` when chat is not configured.
    fn api_key(&self) -> Option<String>;

    /// Produce the next assistant message for `turns`, authenticated with
    /// `api_key`.
    async fn complete(&self, api_key: &str, turns: &[Turn]) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Request parameters for an OpenAI-compatible endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatBackendConfig {
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
}

impl Default for ChatBackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            max_tokens: 500,
            temperature: 0.8,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ChatBackendConfig {
    /// Defaults with `JAR_CHAT_BASE_URL` / `JAR_CHAT_MODEL` applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(BASE_URL_ENV)
            && !url.is_empty()
        {
            config.base_url = url.trim_end_matches('/').to_owned();
        }
        if let Ok(model) = std::env::var(MODEL_ENV)
            && !model.is_empty()
        {
            config.model = model;
        }
        config
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Chat Completions client with bearer authentication.
///
/// The API key is resolved on every [`ConversationBackend::api_key`] call, so
/// a key added to `.env` while the assistant is running is picked up without
/// a restart.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleBackend {
    config: ChatBackendConfig,
    credentials: ApiKeyResolver,
    http: reqwest::Client,
}

impl OpenAiCompatibleBackend {
    pub fn new(config: ChatBackendConfig, credentials: ApiKeyResolver) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::RequestFailed {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            config,
            credentials,
            http,
        })
    }

    pub fn config(&self) -> &ChatBackendConfig {
        &self.config
    }

    async fn send(&self, api_key: &str, body: &Value) -> Result<reqwest::Response> {
        let url = self.config.endpoint();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                ChatError::RequestFailed {
                    reason: format!("invalid authorization header: {e}"),
                }
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!(
            url = %url,
            model = %self.config.model,
            turns = body["messages"].as_array().map_or(0, Vec::len),
            "sending chat request"
        );

        self.http
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| ChatError::RequestFailed {
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl ConversationBackend for OpenAiCompatibleBackend {
    fn api_key(&self) -> Option<String> {
        self.credentials.resolve()
    }

    async fn complete(&self, api_key: &str, turns: &[Turn]) -> Result<String> {
        let body = build_request_body(&self.config, turns);
        let resp = self.send(api_key, &body).await?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| ChatError::RequestFailed {
            reason: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(ChatError::RequestFailed {
                reason: format!("API returned {status}: {text}"),
            });
        }

        let v: Value = serde_json::from_str(&text).map_err(|e| ChatError::ParseFailed {
            reason: format!("invalid JSON response: {e}"),
        })?;

        parse_response(&v)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Build the JSON body for the Chat Completions API.
pub fn build_request_body(config: &ChatBackendConfig, turns: &[Turn]) -> Value {
    json!({
        "model": config.model,
        "messages": turns,
        "max_tokens": config.max_tokens,
        "temperature": config.temperature,
    })
}

/// Extract `choices[0].message.content` from a completion response.
pub fn parse_response(v: &Value) -> Result<String> {
    let message = &v["choices"][0]["message"];

    if message.is_null() {
        return Err(ChatError::ParseFailed {
            reason: "missing `choices[0].message` in response".into(),
        });
    }

    message["content"]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| ChatError::ParseFailed {
            reason: "missing `choices[0].message.content` in response".into(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
