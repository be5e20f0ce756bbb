//! Model boundary: the `ModelClient` trait and the Gemini implementation.
//!
//! `GeminiClient` calls the Gemini `generateContent` REST endpoint.  All
//! connection details come from [`LlmConfig`]; the API key is resolved at
//! call time so a missing key fails the first request, not startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while generating an answer.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be parsed.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// No API key in the environment or settings file.
    #[error("no API key found (set the {0} environment variable)")]
    MissingApiKey(String),

    /// The response carried no candidates.
    #[error("No answer generated.")]
    NoCandidates,

    /// The first candidate had no text part.
    #[error("first candidate has no text content")]
    MissingText,
}

impl LlmError {
    /// Message shown to the user in place of an answer.
    ///
    /// ```
    /// use doc_qa::llm::LlmError;
    ///
    /// assert_eq!(LlmError::NoCandidates.user_message(), "No answer generated.");
    /// assert!(LlmError::Timeout.user_message().starts_with("Error:"));
    /// ```
    pub fn user_message(&self) -> String {
        match self {
            LlmError::NoCandidates => self.to_string(),
            other => format!("Error: {other}"),
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// `generateContent` response body (only the fields we read).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One generated completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Response with a single candidate holding `text`.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    parts: vec![Part {
                        text: Some(text.into()),
                    }],
                }),
                finish_reason: Some("STOP".into()),
            }],
        }
    }

    /// Text of the first part of the first candidate.
    pub fn first_text(&self) -> Result<&str, LlmError> {
        let candidate = self.candidates.first().ok_or(LlmError::NoCandidates)?;
        candidate
            .content
            .as_ref()
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .ok_or(LlmError::MissingText)
    }
}

// ---------------------------------------------------------------------------
// ModelClient trait
// ---------------------------------------------------------------------------

/// Async boundary to a generative-language service.
///
/// Implementors must be `Send + Sync` so they can be shared across threads
/// (e.g. wrapped in `Arc<dyn ModelClient>`).
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate_content(&self, prompt: &str) -> Result<GenerateContentResponse, LlmError>;
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Calls `POST {base_url}/v1beta/models/{model}:generateContent`.
pub struct GeminiClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl GeminiClient {
    /// Build a `GeminiClient` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Environment variable first, then the settings file.
    fn api_key(&self) -> Result<String, LlmError> {
        let from_env = std::env::var(&self.config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        let from_config = self
            .config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty());

        from_env
            .or(from_config)
            .ok_or_else(|| LlmError::MissingApiKey(self.config.api_key_env.clone()))
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "contents": [
                { "role": "user", "parts": [ { "text": prompt } ] }
            ]
        });
        if let Some(t) = self.config.temperature {
            body["generationConfig"] = serde_json::json!({ "temperature": t });
        }
        body
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate_content(&self, prompt: &str) -> Result<GenerateContentResponse, LlmError> {
        let key = self.api_key()?;

        log::debug!(
            "llm: POST {} (prompt {} chars)",
            self.endpoint(),
            prompt.chars().count()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = api_error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))
    }
}

/// Pull `error.message` out of a Gemini error body.
fn api_error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json["error"]["message"].as_str().map(str::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
