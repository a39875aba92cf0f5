//! LLM Client: the single point of entry for completion API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the completion endpoint directly.
//! All generation goes through `CompletionClient`.
//!
//! Model and sampling parameters are hardcoded so every regeneration is comparable.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::credential::ApiCredential;

pub const COMPLETIONS_URL: &str = "https://api.openai.com/v1/completions";
/// The model used for all schema generation.
pub const MODEL: &str = "text-davinci-003";
const MAX_TOKENS: u32 = 2048;
const TEMPERATURE: f64 = 0.7;
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl CompletionResponse {
    /// Text of the first choice, if the endpoint returned one.
    pub fn text(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// One prompt in, one completion out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Completion client over HTTP. One request per call: no retries, no streaming.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    credential: ApiCredential,
}

impl LlmClient {
    pub fn with_endpoint(
        credential: ApiCredential,
        endpoint: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(HTTP_TIMEOUT).build()?,
            endpoint: endpoint.into(),
            credential,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Makes the raw completion call, returning the decoded response object.
    pub async fn call(&self, prompt: &str) -> Result<CompletionResponse, LlmError> {
        let request_body = CompletionRequest {
            model: MODEL,
            prompt,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.credential.expose())
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Completion API returned {}: {}", status, body);
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Completion call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(completion)
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Strips a ``` code fence from LLM output, with or without a `json`
/// language tag in any case (```json, ```JSON).
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text.strip_prefix("```") else {
        return text;
    };
    let stripped = match stripped.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &stripped[4..],
        _ => stripped,
    };
    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(stripped)
}
