//! Gemini implementation of the AI trait.
//!
//! A reference implementation over the Gemini completion gateway. The
//! response shape varies between deployments, so text extraction is
//! tolerant: it tries the known layouts before falling back to the
//! raw body.
//!
//! # Example
//!
//! ```rust,ignore
//! use scheme_extraction::ai::GeminiAI;
//!
//! let ai = GeminiAI::from_env()?.with_model("gemini-2.0-flash");
//! let index = DistrictIndex::new(store, ai);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::error::LlmError;
use crate::traits::ai::AI;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/completions";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Extraction calls run cold for reproducible structure.
const EXTRACT_TEMPERATURE: f32 = 0.3;

/// Chat answers run warmer for conversational tone.
const CHAT_TEMPERATURE: f32 = 0.7;

/// Gemini-based AI implementation.
#[derive(Clone)]
pub struct GeminiAI {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    top_p: f32,
    stream: bool,
    seed: u32,
}

impl GeminiAI {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: SecretString::from(api_key.into()),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from the `GEMINI_API_KEY` environment variable.
    /// `GEMINI_API_URL` overrides the default endpoint when set.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| LlmError::Config("GEMINI_API_KEY not set".into()))?;
        let mut ai = Self::new(api_key);
        if let Ok(url) = std::env::var("GEMINI_API_URL") {
            ai.base_url = url;
        }
        Ok(ai)
    }

    /// Set the model (default: gemini-2.0-flash).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom endpoint URL (for gateways and proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Make a completion request.
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        let request = CompletionRequest {
            model: &self.model,
            prompt,
            temperature,
            top_p: 1.0,
            stream: false,
            seed: 25,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout { seconds: 0 }
                } else {
                    LlmError::Unavailable(Box::new(e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Unavailable(Box::new(e)))?;

        let text = extract_text(&body).ok_or(LlmError::EmptyResponse)?;
        debug!(model = %self.model, chars = text.len(), "completion received");
        Ok(text)
    }
}

/// Pull the generated text out of whichever response layout arrived.
fn extract_text(body: &serde_json::Value) -> Option<String> {
    // OpenAI-compatible layouts: choices[0].text or choices[0].message.content
    if let Some(choice) = body.get("choices").and_then(|c| c.get(0)) {
        if let Some(text) = choice.get("text").and_then(|t| t.as_str()) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
        if let Some(content) = choice
            .pointer("/message/content")
            .and_then(|c| c.as_str())
        {
            if !content.is_empty() {
                return Some(content.to_string());
            }
        }
    }

    // Flat layouts some gateways use
    for field in ["text", "response", "content"] {
        if let Some(text) = body.get(field).and_then(|t| t.as_str()) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }

    body.as_str().map(|s| s.to_string()).filter(|s| !s.is_empty())
}

#[async_trait]
impl AI for GeminiAI {
    async fn extract_completion(&self, prompt: &str) -> Result<String, LlmError> {
        self.complete(prompt, EXTRACT_TEMPERATURE).await
    }

    async fn chat_completion(&self, prompt: &str) -> Result<String, LlmError> {
        self.complete(prompt, CHAT_TEMPERATURE).await
    }
}
