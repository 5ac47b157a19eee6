//! AI trait for LLM operations.
//!
//! The pipeline needs two LLM capabilities: schema-constrained
//! extraction and grounded chat. Both return **untrusted text** — the
//! orchestrator parses and validates extraction output against the
//! Schema Registry, and never treats it as structured data.

use async_trait::async_trait;

use crate::error::LlmError;

/// AI trait for LLM operations.
///
/// Implementations wrap a specific provider and handle transport;
/// prompting and response validation stay in the pipeline.
#[async_trait]
pub trait AI: Send + Sync {
    /// Run the schema-constrained extraction prompt.
    ///
    /// Returns the model's raw text. May be malformed JSON, partial
    /// JSON, or a refusal — the caller validates.
    async fn extract_completion(&self, prompt: &str) -> Result<String, LlmError>;

    /// Run the grounded Q&A prompt.
    ///
    /// Returns conversational prose; no schema constraint applies.
    async fn chat_completion(&self, prompt: &str) -> Result<String, LlmError>;
}
