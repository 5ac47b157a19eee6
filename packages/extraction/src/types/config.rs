//! Configuration for the extraction pipeline.
//!
//! Budgets and retry policy travel as explicit parameters rather than
//! ambient configuration, so tests can pin deterministic values.

use std::time::Duration;

use crate::schema::ValidationPolicies;

/// Options controlling one extraction run and the query resolver.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Largest document (chars) sent in a single prompt. Longer
    /// documents are chunked along paragraph boundaries.
    pub max_prompt_chars: usize,

    /// Overlap (chars) carried between consecutive chunks so an action
    /// point's context is not lost at a boundary.
    pub chunk_overlap_chars: usize,

    /// Retries on transient LLM failures. Validation failures are never
    /// blind-retried; they get one repair attempt instead.
    pub max_retries: u32,

    /// Base delay for exponential backoff between retries.
    pub retry_base_delay: Duration,

    /// Per-attempt time budget for an LLM call.
    pub llm_timeout: Duration,

    /// Context budget (chars) for grounded answers. Larger contexts
    /// fall back to per-sector aggregates.
    pub max_context_chars: usize,

    /// Validation policy choices (percentage range, unknown categories).
    pub policies: ValidationPolicies,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_prompt_chars: 8_000,
            chunk_overlap_chars: 500,
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
            llm_timeout: Duration::from_secs(300),
            max_context_chars: 12_000,
            policies: ValidationPolicies::default(),
        }
    }
}

impl ExtractOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the single-prompt size budget.
    pub fn with_max_prompt_chars(mut self, chars: usize) -> Self {
        self.max_prompt_chars = chars;
        self
    }

    /// Set the chunk overlap.
    pub fn with_chunk_overlap(mut self, chars: usize) -> Self {
        self.chunk_overlap_chars = chars;
        self
    }

    /// Set the transient-failure retry budget.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the backoff base delay.
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Set the per-attempt LLM timeout.
    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }

    /// Set the grounded-answer context budget.
    pub fn with_max_context_chars(mut self, chars: usize) -> Self {
        self.max_context_chars = chars;
        self
    }

    /// Set the validation policies.
    pub fn with_policies(mut self, policies: ValidationPolicies) -> Self {
        self.policies = policies;
        self
    }
}
