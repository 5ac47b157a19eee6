//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the pipeline
//! without making real LLM calls.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

use crate::error::LlmError;
use crate::traits::ai::AI;

/// A mock AI implementation for testing.
///
/// Responses are scripted as a queue per method: each call pops the
/// next entry, and an exhausted queue falls back to the default
/// response (or an error when none is set). Prompts are recorded so
/// tests can assert on what the pipeline sent.
///
/// Clones share state, so a clone kept outside the pipeline still
/// observes every call.
#[derive(Default, Clone)]
pub struct MockAI {
    extract_queue: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    chat_queue: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,

    /// Fallback extraction response when the queue is empty
    default_extract: Arc<RwLock<Option<String>>>,

    /// Fallback chat response when the queue is empty
    default_chat: Arc<RwLock<Option<String>>>,

    calls: Arc<RwLock<Vec<MockAICall>>>,
}

/// Record of a call made to the mock AI.
#[derive(Debug, Clone)]
pub enum MockAICall {
    Extract { prompt: String },
    Chat { prompt: String },
}

impl MockAI {
    /// Create a new mock AI with empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful extraction response.
    pub fn with_extract_response(self, response: impl Into<String>) -> Self {
        self.extract_queue
            .lock()
            .unwrap()
            .push_back(Ok(response.into()));
        self
    }

    /// Queue an extraction failure.
    pub fn with_extract_error(self, error: LlmError) -> Self {
        self.extract_queue.lock().unwrap().push_back(Err(error));
        self
    }

    /// Queue a successful chat response.
    pub fn with_chat_response(self, response: impl Into<String>) -> Self {
        self.chat_queue
            .lock()
            .unwrap()
            .push_back(Ok(response.into()));
        self
    }

    /// Queue a chat failure.
    pub fn with_chat_error(self, error: LlmError) -> Self {
        self.chat_queue.lock().unwrap().push_back(Err(error));
        self
    }

    /// Set the fallback extraction response for an exhausted queue.
    pub fn with_default_extract(self, response: impl Into<String>) -> Self {
        *self.default_extract.write().unwrap() = Some(response.into());
        self
    }

    /// Set the fallback chat response for an exhausted queue.
    pub fn with_default_chat(self, response: impl Into<String>) -> Self {
        *self.default_chat.write().unwrap() = Some(response.into());
        self
    }

    /// All calls made to this mock, in order.
    pub fn calls(&self) -> Vec<MockAICall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of extraction calls made.
    pub fn extract_calls(&self) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockAICall::Extract { .. }))
            .count()
    }

    /// Number of chat calls made.
    pub fn chat_calls(&self) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockAICall::Chat { .. }))
            .count()
    }

    /// Prompts from extraction calls, in order.
    pub fn extract_prompts(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                MockAICall::Extract { prompt } => Some(prompt.clone()),
                MockAICall::Chat { .. } => None,
            })
            .collect()
    }

    /// Prompts from chat calls, in order.
    pub fn chat_prompts(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                MockAICall::Chat { prompt } => Some(prompt.clone()),
                MockAICall::Extract { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl AI for MockAI {
    async fn extract_completion(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.write().unwrap().push(MockAICall::Extract {
            prompt: prompt.to_string(),
        });

        if let Some(scripted) = self.extract_queue.lock().unwrap().pop_front() {
            return scripted;
        }
        match self.default_extract.read().unwrap().clone() {
            Some(response) => Ok(response),
            None => Err(LlmError::Config(
                "MockAI extraction queue exhausted with no default".into(),
            )),
        }
    }

    async fn chat_completion(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.write().unwrap().push(MockAICall::Chat {
            prompt: prompt.to_string(),
        });

        if let Some(scripted) = self.chat_queue.lock().unwrap().pop_front() {
            return scripted;
        }
        match self.default_chat.read().unwrap().clone() {
            Some(response) => Ok(response),
            None => Err(LlmError::Config(
                "MockAI chat queue exhausted with no default".into(),
            )),
        }
    }
}

/// A valid single-scope report response, as the extraction service
/// would return it.
pub fn sample_report_json(district: &str, sector: &str, sub_category: &str, pct: f64) -> String {
    serde_json::json!({
        "district": district,
        "sectors": [{
            "sector_name": sector,
            "sub_categories": [{
                "sub_category_name": sub_category,
                "information": {
                    "action_points": [{
                        "action_name": sub_category,
                        "current_status": "In Progress",
                        "achievement_percentage": pct,
                        "data_source": "district report",
                        "remarks": null
                    }],
                    "additional_details": {}
                }
            }]
        }]
    })
    .to_string()
}
