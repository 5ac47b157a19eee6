//! Extraction orchestration - prompt, invoke, validate, repair, merge.
//!
//! Turns one normalized document into validated per-scope candidates.
//! Transient LLM failures are retried with exponential backoff;
//! validation failures get exactly one repair attempt with the field
//! errors appended to the prompt. Chunked documents are best-effort:
//! the merge proceeds when at least one chunk succeeds.

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{LlmError, PipelineError, Result, SchemaViolation};
use crate::pipeline::merge::merge_scopes;
use crate::pipeline::normalize::split_into_chunks;
use crate::pipeline::parse::parse_report;
use crate::pipeline::prompts::{format_extract_prompt, format_repair_prompt, ChunkPosition};
use crate::schema::{SchemaRegistry, ValidatedScope};
use crate::traits::ai::AI;
use crate::types::{
    config::ExtractOptions,
    document::district_key,
    record::ExtractionCandidate,
};

/// What one document's extraction produced.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    /// One candidate per (sector, sub-category) scope touched
    pub candidates: Vec<ExtractionCandidate>,

    /// Number of chunks attempted
    pub chunks_total: usize,

    /// 1-based numbers of chunks that failed after retry and repair
    pub chunks_failed: Vec<usize>,
}

impl ExtractOutcome {
    /// Whether every chunk contributed to the merge.
    pub fn is_complete(&self) -> bool {
        self.chunks_failed.is_empty()
    }
}

/// Why a single chunk failed, after its retry and repair budget.
enum ChunkFailure {
    Transient(LlmError),
    Schema(SchemaViolation),
}

/// Extract structured candidates from a normalized document.
///
/// All-or-nothing per document when no chunk succeeds; best-effort
/// otherwise. Nothing is written to storage here.
pub async fn extract_report<A: AI>(
    ai: &A,
    registry: &SchemaRegistry,
    district: &str,
    report_date: Option<NaiveDate>,
    normalized_text: &str,
    document_id: Uuid,
    options: &ExtractOptions,
) -> Result<ExtractOutcome> {
    let chunks = split_into_chunks(
        normalized_text,
        options.max_prompt_chars,
        options.chunk_overlap_chars,
    );
    let total = chunks.len();
    let date = report_date.map(|d| d.to_string());
    debug!(district, chunks = total, "starting extraction");

    let mut successes: Vec<Vec<ValidatedScope>> = Vec::new();
    let mut failed: Vec<usize> = Vec::new();
    let mut last_failure: Option<ChunkFailure> = None;

    for (i, chunk) in chunks.iter().enumerate() {
        let position = ChunkPosition {
            number: i + 1,
            total,
        };
        let prompt = format_extract_prompt(
            registry,
            district,
            date.as_deref(),
            Some(position),
            chunk,
        );

        match extract_chunk(ai, registry, &prompt, options).await {
            Ok(scopes) => successes.push(scopes),
            Err(failure) => {
                match &failure {
                    ChunkFailure::Transient(e) => {
                        warn!(district, chunk = i + 1, error = %e, "chunk failed: LLM unavailable")
                    }
                    ChunkFailure::Schema(v) => {
                        warn!(district, chunk = i + 1, errors = v.errors.len(), "chunk failed validation")
                    }
                }
                failed.push(i + 1);
                last_failure = Some(failure);
            }
        }
    }

    if successes.is_empty() {
        // Nothing to merge: surface the last failure as the document's.
        return Err(match last_failure {
            Some(ChunkFailure::Schema(v)) => PipelineError::Schema(v),
            Some(ChunkFailure::Transient(e)) => PipelineError::Llm(e),
            None => PipelineError::Input(crate::error::InputError::EmptyDocument),
        });
    }

    let merged = merge_scopes(successes);
    let district = district_key(district);
    let candidates = merged
        .into_iter()
        .map(|scope| ExtractionCandidate {
            district: district.clone(),
            sector: scope.sector,
            sub_category: scope.sub_category,
            action_points: scope.action_points,
            additional_details: scope.additional_details,
            document_id,
        })
        .collect();

    Ok(ExtractOutcome {
        candidates,
        chunks_total: total,
        chunks_failed: failed,
    })
}

/// Extract and validate one chunk, with the repair attempt.
async fn extract_chunk<A: AI>(
    ai: &A,
    registry: &SchemaRegistry,
    prompt: &str,
    options: &ExtractOptions,
) -> std::result::Result<Vec<ValidatedScope>, ChunkFailure> {
    let response = call_with_retry(ai, prompt, options)
        .await
        .map_err(ChunkFailure::Transient)?;

    let violation = match parse_and_validate(registry, &response, options) {
        Ok(scopes) => return Ok(scopes),
        Err(v) => v,
    };

    // One repair attempt with the errors listed. Re-sending the same
    // prompt unchanged would not fix a malformed response.
    debug!(errors = violation.errors.len(), "issuing repair attempt");
    let repair_prompt = format_repair_prompt(prompt, &violation.errors);
    let response = call_with_retry(ai, &repair_prompt, options)
        .await
        .map_err(ChunkFailure::Transient)?;

    parse_and_validate(registry, &response, options).map_err(ChunkFailure::Schema)
}

fn parse_and_validate(
    registry: &SchemaRegistry,
    response: &str,
    options: &ExtractOptions,
) -> std::result::Result<Vec<ValidatedScope>, SchemaViolation> {
    let raw = parse_report(response)?;
    registry.validate(&raw, &options.policies)
}

/// Invoke the extraction service with timeout and transient retries.
async fn call_with_retry<A: AI>(
    ai: &A,
    prompt: &str,
    options: &ExtractOptions,
) -> std::result::Result<String, LlmError> {
    let mut attempt: u32 = 0;
    loop {
        let outcome = tokio::time::timeout(options.llm_timeout, ai.extract_completion(prompt)).await;
        let error = match outcome {
            Ok(Ok(text)) => return Ok(text),
            Ok(Err(e)) => e,
            Err(_) => LlmError::Timeout {
                seconds: options.llm_timeout.as_secs(),
            },
        };

        if !error.is_transient() || attempt >= options.max_retries {
            return Err(error);
        }

        let delay = options.retry_base_delay * 2u32.saturating_pow(attempt);
        warn!(attempt = attempt + 1, delay_ms = delay.as_millis() as u64, error = %error, "retrying LLM call");
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SectorDef;
    use crate::testing::MockAI;
    use std::time::Duration;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new([SectorDef::new("Health", ["Immunization"])])
    }

    fn fast_options() -> ExtractOptions {
        ExtractOptions::new()
            .with_retry_base_delay(Duration::from_millis(1))
            .with_llm_timeout(Duration::from_secs(5))
    }

    fn health_report() -> String {
        serde_json::json!({
            "district": "Tawang",
            "sectors": [{
                "sector_name": "Health",
                "sub_categories": [{
                    "sub_category_name": "Immunization",
                    "information": {
                        "action_points": [{
                            "action_name": "Immunization",
                            "current_status": "In Progress",
                            "achievement_percentage": 80
                        }],
                        "additional_details": {}
                    }
                }]
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_single_chunk_extraction() {
        let ai = MockAI::new().with_extract_response(health_report());
        let outcome = extract_report(
            &ai,
            &registry(),
            "Tawang",
            None,
            "Immunization at 80%",
            Uuid::new_v4(),
            &fast_options(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.chunks_total, 1);
        assert!(outcome.is_complete());
        assert_eq!(outcome.candidates.len(), 1);
        let candidate = &outcome.candidates[0];
        assert_eq!(candidate.district, "tawang");
        assert_eq!(candidate.sector, "Health");
        assert_eq!(
            candidate.action_points[0].achievement_percentage,
            Some(80.0)
        );
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let ai = MockAI::new()
            .with_extract_error(LlmError::Api {
                status: 503,
                message: "overloaded".into(),
            })
            .with_extract_response(health_report());

        let outcome = extract_report(
            &ai,
            &registry(),
            "Tawang",
            None,
            "doc",
            Uuid::new_v4(),
            &fast_options(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(ai.extract_calls(), 2);
    }

    #[tokio::test]
    async fn test_retry_budget_exhausted_surfaces_transient_error() {
        let ai = MockAI::new()
            .with_extract_error(LlmError::Timeout { seconds: 1 })
            .with_extract_error(LlmError::Timeout { seconds: 1 })
            .with_extract_error(LlmError::Timeout { seconds: 1 });

        let err = extract_report(
            &ai,
            &registry(),
            "Tawang",
            None,
            "doc",
            Uuid::new_v4(),
            &fast_options().with_max_retries(2),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::Llm(_)));
        assert_eq!(ai.extract_calls(), 3);
    }

    #[tokio::test]
    async fn test_malformed_response_gets_one_repair_attempt() {
        let ai = MockAI::new()
            .with_extract_response("I cannot produce JSON for this.".to_string())
            .with_extract_response(health_report());

        let outcome = extract_report(
            &ai,
            &registry(),
            "Tawang",
            None,
            "doc",
            Uuid::new_v4(),
            &fast_options(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(ai.extract_calls(), 2);
        // The second call carried the repair instruction.
        let prompts = ai.extract_prompts();
        assert!(prompts[1].contains("FAILED VALIDATION"));
    }

    #[tokio::test]
    async fn test_repair_failure_is_schema_violation() {
        let ai = MockAI::new()
            .with_extract_response("not json".to_string())
            .with_extract_response("still not json".to_string());

        let err = extract_report(
            &ai,
            &registry(),
            "Tawang",
            None,
            "doc",
            Uuid::new_v4(),
            &fast_options(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::Schema(_)));
        // No blind retries of validation failures.
        assert_eq!(ai.extract_calls(), 2);
    }

    #[tokio::test]
    async fn test_best_effort_merge_over_failed_chunks() {
        // Two chunks: first succeeds, second fails both attempts.
        let ai = MockAI::new()
            .with_extract_response(health_report())
            .with_extract_response("garbage".to_string())
            .with_extract_response("garbage again".to_string());

        let para = "Immunization coverage update. ".repeat(8);
        let text = format!("{para}\n\n{para}\n\n{para}");
        let options = fast_options().with_max_prompt_chars(600).with_chunk_overlap(50);

        let outcome = extract_report(
            &ai,
            &registry(),
            "Tawang",
            None,
            &text,
            Uuid::new_v4(),
            &options,
        )
        .await
        .unwrap();

        assert_eq!(outcome.chunks_total, 2);
        assert_eq!(outcome.chunks_failed, vec![2]);
        assert_eq!(outcome.candidates.len(), 1);
    }
}
