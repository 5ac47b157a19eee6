//! Parsing of untrusted LLM extraction responses.
//!
//! The model is asked for bare JSON but routinely wraps it in markdown
//! fences or narration. Parsing locates the JSON object before
//! deserializing; schema validation happens separately.

use crate::error::SchemaViolation;
use crate::schema::RawReport;

/// Locate the JSON object inside a model response.
///
/// Strips markdown code fences and any surrounding narration by taking
/// the span from the first `{` to the last `}`.
pub fn extract_json_block(response: &str) -> Option<&str> {
    let mut text = response.trim();

    if let Some(start) = text.find("```json") {
        let after = &text[start + 7..];
        text = match after.find("```") {
            Some(end) => &after[..end],
            None => after,
        };
    } else if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        text = match after.find("```") {
            Some(end) => &after[..end],
            None => after,
        };
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(text[start..=end].trim())
}

/// Parse a model response into the wire structure.
///
/// Failure is a schema violation (the repair path handles it), never a
/// transient error: re-sending the same prompt is unlikely to fix a
/// malformed response.
pub fn parse_report(response: &str) -> Result<RawReport, SchemaViolation> {
    let block = extract_json_block(response)
        .ok_or_else(|| SchemaViolation::parse_failure("response contains no JSON object"))?;

    serde_json::from_str(block)
        .map_err(|e| SchemaViolation::parse_failure(format!("invalid JSON: {e}")))
}
