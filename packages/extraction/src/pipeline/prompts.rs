//! LLM prompts for extraction, repair, and grounded Q&A.
//!
//! The extraction prompt embeds the registry's vocabulary enumeration
//! and the JSON Schema of the wire contract, so the model cannot invent
//! categories or drift from the expected shape.

use schemars::schema_for;

use crate::error::FieldError;
use crate::schema::{RawReport, SchemaRegistry};

/// Prompt for schema-constrained report extraction.
pub const EXTRACT_PROMPT: &str = r#"You are an AI model that extracts structured and factual information from government documents describing district development schemes.{chunk_note}

CRITICAL EXTRACTION REQUIREMENTS:
1. CATEGORIES: Classify content strictly into the predefined sectors and sub-categories listed below. Do NOT invent categories.
2. ACTION NAMES: Use the exact sub-category name as the action_name for its action point.
3. COMPREHENSIVE EXTRACTION: Capture every number, percentage, status, date, target, achievement, and note the document gives for a sub-category. Nothing should be missed.
4. LOGICAL STATUS: Infer a current_status from the content (e.g. "In Progress", "Completed", "Pending", "On Track", "Delayed").
5. DATA FIDELITY: Only extract information explicitly present in the document. Do not invent data.
6. ADDITIONAL DETAILS: Put everything beyond the action point fields into additional_details, using descriptive keys (e.g. "target_beneficiaries", "funds_allocated", "completion_date").
7. Only include sectors and sub-categories that have relevant data in the document.
8. Ensure the district field is "{district}" and upload_date is "{report_date}".

Return JSON conforming exactly to this schema:

{schema}

Example shape:

{
  "district": "{district}",
  "upload_date": "{report_date}",
  "sectors": [
    {
      "sector_name": "<a predefined sector>",
      "sub_categories": [
        {
          "sub_category_name": "<a predefined sub-category>",
          "information": {
            "action_points": [
              {
                "action_name": "<the sub-category name>",
                "current_status": "In Progress",
                "achievement_percentage": 80,
                "data_source": "text or null",
                "remarks": "text or null"
              }
            ],
            "additional_details": {
              "target_beneficiaries": "extracted value"
            }
          }
        }
      ]
    }
  ]
}

Predefined Sectors & Sub-Categories:

{vocabulary}

Document Text:
{document}

Return ONLY valid JSON following the schema above. Do not include any explanatory text before or after the JSON."#;

/// Note prepended when the document arrives in chunks.
pub const CHUNK_NOTE: &str = r#"

IMPORTANT: This is chunk {chunk_num} of {total_chunks} from a large document.
- Extract all relevant information from THIS chunk only, even if it seems incomplete.
- The results from all chunks will be merged together."#;

/// Error-correction instruction appended for the repair attempt.
pub const REPAIR_NOTE: &str = r#"

YOUR PREVIOUS RESPONSE FAILED VALIDATION with these errors:
{errors}

Produce the JSON again, correcting every error listed above. Return ONLY valid JSON."#;

/// Prompt for grounded question answering over stored district data.
pub const CHAT_PROMPT: &str = r#"You are an assistant helping users query information about district development schemes. Answer questions based on the provided context data.

District: {district}

Context Data (from the database):
{context}

User Question: {question}

Instructions:
- Answer based only on the provided context data.
- If the context does not contain relevant information, politely say so.
- Be conversational and helpful.
- Include specific numbers, statuses, and facts from the context when available.
- Organize the response with bullet points or short paragraphs as needed.

Provide a helpful and accurate response:"#;

/// Render the JSON Schema of the wire contract for prompt embedding.
pub fn report_schema_json() -> String {
    let schema = schema_for!(RawReport);
    serde_json::to_string_pretty(&schema).expect("schema serializes")
}

/// Position of a chunk within its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPosition {
    /// 1-based chunk number
    pub number: usize,
    pub total: usize,
}

/// Format the extraction prompt for one document or chunk.
pub fn format_extract_prompt(
    registry: &SchemaRegistry,
    district: &str,
    report_date: Option<&str>,
    chunk: Option<ChunkPosition>,
    document: &str,
) -> String {
    let chunk_note = match chunk {
        Some(pos) if pos.total > 1 => CHUNK_NOTE
            .replace("{chunk_num}", &pos.number.to_string())
            .replace("{total_chunks}", &pos.total.to_string()),
        _ => String::new(),
    };

    EXTRACT_PROMPT
        .replace("{chunk_note}", &chunk_note)
        .replace("{district}", district)
        .replace("{report_date}", report_date.unwrap_or("not specified"))
        .replace("{schema}", &report_schema_json())
        .replace("{vocabulary}", &registry.vocabulary_block())
        .replace("{document}", document)
}

/// Append the repair instruction, listing the validation errors.
pub fn format_repair_prompt(base_prompt: &str, errors: &[FieldError]) -> String {
    let listed = errors
        .iter()
        .map(|e| format!("- {e}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = base_prompt.to_string();
    prompt.push_str(&REPAIR_NOTE.replace("{errors}", &listed));
    prompt
}

/// Format the grounded Q&A prompt.
pub fn format_chat_prompt(district: &str, context: &str, question: &str) -> String {
    CHAT_PROMPT
        .replace("{district}", district)
        .replace("{context}", context)
        .replace("{question}", question)
}
