//! The extraction pipeline - from raw text to versioned records to
//! grounded answers.
//!
//! - [`normalize`] - text normalization and chunking
//! - [`prompts`] - prompt templates and formatters
//! - [`parse`] - untrusted LLM response parsing
//! - [`merge`] - deterministic chunk-merge reduction
//! - [`orchestrator`] - retry/repair extraction loop
//! - [`resolver`] - grounded Q&A context assembly
//! - [`index`] - the [`DistrictIndex`] entry point

pub mod index;
pub mod merge;
pub mod normalize;
pub mod orchestrator;
pub mod parse;
pub mod prompts;
pub mod resolver;

pub use index::DistrictIndex;
pub use merge::merge_scopes;
pub use normalize::{normalize, split_into_chunks};
pub use orchestrator::{extract_report, ExtractOutcome};
pub use parse::{extract_json_block, parse_report};
pub use prompts::{
    format_chat_prompt, format_extract_prompt, format_repair_prompt, report_schema_json,
    ChunkPosition,
};
pub use resolver::{sector_averages, serialize_context, NO_DATA_ANSWER};
