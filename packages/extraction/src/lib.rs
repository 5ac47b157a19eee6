//! District Scheme Report Extraction Library
//!
//! Ingests unstructured government documents describing development
//! schemes per administrative district, converts them into a fixed
//! structured schema through an external LLM service, stores each
//! extraction with version control, and answers natural-language
//! questions grounded in the stored data.
//!
//! # Design Philosophy
//!
//! **LLM output is untrusted text**
//!
//! - Schema-constrained prompting, with validation against a
//!   controlled vocabulary - the model cannot invent categories
//! - Transient failures retried; malformed output repaired once with
//!   the validation errors, never blind-retried
//! - Versioning enforced at the storage layer: one current record per
//!   (district, sector, sub-category) scope, history append-only
//! - Empty scopes never reach the chat model - a canned answer covers
//!   the no-data case
//!
//! # Usage
//!
//! ```rust,ignore
//! use scheme_extraction::{DistrictIndex, MemoryStore, QueryScope};
//! use scheme_extraction::ai::GeminiAI;
//!
//! let index = DistrictIndex::new(MemoryStore::new(), GeminiAI::from_env()?);
//!
//! // Upload a report for a district
//! let report = index
//!     .ingest_document("Tawang", "q2_review.pdf", "dc_office", None, &raw_text)
//!     .await?;
//!
//! // Ask a grounded question
//! let scope = QueryScope::district("Tawang").with_sector("Swasth Arunachal: Health");
//! let answer = index.answer("How are institutional deliveries trending?", &scope).await?;
//! ```
//!
//! # Modules
//!
//! - [`schema`] - Schema Registry: vocabulary and validation contract
//! - [`traits`] - Core trait abstractions (AI, stores)
//! - [`types`] - Domain data types
//! - [`pipeline`] - Normalization, extraction, versioned commit, Q&A
//! - [`stores`] - Storage implementations (MemoryStore, SqliteStore)
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod pipeline;
pub mod schema;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "gemini")]
pub mod ai;

// Re-export core types at crate root
pub use error::{
    ErrorKind, FieldError, FieldErrorKind, InputError, LlmError, PipelineError, Result,
    SchemaViolation,
};
pub use schema::{
    PercentagePolicy, RawReport, SchemaRegistry, SectorDef, UnknownCategoryPolicy,
    ValidatedScope, ValidationPolicies, UNCATEGORIZED_SECTOR,
};
pub use traits::{
    ai::AI,
    store::{DistrictStore, DocumentStore, SchemeStore, VersionStore},
};
pub use types::{
    config::ExtractOptions,
    document::{district_key, District, DistrictInfo, Document},
    record::{
        ActionPoint, AnswerResponse, ExtractionCandidate, ExtractionRecord, HistoryEntry,
        QueryScope, UploadReport, UploadStatus,
    },
};

// Re-export DistrictIndex from pipeline
pub use pipeline::DistrictIndex;

// Re-export pipeline components
pub use pipeline::{
    extract_report, format_chat_prompt, format_extract_prompt, format_repair_prompt,
    merge_scopes, normalize, parse_report, serialize_context, split_into_chunks, ExtractOutcome,
    NO_DATA_ANSWER,
};

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "sqlite")]
pub use stores::SqliteStore;

// Re-export testing utilities
pub use testing::MockAI;
