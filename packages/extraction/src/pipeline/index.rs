//! The DistrictIndex - main entry point for the pipeline.
//!
//! Wires the normalizer, orchestrator, version store, and resolver
//! into the three operations the application surface needs: ingest a
//! document, answer a grounded question, and read version history.

use async_stream::stream;
use chrono::NaiveDate;
use futures::Stream;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{PipelineError, Result};
use crate::pipeline::orchestrator::extract_report;
use crate::pipeline::prompts::format_chat_prompt;
use crate::pipeline::resolver::{sector_averages, serialize_context, NO_DATA_ANSWER};
use crate::schema::SchemaRegistry;
use crate::traits::{ai::AI, store::SchemeStore};
use crate::types::{
    config::ExtractOptions,
    document::{District, DistrictInfo, Document},
    record::{
        AnswerResponse, ExtractionRecord, HistoryEntry, QueryScope, UploadReport, UploadStatus,
    },
};

/// The main entry point - districts, their documents, and the
/// versioned extractions over them.
///
/// # Example
///
/// ```rust,ignore
/// use scheme_extraction::{DistrictIndex, MemoryStore};
/// use scheme_extraction::testing::MockAI;
///
/// let index = DistrictIndex::new(MemoryStore::new(), MockAI::new());
///
/// // Upload a report
/// let report = index
///     .ingest_document("Tawang", "q2.pdf", "dc_office", None, raw_text)
///     .await?;
///
/// // Ask a grounded question
/// let scope = QueryScope::district("Tawang");
/// let answer = index.answer("How is immunization going?", &scope).await?;
/// ```
pub struct DistrictIndex<S: SchemeStore, A: AI> {
    store: S,
    ai: A,
    registry: SchemaRegistry,
    options: ExtractOptions,
}

impl<S: SchemeStore, A: AI> DistrictIndex<S, A> {
    /// Create a new index with the default vocabulary and options.
    pub fn new(store: S, ai: A) -> Self {
        Self {
            store,
            ai,
            registry: SchemaRegistry::default(),
            options: ExtractOptions::default(),
        }
    }

    /// Replace the schema registry.
    pub fn with_registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the extraction options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// The registry this index validates against.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The options this index extracts with.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Underlying store, for callers needing direct reads.
    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Districts
    // =========================================================================

    /// Register a district ahead of its first upload.
    pub async fn register_district(&self, name: &str) -> Result<District> {
        self.store.get_or_create_district(name).await
    }

    /// All districts with their upload counts, sorted by name.
    pub async fn districts(&self) -> Result<Vec<DistrictInfo>> {
        let mut infos = Vec::new();
        for district in self.store.list_districts().await? {
            let document_count = self.store.count_documents(&district.key).await?;
            infos.push(DistrictInfo {
                district,
                document_count,
            });
        }
        Ok(infos)
    }

    // =========================================================================
    // Ingest
    // =========================================================================

    /// Ingest one uploaded document: normalize, extract, commit.
    ///
    /// The document row is written before extraction and retained even
    /// when extraction fails, so failed uploads stay auditable. Commits
    /// happen only after the whole candidate set validates - a failed
    /// extraction never writes a partial version.
    pub async fn ingest_document(
        &self,
        district_name: &str,
        file_name: &str,
        uploaded_by: &str,
        report_date: Option<NaiveDate>,
        raw_text: &str,
    ) -> Result<UploadReport> {
        let normalized = crate::pipeline::normalize::normalize(raw_text)?;

        let district = self.store.get_or_create_district(district_name).await?;
        let mut document = Document::new(&district.key, file_name, uploaded_by, raw_text);
        if let Some(date) = report_date {
            document = document.with_report_date(date);
        }
        self.store.create_document(&document).await?;
        info!(district = %district.key, document = %document.id, file = file_name, "document stored");

        let outcome = match extract_report(
            &self.ai,
            &self.registry,
            &district.name,
            report_date,
            &normalized,
            document.id,
            &self.options,
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                // Document stays for audit; no extraction rows exist.
                warn!(district = %district.key, document = %document.id, error = %e, "extraction failed");
                return Err(e);
            }
        };

        let mut committed = Vec::with_capacity(outcome.candidates.len());
        for candidate in outcome.candidates {
            committed.push(self.store.commit(candidate).await?);
        }

        let status = if outcome.chunks_failed.is_empty() {
            UploadStatus::Success
        } else {
            UploadStatus::PartialSuccess
        };
        let message = match status {
            UploadStatus::Success => format!(
                "extracted and stored {} scope(s) from {}",
                committed.len(),
                file_name
            ),
            UploadStatus::PartialSuccess => format!(
                "extracted and stored {} scope(s) from {}; {} of {} chunks failed and were skipped",
                committed.len(),
                file_name,
                outcome.chunks_failed.len(),
                outcome.chunks_total
            ),
        };
        info!(district = %district.key, document = %document.id, scopes = committed.len(), ?status, "upload committed");

        Ok(UploadReport {
            status,
            message,
            document_id: document.id,
            committed,
            chunks_total: outcome.chunks_total,
            chunks_failed: outcome.chunks_failed.len(),
        })
    }

    /// Ingest with cancellation. An abandoned extraction commits
    /// nothing; re-uploading later is safe because commit only ever
    /// appends a new version.
    pub async fn ingest_document_with_cancel(
        &self,
        district_name: &str,
        file_name: &str,
        uploaded_by: &str,
        report_date: Option<NaiveDate>,
        raw_text: &str,
        cancel: CancellationToken,
    ) -> Result<UploadReport> {
        tokio::select! {
            result = self.ingest_document(district_name, file_name, uploaded_by, report_date, raw_text) => result,
            _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        }
    }

    // =========================================================================
    // Query
    // =========================================================================

    /// Answer a natural-language question grounded in current data.
    ///
    /// A scope with no current extractions returns the canned no-data
    /// answer without invoking the LLM.
    pub async fn answer(&self, question: &str, scope: &QueryScope) -> Result<AnswerResponse> {
        let records = self.store.get_current(scope).await?;
        if records.is_empty() {
            info!(district = %scope.district, "no current data; returning canned answer");
            return Ok(AnswerResponse {
                question: question.to_string(),
                answer: NO_DATA_ANSWER.to_string(),
            });
        }

        let context = serialize_context(&records, self.options.max_context_chars);
        let prompt = format_chat_prompt(&scope.district, &context, question);

        let answer = tokio::time::timeout(
            self.options.llm_timeout,
            self.ai.chat_completion(&prompt),
        )
        .await
        .map_err(|_| {
            PipelineError::Llm(crate::error::LlmError::Timeout {
                seconds: self.options.llm_timeout.as_secs(),
            })
        })??;

        Ok(AnswerResponse {
            question: question.to_string(),
            answer,
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current records for a scope.
    pub async fn current(&self, scope: &QueryScope) -> Result<Vec<ExtractionRecord>> {
        self.store.get_current(scope).await
    }

    /// Full version history for a scope, version ascending.
    pub async fn history(&self, scope: &QueryScope) -> Result<Vec<ExtractionRecord>> {
        self.store.get_history(scope).await
    }

    /// History as a restartable lazy stream.
    pub fn history_stream<'a>(
        &'a self,
        scope: &'a QueryScope,
    ) -> Pin<Box<dyn Stream<Item = Result<ExtractionRecord>> + Send + 'a>> {
        Box::pin(stream! {
            let records = match self.store.get_history(scope).await {
                Ok(records) => records,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            for record in records {
                yield Ok(record);
            }
        })
    }

    /// History joined with document metadata, for the history endpoint.
    pub async fn history_entries(&self, scope: &QueryScope) -> Result<Vec<HistoryEntry>> {
        let records = self.store.get_history(scope).await?;
        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            let document = self.store.get_document(record.document_id).await?;
            let (file_name, uploaded_by) = match document {
                Some(doc) => (doc.file_name, doc.uploaded_by),
                None => {
                    // A record always references a stored document.
                    return Err(PipelineError::Consistency(format!(
                        "extraction {} references missing document {}",
                        record.id, record.document_id
                    )));
                }
            };
            entries.push(HistoryEntry {
                document_id: record.document_id,
                file_name,
                uploaded_by,
                sector: record.sector,
                sub_category: record.sub_category,
                version: record.version,
                is_current: record.is_current,
                created_at: record.created_at,
            });
        }
        Ok(entries)
    }

    /// Distinct sectors and sub-categories present in a district's
    /// current data.
    pub async fn categories(&self, district: &str) -> Result<Vec<(String, Vec<String>)>> {
        let records = self
            .store
            .get_current(&QueryScope::district(district))
            .await?;
        let mut categories: indexmap::IndexMap<String, Vec<String>> = indexmap::IndexMap::new();
        for record in records {
            let subs = categories.entry(record.sector).or_default();
            if !subs.contains(&record.sub_category) {
                subs.push(record.sub_category);
            }
        }
        Ok(categories.into_iter().collect())
    }

    /// Per-sector average achievement for a district's current data.
    pub async fn analytics(&self, district: &str) -> Result<indexmap::IndexMap<String, f64>> {
        let records = self
            .store
            .get_current(&QueryScope::district(district))
            .await?;
        Ok(sector_averages(&records))
    }

    /// Fetch a stored document by id.
    pub async fn document(&self, id: Uuid) -> Result<Option<Document>> {
        self.store.get_document(id).await
    }
}
