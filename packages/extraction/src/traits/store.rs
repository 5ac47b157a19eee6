//! Storage traits for districts, documents, and versioned extractions.
//!
//! The storage layer is split into focused traits:
//! - `DistrictStore`: the district partition registry
//! - `DocumentStore`: immutable upload records
//! - `VersionStore`: the version manager - sole mutator of `version`
//!   and `is_current`
//! - `SchemeStore`: composite trait combining all three
//!
//! The single-current invariant is enforced *inside* implementations
//! (write lock or transaction plus a storage-level constraint), not by
//! callers: a reader must never observe zero or two current rows for
//! a scope that has data.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{
    document::{District, Document},
    record::{ExtractionCandidate, ExtractionRecord, QueryScope},
};

/// Registry of district partitions.
#[async_trait]
pub trait DistrictStore: Send + Sync {
    /// Look up a district by name, creating it on first use.
    async fn get_or_create_district(&self, name: &str) -> Result<District>;

    /// Look up a district by name without creating it.
    async fn get_district(&self, name: &str) -> Result<Option<District>>;

    /// All districts, sorted by name.
    async fn list_districts(&self) -> Result<Vec<District>>;
}

/// Immutable upload records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new document. Documents are never mutated.
    async fn create_document(&self, document: &Document) -> Result<()>;

    /// Fetch a document by id.
    async fn get_document(&self, id: Uuid) -> Result<Option<Document>>;

    /// Number of documents uploaded for a district (key form).
    async fn count_documents(&self, district: &str) -> Result<usize>;
}

/// The version manager.
///
/// `commit` is linearizable per (district, sector, sub-category) scope:
/// concurrent commits for the same scope serialize, so versions are
/// strictly increasing and never collide. Commits for different scopes
/// are independent.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Commit a candidate as the next version of its scope.
    ///
    /// Atomically: assigns `version = current + 1` (or 1), inserts the
    /// new row as current, and flips the prior current row off. Rows
    /// are never deleted; history only grows.
    async fn commit(&self, candidate: ExtractionCandidate) -> Result<ExtractionRecord>;

    /// Current records in a scope (sub-category > sector > district).
    async fn get_current(&self, scope: &QueryScope) -> Result<Vec<ExtractionRecord>>;

    /// Every record in a scope, ordered by (sector, sub-category) and
    /// then version ascending. Append-only; never compacted.
    async fn get_history(&self, scope: &QueryScope) -> Result<Vec<ExtractionRecord>>;
}

/// Composite storage trait combining all three relations.
pub trait SchemeStore: DistrictStore + DocumentStore + VersionStore {}

// Blanket implementation: anything implementing all three is a SchemeStore
impl<T: DistrictStore + DocumentStore + VersionStore> SchemeStore for T {}
