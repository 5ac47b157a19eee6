//! Versioned extraction records - the structured output of the pipeline.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::document::district_key;

/// One trackable scheme-level item inside a sub-category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPoint {
    pub action_name: String,

    pub current_status: Option<String>,

    /// Percent achieved, in [0, 100] once validated
    pub achievement_percentage: Option<f64>,

    pub data_source: Option<String>,

    pub remarks: Option<String>,
}

impl ActionPoint {
    /// Create a new action point with only a name.
    pub fn new(action_name: impl Into<String>) -> Self {
        Self {
            action_name: action_name.into(),
            current_status: None,
            achievement_percentage: None,
            data_source: None,
            remarks: None,
        }
    }

    /// Set the current status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.current_status = Some(status.into());
        self
    }

    /// Set the achievement percentage.
    pub fn with_achievement(mut self, percentage: f64) -> Self {
        self.achievement_percentage = Some(percentage);
        self
    }

    /// Set the data source.
    pub fn with_data_source(mut self, source: impl Into<String>) -> Self {
        self.data_source = Some(source.into());
        self
    }

    /// Set the remarks.
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }
}

/// Validated, uncommitted extraction output for one
/// (district, sector, sub-category) scope.
///
/// Produced by the orchestrator; the version store turns it into an
/// [`ExtractionRecord`] on commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionCandidate {
    /// District key form
    pub district: String,

    /// Canonical sector name from the registry vocabulary
    pub sector: String,

    /// Canonical sub-category name
    pub sub_category: String,

    pub action_points: Vec<ActionPoint>,

    /// Free-form key/value detail captured beyond the action point fields
    pub additional_details: IndexMap<String, String>,

    /// The upload this extraction came from
    pub document_id: Uuid,
}

impl ExtractionCandidate {
    /// An information-only candidate carries details but no action points.
    pub fn is_information_only(&self) -> bool {
        self.action_points.is_empty()
    }
}

/// A committed, versioned extraction for one scope.
///
/// Exactly one record per scope is current at any time; superseded
/// records keep their data and flip `is_current` off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub id: Uuid,

    pub district: String,

    pub sector: String,

    pub sub_category: String,

    pub action_points: Vec<ActionPoint>,

    pub additional_details: IndexMap<String, String>,

    /// Monotonically increasing per scope, starting at 1
    pub version: u32,

    pub is_current: bool,

    pub document_id: Uuid,

    pub created_at: DateTime<Utc>,
}

impl ExtractionRecord {
    /// Build the first or next version of a record from a candidate.
    ///
    /// Only the version store should call this; it owns `version` and
    /// `is_current`.
    pub fn from_candidate(candidate: ExtractionCandidate, version: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            district: candidate.district,
            sector: candidate.sector,
            sub_category: candidate.sub_category,
            action_points: candidate.action_points,
            additional_details: candidate.additional_details,
            version,
            is_current: true,
            document_id: candidate.document_id,
            created_at: Utc::now(),
        }
    }
}

/// Read scope: a district, optionally narrowed to a sector or further
/// to one sub-category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryScope {
    /// District key form
    pub district: String,

    pub sector: Option<String>,

    pub sub_category: Option<String>,
}

impl QueryScope {
    /// Scope covering a whole district.
    pub fn district(name: impl Into<String>) -> Self {
        Self {
            district: district_key(&name.into()),
            sector: None,
            sub_category: None,
        }
    }

    /// Narrow to one sector.
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// Narrow to one sub-category (requires a sector).
    pub fn with_sub_category(mut self, sub_category: impl Into<String>) -> Self {
        self.sub_category = Some(sub_category.into());
        self
    }
}

/// Outcome classification for one document upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadStatus {
    /// Every chunk extracted and committed
    Success,

    /// Some chunks failed; committed data covers the rest (best effort)
    PartialSuccess,
}

/// What one document upload produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReport {
    pub status: UploadStatus,

    pub message: String,

    pub document_id: Uuid,

    /// Records committed for this upload, one per scope touched
    pub committed: Vec<ExtractionRecord>,

    pub chunks_total: usize,

    pub chunks_failed: usize,
}

/// Query endpoint contract: the question together with the grounded answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub question: String,
    pub answer: String,
}

/// History endpoint contract: one version with its originating upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub document_id: Uuid,
    pub file_name: String,
    pub uploaded_by: String,
    pub sector: String,
    pub sub_category: String,
    pub version: u32,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
}
