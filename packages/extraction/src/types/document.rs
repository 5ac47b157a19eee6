//! Districts and the immutable documents uploaded for them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Canonical key form of a district name.
///
/// Districts are case-normalized: "  West  Kameng " and "west kameng"
/// are the same district.
pub fn district_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Top-level partition of all data; one administrative region.
///
/// Created on first upload or explicit registration. Never deleted —
/// a district only accumulates documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct District {
    pub id: Uuid,

    /// Display name as first supplied
    pub name: String,

    /// Case-normalized lookup key
    pub key: String,

    pub created_at: DateTime<Utc>,
}

impl District {
    /// Create a new district from a display name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let key = district_key(&name);
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            key,
            created_at: Utc::now(),
        }
    }
}

/// Immutable record of one upload.
///
/// Retained even when extraction fails, so every upload attempt stays
/// auditable. The raw text is what the external text-extraction
/// collaborator produced; the core never re-reads the original file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,

    /// Owning district, key form
    pub district: String,

    /// Original filename as uploaded
    pub file_name: String,

    pub uploaded_by: String,

    pub uploaded_at: DateTime<Utc>,

    /// Reporting date declared by the uploader, if any
    pub report_date: Option<NaiveDate>,

    /// Raw extracted text
    pub raw_text: String,

    /// SHA-256 of the raw text, for audit and duplicate spotting
    pub content_hash: String,
}

impl Document {
    /// Create a new document for a district.
    pub fn new(
        district: impl Into<String>,
        file_name: impl Into<String>,
        uploaded_by: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        let raw_text = raw_text.into();
        let content_hash = content_hash(&raw_text);
        Self {
            id: Uuid::new_v4(),
            district: district_key(&district.into()),
            file_name: file_name.into(),
            uploaded_by: uploaded_by.into(),
            uploaded_at: Utc::now(),
            report_date: None,
            raw_text,
            content_hash,
        }
    }

    /// Attach the uploader-declared reporting date.
    pub fn with_report_date(mut self, date: NaiveDate) -> Self {
        self.report_date = Some(date);
        self
    }
}

/// SHA-256 hex digest of document text.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A district together with its upload count, for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictInfo {
    pub district: District,
    pub document_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_district_key_normalization() {
        assert_eq!(district_key("  West  Kameng "), "west kameng");
        assert_eq!(district_key("TAWANG"), "tawang");
        assert_eq!(district_key("west kameng"), district_key("West\tKameng"));
    }

    #[test]
    fn test_document_hash_is_stable() {
        let a = Document::new("Tawang", "report.pdf", "dc_office", "Some text");
        let b = Document::new("Tawang", "report2.pdf", "dc_office", "Some text");
        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.id, b.id);
        assert_eq!(a.district, "tawang");
    }
}
