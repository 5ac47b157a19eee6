//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::{PipelineError, Result};
use crate::schema::category_key;
use crate::traits::store::{DistrictStore, DocumentStore, VersionStore};
use crate::types::{
    document::{district_key, District, Document},
    record::{ExtractionCandidate, ExtractionRecord, QueryScope},
};

/// Scope key: (district key, sector key, sub-category key).
type ScopeKey = (String, String, String);

/// In-memory store for districts, documents, and extractions.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart. Commits serialize on the extraction
/// write lock, which makes them trivially linearizable per scope.
pub struct MemoryStore {
    districts: RwLock<HashMap<String, District>>,
    documents: RwLock<HashMap<Uuid, Document>>,
    extractions: RwLock<HashMap<ScopeKey, Vec<ExtractionRecord>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            districts: RwLock::new(HashMap::new()),
            documents: RwLock::new(HashMap::new()),
            extractions: RwLock::new(HashMap::new()),
        }
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.districts.write().unwrap().clear();
        self.documents.write().unwrap().clear();
        self.extractions.write().unwrap().clear();
    }

    /// Number of stored districts.
    pub fn district_count(&self) -> usize {
        self.districts.read().unwrap().len()
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    /// Total extraction rows across all scopes and versions.
    pub fn extraction_count(&self) -> usize {
        self.extractions.read().unwrap().values().map(Vec::len).sum()
    }

    fn scope_key(candidate: &ExtractionCandidate) -> ScopeKey {
        (
            district_key(&candidate.district),
            category_key(&candidate.sector),
            category_key(&candidate.sub_category),
        )
    }

    fn matches(scope: &QueryScope, key: &ScopeKey) -> bool {
        if key.0 != scope.district {
            return false;
        }
        if let Some(sector) = &scope.sector {
            if key.1 != category_key(sector) {
                return false;
            }
        }
        if let Some(sub) = &scope.sub_category {
            if key.2 != category_key(sub) {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl DistrictStore for MemoryStore {
    async fn get_or_create_district(&self, name: &str) -> Result<District> {
        let key = district_key(name);
        let mut districts = self.districts.write().unwrap();
        Ok(districts
            .entry(key)
            .or_insert_with(|| District::new(name))
            .clone())
    }

    async fn get_district(&self, name: &str) -> Result<Option<District>> {
        Ok(self
            .districts
            .read()
            .unwrap()
            .get(&district_key(name))
            .cloned())
    }

    async fn list_districts(&self) -> Result<Vec<District>> {
        let mut districts: Vec<District> =
            self.districts.read().unwrap().values().cloned().collect();
        districts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(districts)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_document(&self, document: &Document) -> Result<()> {
        self.documents
            .write()
            .unwrap()
            .insert(document.id, document.clone());
        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
        Ok(self.documents.read().unwrap().get(&id).cloned())
    }

    async fn count_documents(&self, district: &str) -> Result<usize> {
        let key = district_key(district);
        Ok(self
            .documents
            .read()
            .unwrap()
            .values()
            .filter(|d| d.district == key)
            .count())
    }
}

#[async_trait]
impl VersionStore for MemoryStore {
    async fn commit(&self, mut candidate: ExtractionCandidate) -> Result<ExtractionRecord> {
        candidate.district = district_key(&candidate.district);
        let key = Self::scope_key(&candidate);
        let mut extractions = self.extractions.write().unwrap();
        let chain = extractions.entry(key).or_default();

        let currents: Vec<usize> = chain
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_current)
            .map(|(i, _)| i)
            .collect();
        if currents.len() > 1 {
            return Err(PipelineError::Consistency(format!(
                "{} current rows for scope {}/{}/{}",
                currents.len(),
                candidate.district,
                candidate.sector,
                candidate.sub_category
            )));
        }

        let next_version = chain.iter().map(|r| r.version).max().unwrap_or(0) + 1;
        let record = ExtractionRecord::from_candidate(candidate, next_version);

        // Flip and insert under the same write lock: readers never see
        // zero or two current rows for a scope that has data.
        if let Some(i) = currents.first() {
            chain[*i].is_current = false;
        }
        chain.push(record.clone());

        Ok(record)
    }

    async fn get_current(&self, scope: &QueryScope) -> Result<Vec<ExtractionRecord>> {
        let extractions = self.extractions.read().unwrap();
        let mut records: Vec<ExtractionRecord> = extractions
            .iter()
            .filter(|(key, _)| Self::matches(scope, key))
            .flat_map(|(_, chain)| chain.iter().filter(|r| r.is_current).cloned())
            .collect();
        records.sort_by(|a, b| {
            (category_key(&a.sector), category_key(&a.sub_category))
                .cmp(&(category_key(&b.sector), category_key(&b.sub_category)))
        });
        Ok(records)
    }

    async fn get_history(&self, scope: &QueryScope) -> Result<Vec<ExtractionRecord>> {
        let extractions = self.extractions.read().unwrap();
        let mut records: Vec<ExtractionRecord> = extractions
            .iter()
            .filter(|(key, _)| Self::matches(scope, key))
            .flat_map(|(_, chain)| chain.iter().cloned())
            .collect();
        records.sort_by(|a, b| {
            (
                category_key(&a.sector),
                category_key(&a.sub_category),
                a.version,
            )
                .cmp(&(
                    category_key(&b.sector),
                    category_key(&b.sub_category),
                    b.version,
                ))
        });
        Ok(records)
    }
}
