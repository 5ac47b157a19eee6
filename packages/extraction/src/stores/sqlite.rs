//! SQLite storage implementation.
//!
//! A file-based storage backend using SQLite. Good for:
//! - Local development
//! - Single-server deployments
//! - Testing with persistent data
//!
//! The single-current invariant is enforced at the storage layer: a
//! partial unique index over `(district, sector, sub-category)` where
//! `is_current = 1` makes a second current row fail the transaction.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{PipelineError, Result};
use crate::schema::category_key;
use crate::traits::store::{DistrictStore, DocumentStore, VersionStore};
use crate::types::{
    document::{district_key, District, Document},
    record::{ActionPoint, ExtractionCandidate, ExtractionRecord, QueryScope},
};

/// SQLite-based scheme store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store with the given connection URL.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - In-memory database (ephemeral)
    /// - `sqlite:./schemes.db?mode=rwc` - Create if not exists
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(storage_err)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    ///
    /// Uses a single connection: every pooled connection to
    /// `sqlite::memory:` would otherwise get its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(storage_err)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS districts (
                key TEXT PRIMARY KEY,
                id TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                district TEXT NOT NULL,
                file_name TEXT NOT NULL,
                uploaded_by TEXT NOT NULL,
                uploaded_at TEXT NOT NULL,
                report_date TEXT,
                raw_text TEXT NOT NULL,
                content_hash TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_district ON documents(district);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS extractions (
                id TEXT PRIMARY KEY,
                district TEXT NOT NULL,
                sector TEXT NOT NULL,
                sub_category TEXT NOT NULL,
                sector_key TEXT NOT NULL,
                sub_category_key TEXT NOT NULL,
                action_points TEXT NOT NULL,
                additional_details TEXT NOT NULL,
                version INTEGER NOT NULL,
                is_current INTEGER NOT NULL,
                document_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_extractions_scope
                ON extractions(district, sector_key, sub_category_key);

            CREATE UNIQUE INDEX IF NOT EXISTS idx_extractions_one_current
                ON extractions(district, sector_key, sub_category_key)
                WHERE is_current = 1;

            CREATE UNIQUE INDEX IF NOT EXISTS idx_extractions_scope_version
                ON extractions(district, sector_key, sub_category_key, version);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn storage_err(e: impl std::error::Error + Send + Sync + 'static) -> PipelineError {
    PipelineError::Storage(Box::new(e))
}

fn parse_uuid(text: &str) -> Result<Uuid> {
    Uuid::parse_str(text).map_err(storage_err)
}

fn parse_timestamp(text: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(storage_err)
}

// Row types for sqlx queries

#[derive(Debug, FromRow)]
struct DistrictRow {
    id: String,
    name: String,
    key: String,
    created_at: String,
}

impl DistrictRow {
    fn into_district(self) -> Result<District> {
        Ok(District {
            id: parse_uuid(&self.id)?,
            name: self.name,
            key: self.key,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    district: String,
    file_name: String,
    uploaded_by: String,
    uploaded_at: String,
    report_date: Option<String>,
    raw_text: String,
    content_hash: String,
}

impl DocumentRow {
    fn into_document(self) -> Result<Document> {
        let report_date = self
            .report_date
            .map(|d| d.parse::<chrono::NaiveDate>().map_err(storage_err))
            .transpose()?;
        Ok(Document {
            id: parse_uuid(&self.id)?,
            district: self.district,
            file_name: self.file_name,
            uploaded_by: self.uploaded_by,
            uploaded_at: parse_timestamp(&self.uploaded_at)?,
            report_date,
            raw_text: self.raw_text,
            content_hash: self.content_hash,
        })
    }
}

#[derive(Debug, FromRow)]
struct ExtractionRow {
    id: String,
    district: String,
    sector: String,
    sub_category: String,
    action_points: String,
    additional_details: String,
    version: i64,
    is_current: i64,
    document_id: String,
    created_at: String,
}

impl ExtractionRow {
    fn into_record(self) -> Result<ExtractionRecord> {
        let action_points: Vec<ActionPoint> =
            serde_json::from_str(&self.action_points).map_err(storage_err)?;
        let additional_details: indexmap::IndexMap<String, String> =
            serde_json::from_str(&self.additional_details).map_err(storage_err)?;
        Ok(ExtractionRecord {
            id: parse_uuid(&self.id)?,
            district: self.district,
            sector: self.sector,
            sub_category: self.sub_category,
            action_points,
            additional_details,
            version: self.version as u32,
            is_current: self.is_current != 0,
            document_id: parse_uuid(&self.document_id)?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

const EXTRACTION_COLUMNS: &str = "id, district, sector, sub_category, action_points, additional_details, version, is_current, document_id, created_at";

/// Build the WHERE clause bindings for a scope.
fn scope_filter(scope: &QueryScope) -> (String, Vec<String>) {
    let mut clause = String::from("district = ?");
    let mut binds = vec![scope.district.clone()];
    if let Some(sector) = &scope.sector {
        clause.push_str(" AND sector_key = ?");
        binds.push(category_key(sector));
    }
    if let Some(sub) = &scope.sub_category {
        clause.push_str(" AND sub_category_key = ?");
        binds.push(category_key(sub));
    }
    (clause, binds)
}

#[async_trait]
impl DistrictStore for SqliteStore {
    async fn get_or_create_district(&self, name: &str) -> Result<District> {
        let district = District::new(name);

        // Insert-if-absent, then read back whichever row won.
        sqlx::query(
            r#"
            INSERT INTO districts (key, id, name, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO NOTHING
            "#,
        )
        .bind(&district.key)
        .bind(district.id.to_string())
        .bind(&district.name)
        .bind(district.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        self.get_district(name).await?.ok_or_else(|| {
            PipelineError::Consistency(format!("district row vanished for \"{name}\""))
        })
    }

    async fn get_district(&self, name: &str) -> Result<Option<District>> {
        let row = sqlx::query_as::<_, DistrictRow>(
            "SELECT id, name, key, created_at FROM districts WHERE key = ?",
        )
        .bind(district_key(name))
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(DistrictRow::into_district).transpose()
    }

    async fn list_districts(&self) -> Result<Vec<District>> {
        let rows = sqlx::query_as::<_, DistrictRow>(
            "SELECT id, name, key, created_at FROM districts ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter().map(DistrictRow::into_district).collect()
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn create_document(&self, document: &Document) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, district, file_name, uploaded_by, uploaded_at, report_date, raw_text, content_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(document.id.to_string())
        .bind(&document.district)
        .bind(&document.file_name)
        .bind(&document.uploaded_by)
        .bind(document.uploaded_at.to_rfc3339())
        .bind(document.report_date.map(|d| d.to_string()))
        .bind(&document.raw_text)
        .bind(&document.content_hash)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, district, file_name, uploaded_by, uploaded_at, report_date, raw_text, content_hash FROM documents WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(DocumentRow::into_document).transpose()
    }

    async fn count_documents(&self, district: &str) -> Result<usize> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE district = ?")
                .bind(district_key(district))
                .fetch_one(&self.pool)
                .await
                .map_err(storage_err)?;

        Ok(count as usize)
    }
}

#[async_trait]
impl VersionStore for SqliteStore {
    async fn commit(&self, mut candidate: ExtractionCandidate) -> Result<ExtractionRecord> {
        candidate.district = district_key(&candidate.district);
        let sector_key = category_key(&candidate.sector);
        let sub_key = category_key(&candidate.sub_category);
        let district = candidate.district.clone();

        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let previous: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT version FROM extractions
            WHERE district = ? AND sector_key = ? AND sub_category_key = ? AND is_current = 1
            "#,
        )
        .bind(&district)
        .bind(&sector_key)
        .bind(&sub_key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage_err)?;

        let next_version = previous.unwrap_or(0) as u32 + 1;
        let record = ExtractionRecord::from_candidate(candidate, next_version);

        // Flip before insert so the partial unique index admits the
        // new current row; both happen in the same transaction.
        sqlx::query(
            r#"
            UPDATE extractions SET is_current = 0
            WHERE district = ? AND sector_key = ? AND sub_category_key = ? AND is_current = 1
            "#,
        )
        .bind(&district)
        .bind(&sector_key)
        .bind(&sub_key)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        let action_points = serde_json::to_string(&record.action_points).map_err(storage_err)?;
        let additional_details =
            serde_json::to_string(&record.additional_details).map_err(storage_err)?;

        sqlx::query(
            r#"
            INSERT INTO extractions
                (id, district, sector, sub_category, sector_key, sub_category_key,
                 action_points, additional_details, version, is_current, document_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.district)
        .bind(&record.sector)
        .bind(&record.sub_category)
        .bind(&sector_key)
        .bind(&sub_key)
        .bind(&action_points)
        .bind(&additional_details)
        .bind(record.version as i64)
        .bind(record.document_id.to_string())
        .bind(record.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            // A unique-index failure here means two current rows raced.
            let invariant = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if invariant {
                PipelineError::Consistency(format!("commit violated version invariant: {e}"))
            } else {
                storage_err(e)
            }
        })?;

        tx.commit().await.map_err(storage_err)?;
        Ok(record)
    }

    async fn get_current(&self, scope: &QueryScope) -> Result<Vec<ExtractionRecord>> {
        let (clause, binds) = scope_filter(scope);
        let sql = format!(
            "SELECT {EXTRACTION_COLUMNS} FROM extractions WHERE {clause} AND is_current = 1 ORDER BY sector_key, sub_category_key"
        );

        let mut query = sqlx::query_as::<_, ExtractionRow>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(storage_err)?;

        rows.into_iter().map(ExtractionRow::into_record).collect()
    }

    async fn get_history(&self, scope: &QueryScope) -> Result<Vec<ExtractionRecord>> {
        let (clause, binds) = scope_filter(scope);
        let sql = format!(
            "SELECT {EXTRACTION_COLUMNS} FROM extractions WHERE {clause} ORDER BY sector_key, sub_category_key, version"
        );

        let mut query = sqlx::query_as::<_, ExtractionRow>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(storage_err)?;

        rows.into_iter().map(ExtractionRow::into_record).collect()
    }
}
