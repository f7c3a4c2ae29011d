//! SQLite-backed report store.
//!
//! Timestamps are stored as RFC3339 text and entities as JSON text. A unique
//! partial index over `fingerprint` for canonical rows makes the atomic
//! fingerprint insert hold across processes sharing one database file.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use super::{ReportStore, StatusUpdate, StoreResult};
use crate::errors::StoreError;
use crate::model::{Entities, Report, ReportStatus, Submitter, Urgency};

const COLUMNS: &str = "id, title, description, submitter_name, submitter_email, category, \
     urgency, entities, confidence, analysis_result, status, organization, fingerprint, \
     duplicate_of, duplicate_count, submitted_at, resolved_at";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `url`, e.g. `sqlite://reports.db`.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let url = if url.contains('?') || url.contains(":memory:") {
            url.to_string()
        } else {
            format!("{url}?mode=rwc")
        };
        debug!("Connecting to report database: {}", url);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&url)
            .await?;
        Self::from_pool(pool).await
    }

    /// Private in-memory database; a single connection keeps it alive.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        init_tables(&pool).await?;
        Ok(Self { pool })
    }
}

async fn init_tables(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reports (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            submitter_name TEXT,
            submitter_email TEXT,
            category TEXT NOT NULL,
            urgency TEXT NOT NULL,
            entities TEXT NOT NULL DEFAULT '{}',
            confidence REAL,
            analysis_result TEXT,
            status TEXT NOT NULL,
            organization TEXT,
            fingerprint TEXT NOT NULL,
            duplicate_of TEXT REFERENCES reports(id),
            duplicate_count INTEGER NOT NULL DEFAULT 0,
            submitted_at TEXT NOT NULL,
            resolved_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_reports_canonical_fingerprint
            ON reports(fingerprint) WHERE duplicate_of IS NULL
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reports_organization ON reports(organization)")
        .execute(pool)
        .await?;

    info!("Report tables initialized");
    Ok(())
}

fn ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_ts(id: &str, raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            id: id.to_string(),
            reason: format!("bad timestamp `{raw}`: {e}"),
        })
}

fn map_insert_error(err: sqlx::Error, report: &Report) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return if db.message().contains("reports.id") {
                StoreError::IdTaken(report.id.clone())
            } else {
                StoreError::FingerprintTaken(report.fingerprint.clone())
            };
        }
    }
    StoreError::Database(err)
}

fn row_to_report(row: &SqliteRow) -> StoreResult<Report> {
    let id: String = row.try_get("id")?;
    let corrupt = |reason: String| StoreError::Corrupt {
        id: id.clone(),
        reason,
    };

    let status: String = row.try_get("status")?;
    let status = status.parse::<ReportStatus>().map_err(&corrupt)?;
    let urgency: String = row.try_get("urgency")?;
    let urgency = urgency.parse::<Urgency>().map_err(&corrupt)?;
    let entities: String = row.try_get("entities")?;
    let entities: Entities = serde_json::from_str(&entities)
        .map_err(|e| corrupt(format!("bad entities json: {e}")))?;

    let name: Option<String> = row.try_get("submitter_name")?;
    let email: Option<String> = row.try_get("submitter_email")?;
    let submitter = if name.is_none() && email.is_none() {
        None
    } else {
        Some(Submitter { name, email })
    };

    let confidence: Option<f64> = row.try_get("confidence")?;
    let duplicate_count: i64 = row.try_get("duplicate_count")?;
    let submitted_at: String = row.try_get("submitted_at")?;
    let resolved_at: Option<String> = row.try_get("resolved_at")?;

    Ok(Report {
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        submitter,
        category: row.try_get("category")?,
        urgency,
        entities,
        confidence: confidence.map(|c| c as f32),
        analysis_result: row.try_get("analysis_result")?,
        status,
        organization: row.try_get("organization")?,
        fingerprint: row.try_get("fingerprint")?,
        duplicate_of: row.try_get("duplicate_of")?,
        duplicate_count: u32::try_from(duplicate_count).unwrap_or(0),
        submitted_at: parse_ts(&id, &submitted_at)?,
        resolved_at: resolved_at.map(|r| parse_ts(&id, &r)).transpose()?,
        id,
    })
}

#[async_trait]
impl ReportStore for SqliteStore {
    async fn insert(&self, report: &Report) -> StoreResult<()> {
        let entities = serde_json::to_string(&report.entities).map_err(|e| StoreError::Corrupt {
            id: report.id.clone(),
            reason: format!("entities not serializable: {e}"),
        })?;
        let (name, email) = match &report.submitter {
            Some(s) => (s.name.clone(), s.email.clone()),
            None => (None, None),
        };

        sqlx::query(&format!(
            "INSERT INTO reports ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&report.id)
        .bind(&report.title)
        .bind(&report.description)
        .bind(name)
        .bind(email)
        .bind(&report.category)
        .bind(report.urgency.as_str())
        .bind(entities)
        .bind(report.confidence.map(f64::from))
        .bind(&report.analysis_result)
        .bind(report.status.as_str())
        .bind(&report.organization)
        .bind(&report.fingerprint)
        .bind(&report.duplicate_of)
        .bind(i64::from(report.duplicate_count))
        .bind(ts(report.submitted_at))
        .bind(report.resolved_at.map(ts))
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, report))?;
        Ok(())
    }

    async fn find_by_fingerprint(&self, fingerprint: &str) -> StoreResult<Option<Report>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM reports WHERE fingerprint = ? AND duplicate_of IS NULL"
        ))
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_report).transpose()
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Report>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM reports WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_report).transpose()
    }

    async fn update_status(&self, id: &str, update: StatusUpdate) -> StoreResult<Report> {
        let mut tx = self.pool.begin().await?;

        let done = sqlx::query(
            r#"
            UPDATE reports
               SET status = ?,
                   organization = COALESCE(?, organization),
                   resolved_at = COALESCE(resolved_at, ?)
             WHERE id = ?
            "#,
        )
        .bind(update.status.as_str())
        .bind(update.organization)
        .bind(update.resolved_at.map(ts))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if done.rows_affected() == 0 {
            return Err(StoreError::Missing(id.to_string()));
        }

        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM reports WHERE id = ?"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        let report = row_to_report(&row)?;
        tx.commit().await?;
        Ok(report)
    }

    async fn increment_duplicates(&self, id: &str) -> StoreResult<u32> {
        let count: Option<i64> = sqlx::query_scalar(
            "UPDATE reports SET duplicate_count = duplicate_count + 1 WHERE id = ? RETURNING duplicate_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        count
            .map(|c| u32::try_from(c).unwrap_or(u32::MAX))
            .ok_or_else(|| StoreError::Missing(id.to_string()))
    }

    async fn scan(&self) -> StoreResult<Vec<Report>> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM reports"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_report).collect()
    }
}
