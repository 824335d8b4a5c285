//! SQLite-backed risk store
//!
//! Deduplication is enforced by the `UNIQUE (source, external_id)` constraint:
//! `create_if_absent` inserts with `ON CONFLICT DO NOTHING` and reports
//! whether a row was written, so concurrent or repeated calls for the same
//! incident can never produce a second record.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use riskwatch_core::{CreateOutcome, RiskSink};
use riskwatch_domain::{Result as DomainResult, Risk, RiskWatchError, StoredRisk};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;
use tracing::debug;
use uuid::Uuid;

use super::manager::{map_sql_error, DbManager};
use crate::errors::InfraError;

/// SQLite implementation of [`RiskSink`]
pub struct SqliteRiskRepository {
    db: Arc<DbManager>,
}

impl SqliteRiskRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Number of stored risks.
    pub async fn count(&self) -> DomainResult<u64> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<u64> {
            let conn = db.get_connection()?;
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM risks", params![], |row| row.get(0))
                .map_err(map_sql_error)?;
            Ok(u64::try_from(count).unwrap_or_default())
        })
        .await
        .map_err(map_join_error)?
    }

    /// Look up the risk created for an incident.
    pub async fn find_by_external_id(
        &self,
        source: &str,
        external_id: &str,
    ) -> DomainResult<Option<StoredRisk>> {
        let db = Arc::clone(&self.db);
        let source = source.to_string();
        let external_id = external_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<StoredRisk>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT id, title, description, impact, probability, source, external_id,
                        tags, created_at
                 FROM risks WHERE source = ?1 AND external_id = ?2",
                params![source, external_id],
                map_risk_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    /// Most recently created risks, newest first.
    pub async fn list_recent(&self, limit: usize) -> DomainResult<Vec<StoredRisk>> {
        let db = Arc::clone(&self.db);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        task::spawn_blocking(move || -> DomainResult<Vec<StoredRisk>> {
            let conn = db.get_connection()?;
            query_recent(&conn, limit).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl RiskSink for SqliteRiskRepository {
    async fn create_if_absent(&self, risk: &Risk) -> DomainResult<CreateOutcome> {
        let db = Arc::clone(&self.db);
        let risk = risk.clone();

        task::spawn_blocking(move || -> DomainResult<CreateOutcome> {
            let conn = db.get_connection()?;
            let inserted = insert_if_absent(&conn, &risk, Utc::now()).map_err(map_sql_error)?;

            if inserted == 0 {
                debug!(source = %risk.source, external_id = %risk.external_id, "risk row exists");
                Ok(CreateOutcome::AlreadyExists)
            } else {
                Ok(CreateOutcome::Created)
            }
        })
        .await
        .map_err(map_join_error)?
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn insert_if_absent(
    conn: &Connection,
    risk: &Risk,
    created_at: DateTime<Utc>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO risks (id, title, description, impact, probability, source, external_id,
                            tags, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT (source, external_id) DO NOTHING",
        params![
            Uuid::now_v7().to_string(),
            risk.title,
            risk.description,
            risk.impact,
            risk.probability,
            risk.source,
            risk.external_id,
            risk.tags_csv(),
            created_at.timestamp_millis(),
        ],
    )
}

fn query_recent(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<StoredRisk>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, impact, probability, source, external_id,
                tags, created_at
         FROM risks ORDER BY created_at DESC, id DESC LIMIT ?1",
    )?;
    let mut risks = Vec::new();
    for row in stmt.query_map(params![limit], map_risk_row)? {
        risks.push(row?);
    }
    Ok(risks)
}

fn map_risk_row(row: &Row<'_>) -> rusqlite::Result<StoredRisk> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
    })?;
    let tags: String = row.get(7)?;
    let created_ms: i64 = row.get(8)?;
    let created_at = DateTime::from_timestamp_millis(created_ms)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(8, created_ms))?;

    Ok(StoredRisk {
        id,
        risk: Risk {
            title: row.get(1)?,
            description: row.get(2)?,
            impact: row.get(3)?,
            probability: row.get(4)?,
            source: row.get(5)?,
            external_id: row.get(6)?,
            tags: Risk::parse_tags_csv(&tags),
        },
        created_at,
    })
}

fn map_join_error(err: task::JoinError) -> RiskWatchError {
    InfraError::from(err).into()
}

#[cfg(test)]
mod tests {
    use riskwatch_domain::RiskTag;
    use tempfile::TempDir;

    use super::*;

    fn setup_test_db() -> (SqliteRiskRepository, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db = DbManager::new(temp_dir.path().join("risks.db"), 2).expect("manager created");
        db.run_migrations().expect("migrations run");
        (SqliteRiskRepository::new(Arc::new(db)), temp_dir)
    }

    fn risk(source: &str, external_id: &str) -> Risk {
        Risk {
            title: format!("Incident: {external_id}"),
            description: "credential exposure".into(),
            impact: 4,
            probability: 5,
            source: source.into(),
            external_id: external_id.into(),
            tags: vec![RiskTag::Incident, RiskTag::Automated],
        }
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let (repo, _dir) = setup_test_db();

        let outcome = repo.create_if_absent(&risk("sentinel", "case_1")).await.unwrap();
        assert_eq!(outcome, CreateOutcome::Created);

        let stored = repo.find_by_external_id("sentinel", "case_1").await.unwrap().unwrap();
        assert_eq!(stored.risk, risk("sentinel", "case_1"));
        assert_eq!(stored.id.get_version_num(), 7);
    }

    #[tokio::test]
    async fn test_second_create_is_a_duplicate() {
        let (repo, _dir) = setup_test_db();

        repo.create_if_absent(&risk("sentinel", "case_1")).await.unwrap();
        let first = repo.find_by_external_id("sentinel", "case_1").await.unwrap().unwrap();

        let outcome = repo.create_if_absent(&risk("sentinel", "case_1")).await.unwrap();
        assert_eq!(outcome, CreateOutcome::AlreadyExists);
        assert_eq!(repo.count().await.unwrap(), 1);

        let after = repo.find_by_external_id("sentinel", "case_1").await.unwrap().unwrap();
        assert_eq!(after.id, first.id, "existing row must be left untouched");
    }

    #[tokio::test]
    async fn test_same_external_id_from_other_source_is_distinct() {
        let (repo, _dir) = setup_test_db();

        repo.create_if_absent(&risk("sentinel", "case_1")).await.unwrap();
        let outcome = repo.create_if_absent(&risk("splunk", "case_1")).await.unwrap();

        assert_eq!(outcome, CreateOutcome::Created);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let (repo, _dir) = setup_test_db();
        assert!(repo.find_by_external_id("sentinel", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_recent_respects_limit() {
        let (repo, _dir) = setup_test_db();
        for n in 0..3 {
            repo.create_if_absent(&risk("sentinel", &format!("case_{n}"))).await.unwrap();
        }

        let recent = repo.list_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_schema_surfaces_database_error() {
        let temp_dir = TempDir::new().unwrap();
        let db = DbManager::new(temp_dir.path().join("empty.db"), 1).unwrap();
        let repo = SqliteRiskRepository::new(Arc::new(db));

        let err = repo.create_if_absent(&risk("sentinel", "case_1")).await.unwrap_err();
        assert!(matches!(err, RiskWatchError::Database(_)));
    }
}
