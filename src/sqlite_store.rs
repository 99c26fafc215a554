//! SQLite-backed [`Store`] implementation.
//!
//! Each cigar line is one row of `cigar_lines` whose `body` column holds the
//! record content as JSON, so the table behaves like a document collection.
//! Upserts are a single `INSERT ... ON CONFLICT(natural_key) DO UPDATE ...
//! RETURNING` statement: SQLite resolves the match and the write atomically,
//! and the returned revision tells inserts (0) from updates (>= 1) exactly.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use cigar_api_core::models::{CigarLine, CigarLineFields};
use cigar_api_core::store::{Store, StoreError, UpsertAction, Upserted};

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Maps connection-level failures to [`StoreError::Unavailable`], everything
/// else to [`StoreError::Backend`].
fn map_sqlx(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
        _ => StoreError::Backend(err.to_string()),
    }
}

fn row_to_line(row: &SqliteRow) -> Result<CigarLine, StoreError> {
    let id: String = row.try_get("id").map_err(map_sqlx)?;
    let revision: i64 = row.try_get("revision").map_err(map_sqlx)?;
    let body: String = row.try_get("body").map_err(map_sqlx)?;

    let fields = serde_json::from_str(&body).map_err(|source| StoreError::Corrupt {
        id: id.clone(),
        source,
    })?;

    Ok(CigarLine {
        id,
        fields,
        revision,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn list_all(&self) -> Result<Vec<CigarLine>, StoreError> {
        let rows = sqlx::query("SELECT id, revision, body FROM cigar_lines ORDER BY seq")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        rows.iter().map(row_to_line).collect()
    }

    async fn list_by_brand(&self, brand_name: &str) -> Result<Vec<CigarLine>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, revision, body FROM cigar_lines WHERE brand_name = ? ORDER BY seq",
        )
        .bind(brand_name)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(row_to_line).collect()
    }

    async fn upsert_one(&self, fields: &CigarLineFields) -> Result<Upserted, StoreError> {
        let body = serde_json::to_string(fields)
            .map_err(|e| StoreError::Backend(format!("failed to encode cigar line: {}", e)))?;
        let now = Utc::now().timestamp();

        let row = sqlx::query(
            r#"
            INSERT INTO cigar_lines (id, natural_key, brand_name, line_name,
                                     revision, created_at, updated_at, body)
            VALUES (?, ?, ?, ?, 0, ?, ?, ?)
            ON CONFLICT(natural_key) DO UPDATE SET
                brand_name = excluded.brand_name,
                line_name = excluded.line_name,
                revision = cigar_lines.revision + 1,
                updated_at = excluded.updated_at,
                body = excluded.body
            RETURNING id, revision, body
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(fields.natural_key_text())
        .bind(&fields.brand_name)
        .bind(&fields.line_name)
        .bind(now)
        .bind(now)
        .bind(&body)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        let line = row_to_line(&row)?;
        let action = if line.revision == 0 {
            UpsertAction::Inserted
        } else {
            UpsertAction::Updated
        };

        Ok(Upserted { line, action })
    }
}
