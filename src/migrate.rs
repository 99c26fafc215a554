use anyhow::Result;
use sqlx::SqlitePool;

/// Creates the `cigar_lines` table if it is missing. Safe to run on every start.
///
/// `body` holds the record content as JSON. `natural_key` is the JSON text of
/// `[brand_name, line_name]` and is what upserts conflict on; `brand_name`
/// and `line_name` are copied out of the body for filtering.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cigar_lines (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            natural_key TEXT NOT NULL UNIQUE,
            brand_name TEXT,
            line_name TEXT,
            revision INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            body TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
