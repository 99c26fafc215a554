use anyhow::{bail, Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::Config;
use crate::migrate;

/// Opens the SQLite pool named by `[db].url` and bootstraps the schema.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let url = config
        .db
        .url
        .as_deref()
        .context("no database url configured (set [db].url or CIGAR_API_DB_URL)")?;

    if !url.starts_with("sqlite:") {
        bail!("invalid database url: {} (expected a sqlite: url)", url);
    }

    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("invalid database url: {}", url))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    // Ensure parent directory exists
    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory: {}", parent.display())
            })?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open database: {}", url))?;

    migrate::ensure_schema(&pool).await?;

    Ok(pool)
}
