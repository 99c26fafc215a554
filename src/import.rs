//! Batch upsert from a JSON file (`cigar-api import <file>`).
//!
//! Runs the same per-item cast-and-upsert as `POST /api/v1/cigars/lines/batch`,
//! but against the configured database directly. Unlike `serve`, an
//! unreachable database is a hard error here.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::info;

use cigar_api_core::batch::{upsert_batch, BatchItemResult, NOT_AN_ARRAY_MESSAGE};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Imports the cigar lines in `path` and returns the per-item results.
pub async fn import_file(config: &Config, path: &Path) -> Result<Vec<BatchItemResult>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    let payload: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse import file as JSON: {}", path.display()))?;

    let items = match payload {
        Value::Array(items) => items,
        _ => bail!(NOT_AN_ARRAY_MESSAGE),
    };

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);

    info!(file = %path.display(), items = items.len(), "importing cigar lines");
    let results = upsert_batch(&store, &items).await;

    store.pool().close().await;
    Ok(results)
}

/// CLI entry point: imports and prints the results as pretty JSON.
pub async fn run_import(config: &Config, path: &Path) -> Result<()> {
    let results = import_file(config, path).await?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
