//! Batch upsert engine.
//!
//! Shared by `POST /api/v1/cigars/lines/batch` and `cigar-api import`. Items
//! are cast and upserted one at a time in input order. A failing item is
//! recorded in its result slot and never stops the rest of the batch.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::CigarLineFields;
use crate::store::{Store, StoreError, UpsertAction, Upserted};

/// Message returned when a batch payload is not a JSON array.
pub const NOT_AN_ARRAY_MESSAGE: &str = "Request body must be an array of cigar line objects.";

/// Label used in error results when the item carries no usable `line_name`.
const UNKNOWN_LINE: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Success,
    Error,
}

/// Outcome of one batch item, in the wire shape `{status, line, action?, message?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItemResult {
    pub status: ItemStatus,
    /// Stored `line_name` on success (`null` if the record has none); the
    /// submitted `line_name` or `"unknown"` on error.
    pub line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<UpsertAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BatchItemResult {
    fn success(upserted: Upserted) -> Self {
        Self {
            status: ItemStatus::Success,
            line: upserted.line.fields.line_name,
            action: Some(upserted.action),
            message: None,
        }
    }

    fn failure(item: &Value, err: &ItemError) -> Self {
        Self {
            status: ItemStatus::Error,
            line: Some(submitted_line_name(item)),
            action: None,
            message: Some(err.to_string()),
        }
    }
}

/// Why a single batch item failed.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Cast(#[from] crate::cast::CastError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Label for a failed item: any truthy scalar `line_name`, as text.
fn submitted_line_name(item: &Value) -> String {
    match item.get("line_name") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        Some(Value::Bool(true)) => true.to_string(),
        _ => UNKNOWN_LINE.to_string(),
    }
}

/// Casts one JSON item and upserts it.
pub async fn upsert_item(store: &dyn Store, item: &Value) -> Result<Upserted, ItemError> {
    let fields = CigarLineFields::cast(item)?;
    Ok(store.upsert_one(&fields).await?)
}

/// Upserts every item in order and returns one result per item.
pub async fn upsert_batch(store: &dyn Store, items: &[Value]) -> Vec<BatchItemResult> {
    let mut results = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        match upsert_item(store, item).await {
            Ok(upserted) => results.push(BatchItemResult::success(upserted)),
            Err(err) => {
                warn!(index, error = %err, "batch item failed");
                results.push(BatchItemResult::failure(item, &err));
            }
        }
    }

    let failed = results
        .iter()
        .filter(|r| r.status == ItemStatus::Error)
        .count();
    info!(total = items.len(), failed, "batch upsert finished");

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use crate::store::unavailable::UnavailableStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_empty_batch() {
        let store = InMemoryStore::new();
        assert!(upsert_batch(&store, &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_middle_item_is_isolated() {
        let store = InMemoryStore::new();
        let items = vec![
            json!({ "brand_name": "Acme", "line_name": "Robusto" }),
            json!({ "brand_name": "Acme", "line_name": "Toro", "strength_level_numeric": "very" }),
            json!({ "brand_name": "Acme", "line_name": "Churchill" }),
        ];

        let results = upsert_batch(&store, &items).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].status, ItemStatus::Success);
        assert_eq!(results[0].line.as_deref(), Some("Robusto"));
        assert_eq!(results[1].status, ItemStatus::Error);
        assert_eq!(results[1].line.as_deref(), Some("Toro"));
        assert!(results[1]
            .message
            .as_deref()
            .unwrap()
            .contains("strength_level_numeric"));
        assert_eq!(results[2].status, ItemStatus::Success);
        assert_eq!(results[2].line.as_deref(), Some("Churchill"));
        assert_eq!(store.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_actions_follow_prior_existence() {
        let store = InMemoryStore::new();
        let item = json!({ "brand_name": "Acme", "line_name": "Robusto" });

        let results = upsert_batch(&store, &[item.clone(), item]).await;

        assert_eq!(results[0].action, Some(UpsertAction::Inserted));
        assert_eq!(results[1].action, Some(UpsertAction::Updated));
    }

    #[tokio::test]
    async fn test_error_line_label() {
        let store = InMemoryStore::new();
        let items = vec![
            json!("not an object"),
            json!({ "line_name": "", "pairings": 5 }),
            json!({ "line_name": 0, "pairings": 5 }),
            json!({ "line_name": false, "pairings": 5 }),
            json!({ "line_name": null, "pairings": 5 }),
            json!({ "pairings": 5 }),
            json!({ "line_name": 12, "pairings": 5 }),
            json!({ "line_name": 4.5, "pairings": 5 }),
            json!({ "line_name": true, "pairings": 5 }),
        ];

        let results = upsert_batch(&store, &items).await;

        let labels: Vec<_> = results.iter().map(|r| r.line.as_deref()).collect();
        assert_eq!(
            labels,
            vec![
                Some("unknown"),
                Some("unknown"),
                Some("unknown"),
                Some("unknown"),
                Some("unknown"),
                Some("unknown"),
                Some("12"),
                Some("4.5"),
                Some("true"),
            ]
        );
        assert!(results.iter().all(|r| r.status == ItemStatus::Error));
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_success_without_line_name_reports_null() {
        let store = InMemoryStore::new();
        let results = upsert_batch(&store, &[json!({ "brand_name": "Acme" })]).await;
        let wire = serde_json::to_value(&results).unwrap();
        assert_eq!(
            wire,
            json!([{ "status": "success", "line": null, "action": "inserted" }])
        );
    }

    #[tokio::test]
    async fn test_store_failure_marks_every_item() {
        let store = UnavailableStore::new("connection refused");
        let items = vec![
            json!({ "brand_name": "Acme", "line_name": "Robusto" }),
            json!({ "brand_name": "Acme", "line_name": "Toro" }),
        ];

        let results = upsert_batch(&store, &items).await;
        let wire = serde_json::to_value(&results).unwrap();

        assert_eq!(
            wire[0],
            json!({
                "status": "error",
                "line": "Robusto",
                "message": "store unavailable: connection refused"
            })
        );
        assert_eq!(wire[1]["status"], "error");
    }
}
