//! Storage abstraction for cigar-line records.
//!
//! The [`Store`] trait is the persistence contract the HTTP router and the
//! batch engine depend on. The application injects a concrete backend at
//! startup (SQLite in production, [`memory::InMemoryStore`] in tests, and
//! [`unavailable::UnavailableStore`] when the database could not be reached).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;
pub mod unavailable;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::{CigarLine, CigarLineFields};

/// Whether an upsert created a new record or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Inserted,
    Updated,
}

/// Result of a successful [`Store::upsert_one`].
#[derive(Debug, Clone)]
pub struct Upserted {
    /// The record as stored after the write.
    pub line: CigarLine,
    pub action: UpsertAction,
}

/// Failure reported by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend cannot be reached (startup failure, I/O, exhausted pool).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected or failed the operation.
    #[error("{0}")]
    Backend(String),

    /// A stored document body no longer decodes into a cigar line.
    #[error("stored cigar line {id} could not be decoded: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Abstract storage backend for cigar lines.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list_all`](Store::list_all) | Every record, insertion order |
/// | [`list_by_brand`](Store::list_by_brand) | Records with an exact `brand_name` match |
/// | [`upsert_one`](Store::upsert_one) | Atomic insert-or-replace on `(brand_name, line_name)` |
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns every stored cigar line in insertion order.
    async fn list_all(&self) -> Result<Vec<CigarLine>, StoreError>;

    /// Returns the cigar lines whose `brand_name` equals `brand_name`
    /// exactly (case-sensitive), in insertion order.
    async fn list_by_brand(&self, brand_name: &str) -> Result<Vec<CigarLine>, StoreError>;

    /// Inserts `fields` as a new record, or replaces the content of the
    /// record with the same natural key.
    ///
    /// On insert the record gets a fresh `_id` and revision 0. On update the
    /// `_id` is kept, every field is overwritten (omitted ones revert to
    /// their defaults) and the revision is incremented. The match and the
    /// write happen as one atomic step.
    async fn upsert_one(&self, fields: &CigarLineFields) -> Result<Upserted, StoreError>;
}
