//! In-memory [`Store`] implementation for tests and embedding.
//!
//! Records live in a `Vec` behind `std::sync::RwLock`, so insertion order is
//! the listing order. An upsert holds the write lock across the lookup and
//! the write, which makes it atomic with respect to other callers.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{CigarLine, CigarLineFields};

use super::{Store, StoreError, UpsertAction, Upserted};

/// In-memory store for tests.
pub struct InMemoryStore {
    lines: RwLock<Vec<CigarLine>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            lines: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lines.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl Store for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<CigarLine>, StoreError> {
        Ok(self.lines.read().map_err(poisoned)?.clone())
    }

    async fn list_by_brand(&self, brand_name: &str) -> Result<Vec<CigarLine>, StoreError> {
        let lines = self.lines.read().map_err(poisoned)?;
        Ok(lines
            .iter()
            .filter(|l| l.fields.brand_name.as_deref() == Some(brand_name))
            .cloned()
            .collect())
    }

    async fn upsert_one(&self, fields: &CigarLineFields) -> Result<Upserted, StoreError> {
        let mut lines = self.lines.write().map_err(poisoned)?;

        if let Some(existing) = lines
            .iter_mut()
            .find(|l| l.fields.natural_key() == fields.natural_key())
        {
            existing.fields = fields.clone();
            existing.revision += 1;
            return Ok(Upserted {
                line: existing.clone(),
                action: UpsertAction::Updated,
            });
        }

        let line = CigarLine {
            id: Uuid::new_v4().to_string(),
            fields: fields.clone(),
            revision: 0,
        };
        lines.push(line.clone());
        Ok(Upserted {
            line,
            action: UpsertAction::Inserted,
        })
    }
}
