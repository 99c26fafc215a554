//! A [`Store`] that fails every call.
//!
//! Stands in for the real backend when the startup connection could not be
//! established, so the server keeps answering (the root health check still
//! works) and every store-backed request reports why the store is missing.

use async_trait::async_trait;

use crate::models::{CigarLine, CigarLineFields};

use super::{Store, StoreError, Upserted};

pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The startup error this store reports on every call.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    fn error(&self) -> StoreError {
        StoreError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl Store for UnavailableStore {
    async fn list_all(&self) -> Result<Vec<CigarLine>, StoreError> {
        Err(self.error())
    }

    async fn list_by_brand(&self, _brand_name: &str) -> Result<Vec<CigarLine>, StoreError> {
        Err(self.error())
    }

    async fn upsert_one(&self, _fields: &CigarLineFields) -> Result<Upserted, StoreError> {
        Err(self.error())
    }
}
