//! In-memory identity store.

use super::{IdentityRecord, IdentityStore, RecordUpdate};
use crate::error::{RouterError, RouterResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Identity store backed by a map in process memory. Data is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, IdentityRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records.
    pub fn with_records(records: impl IntoIterator<Item = IdentityRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.phone_number.clone(), r))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn get(&self, phone_number: &str) -> RouterResult<Option<IdentityRecord>> {
        Ok(self.records.read().await.get(phone_number).cloned())
    }

    async fn create(&self, record: IdentityRecord) -> RouterResult<()> {
        debug!(phone_number = %record.phone_number, "Memory store: create");
        self.records
            .write()
            .await
            .insert(record.phone_number.clone(), record);
        Ok(())
    }

    async fn update(&self, phone_number: &str, update: RecordUpdate) -> RouterResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(phone_number)
            .ok_or_else(|| RouterError::NotFound(phone_number.to_string()))?;
        if update.is_empty() {
            return Ok(());
        }
        update.apply(&mut record.info);
        debug!(phone_number, ?update, "Memory store: update");
        Ok(())
    }

    async fn count(&self) -> RouterResult<usize> {
        Ok(self.records.read().await.len())
    }
}
