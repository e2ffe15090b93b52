//! In-process record store

use tokio::sync::RwLock;

use super::{project, Record, RecordStore};
use crate::error::StoreError;

/// Record store backed by a vector, used by tests and `--memory` runs
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<Record>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `records`
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_many(&self, records: Vec<Record>) -> Result<(), StoreError> {
        self.records.write().await.extend(records);
        Ok(())
    }

    async fn find_all(
        &self,
        fields: &[&str],
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        let records = self.records.read().await;
        let limit = limit.unwrap_or(usize::MAX);
        Ok(records
            .iter()
            .take(limit)
            .map(|record| project(record, fields))
            .collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}
