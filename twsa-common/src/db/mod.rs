//! Record store access
//!
//! The dashboard never talks to a database client directly. Every read and
//! write goes through a [`RecordStore`] handed to it at startup, so tests can
//! swap in [`MemoryRecordStore`].

pub mod memory;
pub mod models;
pub mod sqlite;

pub use memory::MemoryRecordStore;
pub use models::{fields, Record, Sentiment};
pub use sqlite::SqliteRecordStore;

use crate::error::StoreError;

/// Document collection holding tweet records
///
/// Implementations must tolerate concurrent readers. Writes have no ordering
/// guarantee relative to concurrent reads beyond each call being independent.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Append a batch of records
    ///
    /// The batch is attempted as a whole. Any failure is returned as-is.
    async fn insert_many(&self, records: Vec<Record>) -> Result<(), StoreError>;

    /// Fetch records in the store's natural order
    ///
    /// Only the named `fields` are populated on returned records. `limit`
    /// bounds how many records are read.
    async fn find_all(
        &self,
        fields: &[&str],
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError>;

    /// Number of stored records
    async fn count(&self) -> Result<usize, StoreError>;
}

/// Keep only the named fields of a record
pub fn project(record: &Record, fields: &[&str]) -> Record {
    let keep = |name: &str| fields.contains(&name);
    Record {
        text: record.text.clone().filter(|_| keep(fields::TEXT)),
        sentiment: record.sentiment.clone().filter(|_| keep(fields::SENTIMENT)),
        timestamp: record.timestamp.clone().filter(|_| keep(fields::TIMESTAMP)),
        batch_timestamp: record
            .batch_timestamp
            .clone()
            .filter(|_| keep(fields::BATCH_TIMESTAMP)),
        extra: record
            .extra
            .iter()
            .filter(|(name, _)| keep(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
    }
}
