//! SQLite-backed document collection
//!
//! Each collection is a table of JSON documents keyed by an autoincrement id.
//! Id order is the natural (insertion) order returned by reads.

use serde_json::{Map, Value};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{debug, info};

use super::{Record, RecordStore};
use crate::error::StoreError;

/// Record store over one table of a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
    collection: String,
}

impl SqliteRecordStore {
    /// Open (creating if missing) the database file and collection table
    pub async fn open(db_path: &Path, collection: &str) -> Result<Self, StoreError> {
        if !is_valid_collection_name(collection) {
            return Err(StoreError::InvalidCollection(collection.to_string()));
        }

        let newly_created = !db_path.exists();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        debug!("Connecting to database: {}", db_url);
        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(&db_url)
            .await?;

        if newly_created {
            info!("Initialized new database: {}", db_path.display());
        } else {
            info!("Opened existing database: {}", db_path.display());
        }

        // WAL lets dashboard reads proceed while an upload is being written
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await?;
        sqlx::query("PRAGMA busy_timeout = 5000")
            .execute(&pool)
            .await?;

        Self::with_pool(pool, collection).await
    }

    /// Use an existing pool
    pub async fn with_pool(pool: SqlitePool, collection: &str) -> Result<Self, StoreError> {
        if !is_valid_collection_name(collection) {
            return Err(StoreError::InvalidCollection(collection.to_string()));
        }

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{}" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document TEXT NOT NULL
            )
            "#,
            collection
        ))
        .execute(&pool)
        .await?;

        Ok(Self {
            pool,
            collection: collection.to_string(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert_many(&self, records: Vec<Record>) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let documents = records
            .iter()
            .map(|record| serde_json::to_string(&record.to_document()?))
            .collect::<Result<Vec<_>, _>>()?;

        let sql = format!(r#"INSERT INTO "{}" (document) VALUES (?)"#, self.collection);
        let mut tx = self.pool.begin().await?;
        for document in &documents {
            sqlx::query(&sql).bind(document).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        debug!(
            "Inserted {} documents into {}",
            documents.len(),
            self.collection
        );
        Ok(())
    }

    async fn find_all(
        &self,
        fields: &[&str],
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        // LIMIT -1 means no limit in SQLite
        let limit = limit
            .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
            .unwrap_or(-1);

        let documents: Vec<String> = sqlx::query_scalar(&format!(
            r#"SELECT document FROM "{}" ORDER BY id ASC LIMIT ?"#,
            self.collection
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        documents
            .iter()
            .map(|document| -> Result<Record, StoreError> {
                let mut map: Map<String, Value> = serde_json::from_str(document)?;
                map.retain(|name, _| fields.contains(&name.as_str()));
                Ok(Record::from_document(map)?)
            })
            .collect()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let count: i64 =
            sqlx::query_scalar(&format!(r#"SELECT COUNT(*) FROM "{}""#, self.collection))
                .fetch_one(&self.pool)
                .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

/// Validate collection name to prevent SQL injection
fn is_valid_collection_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.is_empty()
        && name.len() < 100
        && !name.starts_with("sqlite_")
}
