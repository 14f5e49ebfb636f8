use crate::errors::Result;
use crate::model::{Reading, StoredReading};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The table holding readings, keyed by `(device_id, timestamp)`.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Writes a reading, replacing any record with the same key.
    async fn put(&self, reading: &Reading) -> Result<()>;

    /// Returns every stored reading matching `filter`.
    async fn scan(&self, filter: &ScanFilter) -> Result<Vec<StoredReading>>;
}

pub type SharedStore = Arc<dyn ReadingStore>;

/// Device match plus a lower bound on the timestamp.
///
/// Timestamps are compared as strings, which follows chronological order as
/// long as every record uses the same ISO-8601 layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFilter {
    pub device_id: i64,
    pub since: String,
}

impl ScanFilter {
    pub fn new(device_id: i64, since: impl Into<String>) -> Self {
        Self {
            device_id,
            since: since.into(),
        }
    }

    pub fn matches(&self, reading: &StoredReading) -> bool {
        reading.device_id.as_i64() == Some(self.device_id)
            && reading.timestamp.as_str() >= self.since.as_str()
    }
}

/// Process-local table, used by the local API server and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: Arc<RwLock<BTreeMap<(String, String), StoredReading>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Inserts a record as-is, bypassing the ingest path. Keyed on the
    /// decimal text of `device_id`, so non-integer ids keep distinct keys.
    pub async fn insert_raw(&self, stored: StoredReading) {
        let key = (
            stored.device_id.as_str().to_string(),
            stored.timestamp.clone(),
        );
        self.items.write().await.insert(key, stored);
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn put(&self, reading: &Reading) -> Result<()> {
        let key = (reading.device_id.to_string(), reading.timestamp.clone());
        self.items
            .write()
            .await
            .insert(key, StoredReading::from(reading));
        Ok(())
    }

    async fn scan(&self, filter: &ScanFilter) -> Result<Vec<StoredReading>> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .filter(|stored| filter.matches(stored))
            .cloned()
            .collect())
    }
}
