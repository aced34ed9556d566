//! # Score Store
//!
//! Persistence for high scores, banked points and purchased shop items. The engine only
//! touches the store at the win checkpoint; the runtime reads owned items when a level
//! starts and routes shop purchases here.

use crate::model::shop::{self, ItemId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store record is corrupt: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Insufficient points: needed {needed}, available {available}")]
    InsufficientPoints { needed: u32, available: u32 },

    #[error("Unknown shop item: {0}")]
    UnknownItem(ItemId),
}

#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Best final score for `level`, 0 if never won.
    async fn high_score(&self, level: u32) -> Result<u32, StoreError>;

    /// Overwrite the high score for `level`.
    async fn set_high_score(&self, level: u32, score: u32) -> Result<(), StoreError>;

    async fn reset_all_high_scores(&self) -> Result<(), StoreError>;

    async fn points(&self) -> Result<u32, StoreError>;

    /// Bank `delta` points and return the new balance.
    async fn add_points(&self, delta: u32) -> Result<u32, StoreError>;

    async fn active_items(&self) -> Result<Vec<ItemId>, StoreError>;

    /// Buy `item`, paying its cost. Buying an item already owned succeeds without charge.
    async fn purchase_item(&self, item: ItemId) -> Result<(), StoreError>;
}

/// Everything a store persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub high_scores: BTreeMap<u32, u32>,
    pub points: u32,
    pub items: BTreeSet<ItemId>,
}

impl StoreRecord {
    pub fn high_score(&self, level: u32) -> u32 {
        self.high_scores.get(&level).copied().unwrap_or(0)
    }

    pub fn add_points(&mut self, delta: u32) -> u32 {
        self.points = self.points.saturating_add(delta);
        self.points
    }

    /// Returns whether anything changed.
    pub fn purchase(&mut self, id: ItemId) -> Result<bool, StoreError> {
        let item = shop::find(id).ok_or(StoreError::UnknownItem(id))?;
        if self.items.contains(&id) {
            return Ok(false);
        }
        if self.points < item.cost {
            return Err(StoreError::InsufficientPoints {
                needed: item.cost,
                available: self.points,
            });
        }
        self.points -= item.cost;
        self.items.insert(id);
        Ok(true)
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Volatile store, for tests and for demo runs without `--store`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    record: Mutex<StoreRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: StoreRecord) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }
}

#[async_trait]
impl ScoreStore for InMemoryStore {
    async fn high_score(&self, level: u32) -> Result<u32, StoreError> {
        Ok(self.record.lock().await.high_score(level))
    }

    async fn set_high_score(&self, level: u32, score: u32) -> Result<(), StoreError> {
        self.record.lock().await.high_scores.insert(level, score);
        Ok(())
    }

    async fn reset_all_high_scores(&self) -> Result<(), StoreError> {
        self.record.lock().await.high_scores.clear();
        Ok(())
    }

    async fn points(&self) -> Result<u32, StoreError> {
        Ok(self.record.lock().await.points)
    }

    async fn add_points(&self, delta: u32) -> Result<u32, StoreError> {
        Ok(self.record.lock().await.add_points(delta))
    }

    async fn active_items(&self) -> Result<Vec<ItemId>, StoreError> {
        Ok(self.record.lock().await.items.iter().copied().collect())
    }

    async fn purchase_item(&self, item: ItemId) -> Result<(), StoreError> {
        self.record.lock().await.purchase(item).map(|_| ())
    }
}

// =============================================================================
// JSON file
// =============================================================================

/// Store backed by a single pretty-printed JSON file, rewritten after every change.
///
/// The record is cached in memory; the lock is held across the write so concurrent
/// updates reach the file in order.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    record: Mutex<StoreRecord>,
}

impl JsonFileStore {
    /// Open `path`, starting from an empty record if the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let record = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No store file yet");
                StoreRecord::default()
            }
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), points = record.points, "Store opened");
        Ok(Self {
            path,
            record: Mutex::new(record),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, record: &StoreRecord) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&self.path, bytes).await?;
        debug!(path = %self.path.display(), "Store written");
        Ok(())
    }

    /// Apply `change` to a copy of the record and write it out. The cached record is
    /// replaced only once the write succeeded; on any error it is left as it was.
    async fn update<T, F>(&self, change: F) -> Result<T, StoreError>
    where
        T: Send,
        F: FnOnce(&mut StoreRecord) -> Result<(T, bool), StoreError> + Send,
    {
        let mut record = self.record.lock().await;
        let mut next = record.clone();
        let (out, changed) = change(&mut next)?;
        if changed {
            self.persist(&next).await?;
            *record = next;
        }
        Ok(out)
    }
}

#[async_trait]
impl ScoreStore for JsonFileStore {
    async fn high_score(&self, level: u32) -> Result<u32, StoreError> {
        Ok(self.record.lock().await.high_score(level))
    }

    async fn set_high_score(&self, level: u32, score: u32) -> Result<(), StoreError> {
        self.update(|record| {
            record.high_scores.insert(level, score);
            Ok(((), true))
        })
        .await
    }

    async fn reset_all_high_scores(&self) -> Result<(), StoreError> {
        self.update(|record| {
            record.high_scores.clear();
            Ok(((), true))
        })
        .await
    }

    async fn points(&self) -> Result<u32, StoreError> {
        Ok(self.record.lock().await.points)
    }

    async fn add_points(&self, delta: u32) -> Result<u32, StoreError> {
        self.update(|record| Ok((record.add_points(delta), true))).await
    }

    async fn active_items(&self) -> Result<Vec<ItemId>, StoreError> {
        Ok(self.record.lock().await.items.iter().copied().collect())
    }

    async fn purchase_item(&self, item: ItemId) -> Result<(), StoreError> {
        self.update(|record| Ok(((), record.purchase(item)?))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::shop::FASTER_RESOURCES_I;

    #[tokio::test]
    async fn test_purchase_requires_points() {
        let store = InMemoryStore::new();
        store.add_points(499).await.unwrap();

        let result = store.purchase_item(FASTER_RESOURCES_I).await;
        assert!(matches!(
            result,
            Err(StoreError::InsufficientPoints {
                needed: 500,
                available: 499
            })
        ));

        store.add_points(1).await.unwrap();
        store.purchase_item(FASTER_RESOURCES_I).await.unwrap();
        assert_eq!(store.points().await.unwrap(), 0);
        assert_eq!(store.active_items().await.unwrap(), vec![FASTER_RESOURCES_I]);

        // Already owned: no charge, no error.
        store.purchase_item(FASTER_RESOURCES_I).await.unwrap();
        assert_eq!(store.points().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_item_rejected() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.purchase_item(ItemId(42)).await,
            Err(StoreError::UnknownItem(ItemId(42)))
        ));
    }

    #[tokio::test]
    async fn test_high_scores_reset() {
        let store = InMemoryStore::new();
        assert_eq!(store.high_score(1).await.unwrap(), 0);
        store.set_high_score(1, 250).await.unwrap();
        store.set_high_score(2, 90).await.unwrap();
        assert_eq!(store.high_score(1).await.unwrap(), 250);

        store.reset_all_high_scores().await.unwrap();
        assert_eq!(store.high_score(1).await.unwrap(), 0);
        assert_eq!(store.high_score(2).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_json_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.add_points(700).await.unwrap();
        store.set_high_score(1, 297).await.unwrap();
        store.purchase_item(FASTER_RESOURCES_I).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.points().await.unwrap(), 200);
        assert_eq!(reopened.high_score(1).await.unwrap(), 297);
        assert_eq!(reopened.active_items().await.unwrap(), vec![FASTER_RESOURCES_I]);
    }

    #[tokio::test]
    async fn test_json_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        assert!(matches!(
            JsonFileStore::open(&path).await,
            Err(StoreError::Serde(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_record_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("scores.json");
        let store = JsonFileStore::open(&path).await.unwrap();

        assert!(matches!(store.add_points(600).await, Err(StoreError::Io(_))));
        assert_eq!(store.points().await.unwrap(), 0);

        assert!(store.set_high_score(1, 297).await.is_err());
        assert_eq!(store.high_score(1).await.unwrap(), 0);

        // Once the directory exists, a retry banks the points exactly once.
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        assert_eq!(store.add_points(600).await.unwrap(), 600);
        tokio::fs::remove_dir_all(path.parent().unwrap()).await.unwrap();

        assert!(store.purchase_item(FASTER_RESOURCES_I).await.is_err());
        assert_eq!(store.points().await.unwrap(), 600);
        assert!(store.active_items().await.unwrap().is_empty());
    }
}
