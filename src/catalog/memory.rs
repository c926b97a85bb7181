use async_trait::async_trait;
use bjj_core::{ClipId, ClipRecord, NewClip};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{CatalogError, CatalogResult, CatalogStore};

#[derive(Debug, Default)]
struct Inner {
    next_id: ClipId,
    records: BTreeMap<ClipId, ClipRecord>,
}

/// In-memory catalog, ids assigned sequentially from 1
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    inner: RwLock<Inner>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing records, keeping their ids
    pub fn with_records(records: Vec<ClipRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        let records = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            inner: RwLock::new(Inner { next_id, records }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_records(&self) -> CatalogResult<Vec<ClipRecord>> {
        Ok(self.inner.read().await.records.values().cloned().collect())
    }

    async fn insert(&self, clip: NewClip) -> CatalogResult<ClipId> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.records.insert(id, ClipRecord::from_new(id, clip));
        Ok(id)
    }

    async fn delete(&self, id: ClipId) -> CatalogResult<()> {
        self.inner
            .write()
            .await
            .records
            .remove(&id)
            .map(|_| ())
            .ok_or(CatalogError::NotFound(id))
    }

    async fn find_by_id(&self, id: ClipId) -> CatalogResult<Option<ClipRecord>> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn set_thumbnail(&self, id: ClipId, thumbnail: &str) -> CatalogResult<()> {
        let mut inner = self.inner.write().await;
        let record = inner.records.get_mut(&id).ok_or(CatalogError::NotFound(id))?;
        record.thumbnail = Some(thumbnail.to_string());
        Ok(())
    }
}
