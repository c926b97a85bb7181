//! Clip catalog persistence
//!
//! The catalog is the single durable store. Stores are mutated one record at a
//! time; there is no all-or-nothing transaction around a sync run.

use async_trait::async_trait;
use bjj_core::{ClipId, ClipRecord, NewClip, PathIdentity};

pub mod json_store;
pub mod memory;

pub use json_store::JsonCatalogStore;
pub use memory::MemoryCatalogStore;

/// Result type for catalog operations
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Error types for catalog operations
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Clip {0} not found")]
    NotFound(ClipId),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Persistence collaborator for clip records
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All records, local and remote
    async fn list_records(&self) -> CatalogResult<Vec<ClipRecord>>;

    /// Records backed by a file on disk
    async fn list_local_records(&self) -> CatalogResult<Vec<ClipRecord>> {
        Ok(self
            .list_records()
            .await?
            .into_iter()
            .filter(ClipRecord::is_local)
            .collect())
    }

    /// Persist a new record and return its assigned id
    async fn insert(&self, clip: NewClip) -> CatalogResult<ClipId>;

    /// Remove a record. Fails with [`CatalogError::NotFound`] for unknown ids.
    async fn delete(&self, id: ClipId) -> CatalogResult<()>;

    async fn find_by_id(&self, id: ClipId) -> CatalogResult<Option<ClipRecord>>;

    /// Local record whose path has the same identity key as `path`
    async fn find_by_normalized_path(
        &self,
        path: &str,
        identity: &dyn PathIdentity,
    ) -> CatalogResult<Option<ClipRecord>> {
        let key = identity.key(path);
        Ok(self
            .list_local_records()
            .await?
            .into_iter()
            .find(|record| identity.key(&record.location_key) == key))
    }

    /// Attach a generated thumbnail reference to a record
    async fn set_thumbnail(&self, id: ClipId, thumbnail: &str) -> CatalogResult<()>;
}
