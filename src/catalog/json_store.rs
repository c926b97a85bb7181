use async_trait::async_trait;
use bjj_core::{ClipId, ClipRecord, NewClip};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{CatalogError, CatalogResult, CatalogStore};

/// On-disk layout of the catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogDocument {
    /// Last id handed out
    next_id: ClipId,
    clips: Vec<ClipRecord>,
}

/// Catalog persisted as a single JSON document.
///
/// The document is cached in memory and rewritten after every mutation, so
/// each create or delete is durable on its own.
#[derive(Debug)]
pub struct JsonCatalogStore {
    path: PathBuf,
    document: RwLock<CatalogDocument>,
}

impl JsonCatalogStore {
    /// Open the catalog at `path`, starting empty if the file does not exist
    pub async fn open(path: PathBuf) -> CatalogResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let document = if path.exists() {
            let content = fs::read_to_string(&path).await?;
            serde_json::from_str(&content)?
        } else {
            CatalogDocument::default()
        };

        info!("📁 Catalog opened at {} ({} clips)", path.display(), document.clips.len());

        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    /// Path of the catalog file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, document: &CatalogDocument) -> CatalogResult<()> {
        let json_content = serde_json::to_string_pretty(document)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json_content).await?;
        fs::rename(&tmp_path, &self.path).await?;
        debug!("💾 Catalog saved: {} clips", document.clips.len());
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for JsonCatalogStore {
    async fn list_records(&self) -> CatalogResult<Vec<ClipRecord>> {
        Ok(self.document.read().await.clips.clone())
    }

    async fn insert(&self, clip: NewClip) -> CatalogResult<ClipId> {
        let mut document = self.document.write().await;
        let mut updated = document.clone();
        updated.next_id += 1;
        let id = updated.next_id;
        updated.clips.push(ClipRecord::from_new(id, clip));

        self.persist(&updated).await?;
        *document = updated;
        Ok(id)
    }

    async fn delete(&self, id: ClipId) -> CatalogResult<()> {
        let mut document = self.document.write().await;
        let mut updated = document.clone();
        let before = updated.clips.len();
        updated.clips.retain(|clip| clip.id != id);
        if updated.clips.len() == before {
            return Err(CatalogError::NotFound(id));
        }

        self.persist(&updated).await?;
        *document = updated;
        Ok(())
    }

    async fn find_by_id(&self, id: ClipId) -> CatalogResult<Option<ClipRecord>> {
        Ok(self
            .document
            .read()
            .await
            .clips
            .iter()
            .find(|clip| clip.id == id)
            .cloned())
    }

    async fn set_thumbnail(&self, id: ClipId, thumbnail: &str) -> CatalogResult<()> {
        let mut document = self.document.write().await;
        let mut updated = document.clone();
        let clip = updated
            .clips
            .iter_mut()
            .find(|clip| clip.id == id)
            .ok_or(CatalogError::NotFound(id))?;
        clip.thumbnail = Some(thumbnail.to_string());

        self.persist(&updated).await?;
        *document = updated;
        Ok(())
    }
}
