/// BJJ Clip Catalog
///
/// Catalogs training clips and keeps the catalog in step with the video
/// folders on disk: full sync, read-only preview, and selective sync.

pub mod catalog;
pub mod config;
pub mod sync;
pub mod thumbnails;

#[cfg(feature = "api")]
pub mod api;

// Re-export main types for easy access
pub use crate::catalog::{CatalogError, CatalogStore, JsonCatalogStore, MemoryCatalogStore};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::sync::{
    ItemError, PreviewReport, PreviewStatus, RootPathError, RunBudget, SyncReport, SyncService,
};
pub use crate::thumbnails::{ThumbnailError, ThumbnailGenerator};
pub use bjj_core::{ClipId, ClipRecord, NewClip, StorageKind};
