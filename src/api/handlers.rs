//! API request handlers

use anyhow::Result;
use serde_json::Value;

use crate::catalog::CatalogStore;
use crate::sync::{PreviewReport, SyncReport, SyncService};

use super::models::{SelectiveSyncRequest, SyncRequest};

/// Handle health check requests
pub async fn health_check() -> Result<Value> {
    Ok(serde_json::json!({
        "status": "healthy",
        "service": "bjj-clip-catalog",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Handle local clip listing requests
pub async fn list_clips(store: &dyn CatalogStore) -> Result<Value> {
    let clips = store.list_local_records().await?;
    Ok(serde_json::json!({
        "total": clips.len(),
        "clips": clips,
    }))
}

// The `Err` side of the run handlers carries the report for a rejected root.

pub async fn run_sync(service: &SyncService, request: &SyncRequest) -> Result<SyncReport, SyncReport> {
    let root = &request.root_folder_path;
    service
        .try_sync(root, service.budget())
        .await
        .map_err(|e| SyncReport::failed(root.as_str(), e.to_string()))
}

pub async fn run_preview(
    service: &SyncService,
    request: &SyncRequest,
) -> Result<PreviewReport, PreviewReport> {
    let root = &request.root_folder_path;
    service
        .try_preview(root, service.budget())
        .await
        .map_err(|e| PreviewReport::failed(root, e.to_string()))
}

pub async fn run_selective_sync(
    service: &SyncService,
    request: &SelectiveSyncRequest,
) -> Result<SyncReport, SyncReport> {
    let root = &request.root_folder_path;
    service
        .try_selective_sync(
            root,
            &request.files_to_add,
            &request.clip_ids_to_remove,
            service.budget(),
        )
        .await
        .map_err(|e| SyncReport::failed(root.as_str(), e.to_string()))
}
