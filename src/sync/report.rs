//! Report shapes returned by sync, preview and selective sync

use bjj_core::{ClipId, ClipRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A clip added to or removed from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipChange {
    pub id: ClipId,
    pub path: String,
    pub title: String,
}

impl From<&ClipRecord> for ClipChange {
    fn from(record: &ClipRecord) -> Self {
        Self {
            id: record.id,
            path: record.location_key.clone(),
            title: record.title.clone(),
        }
    }
}

/// A single item that could not be processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    pub path: String,
    pub message: String,
}

/// Outcome of a full or selective sync
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub total_scanned: usize,
    pub total_added: usize,
    pub total_removed: usize,
    pub added_clips: Vec<ClipChange>,
    pub removed_clips: Vec<ClipChange>,
    pub errors: Vec<ItemFailure>,
}

impl SyncReport {
    /// Report for a run that was rejected before any work started
    pub fn failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        let mut report = Self::default();
        report.record_error(path, message);
        report
    }

    pub fn record_added(&mut self, change: ClipChange) {
        self.added_clips.push(change);
        self.total_added = self.added_clips.len();
    }

    pub fn record_removed(&mut self, change: ClipChange) {
        self.removed_clips.push(change);
        self.total_removed = self.removed_clips.len();
    }

    pub fn record_error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ItemFailure {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Classification of one preview item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewStatus {
    /// File on disk with a catalog record
    Matched,
    /// File on disk without a catalog record
    New,
    /// Catalog record whose file is gone
    Missing,
    /// Item could not be inspected
    Error,
}

/// One row of a preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewItem {
    pub path: String,
    pub status: PreviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_id: Option<ClipId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl PreviewItem {
    pub fn new(path: impl Into<String>, status: PreviewStatus) -> Self {
        Self {
            path: path.into(),
            status,
            directory: None,
            file_size: None,
            last_modified: None,
            clip_id: None,
            title: None,
            description: None,
            tags: None,
            error_message: None,
        }
    }

    /// Attach the catalog side of the item
    pub fn with_record(mut self, record: &ClipRecord) -> Self {
        self.clip_id = Some(record.id);
        self.title = Some(record.title.clone());
        self.description = Some(record.description.clone());
        self.tags = Some(record.tags.clone());
        self
    }

    /// Downgrade the item to an error
    pub fn into_error(mut self, message: impl Into<String>) -> Self {
        self.status = PreviewStatus::Error;
        self.error_message = Some(message.into());
        self
    }
}

/// Read-only classification of a root folder against the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewReport {
    pub root_folder_path: String,
    pub total_scanned: usize,
    pub matched_files_count: usize,
    pub new_files_count: usize,
    pub missing_files_count: usize,
    pub error_count: usize,
    pub items: Vec<PreviewItem>,
}

impl PreviewReport {
    pub fn new(root_folder_path: impl Into<String>) -> Self {
        Self {
            root_folder_path: root_folder_path.into(),
            ..Self::default()
        }
    }

    /// Report for a run that was rejected before any work started
    pub fn failed(root_folder_path: &str, message: impl Into<String>) -> Self {
        let mut report = Self::new(root_folder_path);
        report.push(PreviewItem::new(root_folder_path, PreviewStatus::Error).into_error(message));
        report
    }

    /// Add an item and bump the counter for its final status
    pub fn push(&mut self, item: PreviewItem) {
        match item.status {
            PreviewStatus::Matched => self.matched_files_count += 1,
            PreviewStatus::New => self.new_files_count += 1,
            PreviewStatus::Missing => self.missing_files_count += 1,
            PreviewStatus::Error => self.error_count += 1,
        }
        self.items.push(item);
    }
}
