//! Filesystem-to-catalog reconciliation
//!
//! Three entry points share one scan + classify pipeline:
//! - [`SyncService::sync`] commits every addition and removal
//! - [`SyncService::preview`] reports the classification without mutating
//! - [`SyncService::selective_sync`] applies a caller-chosen subset
//!
//! Root validation is the only failure that aborts a run. Everything after it
//! is isolated per item and surfaces in the returned report.

use bjj_core::{identity_for, CaseInsensitive, ClipId, DirectoryScanner, PathIdentity, ScanOutcome};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::thumbnails::ThumbnailGenerator;

pub mod budget;
mod full;
mod preview;
pub mod reconciler;
pub mod report;
mod selective;
pub mod validation;

pub use budget::RunBudget;
pub use reconciler::{Classification, MatchedFile, Reconciler};
pub use report::{ClipChange, ItemFailure, PreviewItem, PreviewReport, PreviewStatus, SyncReport};
pub use validation::{validate_root, RootPathError};

/// Why a single item was skipped
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("File does not exist")]
    FileMissing,

    #[error("A clip with this file path already exists")]
    DuplicatePath,

    #[error("Clip {0} not found")]
    ClipNotFound(ClipId),

    #[error("Directory could not be read")]
    UnreadableDirectory,

    #[error("Directory could not be read; clip kept")]
    KeptUnderUnreadableDirectory,

    #[error("Failed to read file metadata: {0}")]
    Stat(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Sync cancelled before this item was processed")]
    Cancelled,
}

/// Runs reconciliation against a catalog store
pub struct SyncService {
    store: Arc<dyn CatalogStore>,
    thumbnails: Arc<dyn ThumbnailGenerator>,
    reconciler: Reconciler,
    scanner: DirectoryScanner,
    run_timeout_seconds: Option<u64>,
    root_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SyncService {
    /// Service with case-insensitive path identity and no run timeout
    pub fn new(store: Arc<dyn CatalogStore>, thumbnails: Arc<dyn ThumbnailGenerator>) -> Self {
        Self {
            store,
            thumbnails,
            reconciler: Reconciler::new(Arc::new(CaseInsensitive)),
            scanner: DirectoryScanner::new(),
            run_timeout_seconds: None,
            root_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Service configured from the `sync` section
    pub fn from_config(
        config: &Config,
        store: Arc<dyn CatalogStore>,
        thumbnails: Arc<dyn ThumbnailGenerator>,
    ) -> Self {
        Self::new(store, thumbnails)
            .with_identity(identity_for(config.sync.case_sensitive_paths))
            .with_scanner(DirectoryScanner::new().with_follow_links(config.sync.follow_links))
            .with_run_timeout(config.sync.run_timeout_seconds)
    }

    pub fn with_identity(mut self, identity: Arc<dyn PathIdentity>) -> Self {
        self.reconciler = Reconciler::new(identity);
        self
    }

    pub fn with_scanner(mut self, scanner: DirectoryScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_run_timeout(mut self, seconds: Option<u64>) -> Self {
        self.run_timeout_seconds = seconds;
        self
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    fn identity(&self) -> &dyn PathIdentity {
        self.reconciler.identity()
    }

    /// Fresh budget from the configured run timeout
    pub fn budget(&self) -> RunBudget {
        RunBudget::from_timeout_seconds(self.run_timeout_seconds)
    }

    /// Full sync: add every new file and remove every missing record
    pub async fn sync(&self, root: &str) -> SyncReport {
        self.sync_with_budget(root, self.budget()).await
    }

    pub async fn sync_with_budget(&self, root: &str, budget: RunBudget) -> SyncReport {
        self.try_sync(root, budget)
            .await
            .unwrap_or_else(|e| SyncReport::failed(root, e.to_string()))
    }

    /// Full sync that hands back a rejected root instead of folding it into a report
    pub async fn try_sync(&self, root: &str, budget: RunBudget) -> Result<SyncReport, RootPathError> {
        let root_path = validate_root(root)?;

        let lock = self.root_lock(&root_path).await;
        let _guard = lock.lock().await;
        Ok(self.run_full(&root_path, &budget).await)
    }

    /// Read-only classification of a root folder
    pub async fn preview(&self, root: &str) -> PreviewReport {
        self.preview_with_budget(root, self.budget()).await
    }

    pub async fn preview_with_budget(&self, root: &str, budget: RunBudget) -> PreviewReport {
        self.try_preview(root, budget)
            .await
            .unwrap_or_else(|e| PreviewReport::failed(root, e.to_string()))
    }

    pub async fn try_preview(
        &self,
        root: &str,
        budget: RunBudget,
    ) -> Result<PreviewReport, RootPathError> {
        let root_path = validate_root(root)?;

        let lock = self.root_lock(&root_path).await;
        let _guard = lock.lock().await;
        Ok(self.run_preview(&root_path, &budget).await)
    }

    /// Apply only the listed additions and removals
    pub async fn selective_sync(
        &self,
        root: &str,
        files_to_add: &[String],
        clip_ids_to_remove: &[ClipId],
    ) -> SyncReport {
        self.selective_sync_with_budget(root, files_to_add, clip_ids_to_remove, self.budget())
            .await
    }

    pub async fn selective_sync_with_budget(
        &self,
        root: &str,
        files_to_add: &[String],
        clip_ids_to_remove: &[ClipId],
        budget: RunBudget,
    ) -> SyncReport {
        self.try_selective_sync(root, files_to_add, clip_ids_to_remove, budget)
            .await
            .unwrap_or_else(|e| SyncReport::failed(root, e.to_string()))
    }

    pub async fn try_selective_sync(
        &self,
        root: &str,
        files_to_add: &[String],
        clip_ids_to_remove: &[ClipId],
        budget: RunBudget,
    ) -> Result<SyncReport, RootPathError> {
        let root_path = validate_root(root)?;

        let lock = self.root_lock(&root_path).await;
        let _guard = lock.lock().await;
        Ok(self.run_selective(files_to_add, clip_ids_to_remove, &budget).await)
    }

    /// Serializes runs against the same root
    async fn root_lock(&self, root: &Path) -> Arc<Mutex<()>> {
        let key = self.identity().key(&root.to_string_lossy());
        let mut locks = self.root_locks.lock().await;
        Arc::clone(locks.entry(key).or_default())
    }

    /// Walk the root on the blocking pool
    async fn scan_root(&self, root: &Path, budget: &RunBudget) -> Result<ScanOutcome, String> {
        let scanner = self.scanner.clone();
        let root = root.to_path_buf();
        let budget = budget.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            scanner.scan_until(&root, || budget.is_exhausted())
        })
        .await
        .map_err(|e| format!("Scan failed: {}", e))?;

        debug!(
            "Scan found {} videos ({} unreadable)",
            outcome.files.len(),
            outcome.skipped.len()
        );
        Ok(outcome)
    }

    /// Whether `path` sits under one of the unreadable directories
    fn under_skipped(&self, path: &str, skipped: &[PathBuf]) -> bool {
        let key = self.identity().key(path);
        skipped.iter().any(|dir| {
            let dir_key = self.identity().key(&dir.to_string_lossy());
            key.len() > dir_key.len()
                && key.starts_with(&dir_key)
                && key[dir_key.len()..].starts_with(['/', '\\'])
        })
    }
}
