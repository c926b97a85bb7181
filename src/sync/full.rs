use bjj_core::{ClipId, ClipRecord, NewClip, ScanOutcome};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use super::{ClipChange, ItemError, RunBudget, SyncReport, SyncService};

impl SyncService {
    pub(super) async fn run_full(&self, root: &Path, budget: &RunBudget) -> SyncReport {
        let start_time = Instant::now();
        let root_display = root.to_string_lossy().to_string();
        info!("🔄 Full sync of {}", root.display());

        let records = match self.store.list_local_records().await {
            Ok(records) => records,
            Err(e) => {
                return SyncReport::failed(root_display, format!("Failed to read catalog: {}", e))
            }
        };

        let outcome = match self.scan_root(root, budget).await {
            Ok(outcome) => outcome,
            Err(message) => return SyncReport::failed(root_display, message),
        };

        let report = self.apply_scan(root, records, outcome, budget).await;

        info!(
            "✅ Sync of {} finished in {:.2}s: {} scanned, {} added, {} removed, {} errors",
            root.display(),
            start_time.elapsed().as_secs_f64(),
            report.total_scanned,
            report.total_added,
            report.total_removed,
            report.errors.len()
        );

        report
    }

    /// Commit the differences between a finished scan and the catalog
    async fn apply_scan(
        &self,
        root: &Path,
        records: Vec<ClipRecord>,
        outcome: ScanOutcome,
        budget: &RunBudget,
    ) -> SyncReport {
        let root_display = root.to_string_lossy().to_string();
        let mut report = SyncReport {
            total_scanned: outcome.files.len(),
            ..SyncReport::default()
        };

        if outcome.interrupted {
            warn!("Scan of {} did not finish, no changes applied", root.display());
            report.record_error(root_display, "Scan stopped before completion; no changes applied");
            return report;
        }

        for dir in &outcome.skipped {
            report.record_error(dir.to_string_lossy(), ItemError::UnreadableDirectory.to_string());
        }

        let mut known_keys: HashSet<String> = records
            .iter()
            .map(|record| self.identity().key(&record.location_key))
            .collect();
        let classification = self.reconciler.classify(&outcome.files, records);

        for path in &classification.new_files {
            let result = if budget.is_exhausted() {
                Err(ItemError::Cancelled)
            } else {
                self.add_scanned_file(path, &mut known_keys).await
            };

            match result {
                Ok(change) => report.record_added(change),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    report.record_error(path.to_string_lossy(), e.to_string());
                }
            }
        }

        for record in &classification.missing {
            let result = if budget.is_exhausted() {
                Err(ItemError::Cancelled)
            } else if self.under_skipped(&record.location_key, &outcome.skipped) {
                Err(ItemError::KeptUnderUnreadableDirectory)
            } else {
                self.remove_missing(record).await
            };

            match result {
                Ok(change) => report.record_removed(change),
                Err(e) => {
                    warn!("Not removing clip {} ({}): {}", record.id, record.location_key, e);
                    report.record_error(record.location_key.clone(), e.to_string());
                }
            }
        }

        report
    }

    /// Create a record for a newly found file, then try for a thumbnail
    async fn add_scanned_file(
        &self,
        path: &Path,
        known_keys: &mut HashSet<String>,
    ) -> Result<ClipChange, ItemError> {
        // The file may have disappeared since the scan
        if !path.is_file() {
            return Err(ItemError::FileMissing);
        }

        let key = self.identity().key(&path.to_string_lossy());
        if known_keys.contains(&key) {
            return Err(ItemError::DuplicatePath);
        }

        let clip = NewClip::local(path);
        let change = ClipChange {
            id: 0,
            path: clip.location_key.clone(),
            title: clip.title.clone(),
        };

        let id = self
            .store
            .insert(clip)
            .await
            .map_err(|e| ItemError::Catalog(e.to_string()))?;
        known_keys.insert(key);

        self.attach_thumbnail(path, id).await;

        info!("➕ Added clip {}: {}", id, change.path);
        Ok(ClipChange { id, ..change })
    }

    /// Thumbnail failures never affect the sync outcome
    async fn attach_thumbnail(&self, path: &Path, id: ClipId) {
        match self.thumbnails.generate(path, id).await {
            Ok(Some(thumbnail)) => {
                if let Err(e) = self.store.set_thumbnail(id, &thumbnail).await {
                    warn!("Could not store thumbnail for clip {}: {}", id, e);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Thumbnail generation failed for {}: {}", path.display(), e),
        }
    }

    async fn remove_missing(&self, record: &ClipRecord) -> Result<ClipChange, ItemError> {
        self.store
            .delete(record.id)
            .await
            .map_err(|e| ItemError::Catalog(e.to_string()))?;

        info!("➖ Removed clip {}: {}", record.id, record.location_key);
        Ok(ClipChange::from(record))
    }
}
