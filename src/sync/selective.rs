use bjj_core::{normalize_path, ClipId, NewClip};
use std::path::Path;
use tracing::{info, warn};

use super::{ClipChange, ItemError, RunBudget, SyncReport, SyncService};

impl SyncService {
    pub(super) async fn run_selective(
        &self,
        files_to_add: &[String],
        clip_ids_to_remove: &[ClipId],
        budget: &RunBudget,
    ) -> SyncReport {
        info!(
            "🎯 Selective sync: {} to add, {} to remove",
            files_to_add.len(),
            clip_ids_to_remove.len()
        );

        let mut report = SyncReport {
            total_scanned: files_to_add.len(),
            ..SyncReport::default()
        };

        for file in files_to_add {
            let result = if budget.is_exhausted() {
                Err(ItemError::Cancelled)
            } else {
                self.add_selected_file(file).await
            };

            match result {
                Ok(change) => report.record_added(change),
                Err(e) => {
                    warn!("Not adding {}: {}", file, e);
                    report.record_error(file.clone(), e.to_string());
                }
            }
        }

        for &id in clip_ids_to_remove {
            let result = if budget.is_exhausted() {
                Err(ItemError::Cancelled)
            } else {
                self.remove_selected_clip(id).await
            };

            match result {
                Ok(change) => report.record_removed(change),
                Err(e) => {
                    warn!("Not removing clip {}: {}", id, e);
                    report.record_error(id.to_string(), e.to_string());
                }
            }
        }

        info!(
            "✅ Selective sync finished: {} added, {} removed, {} errors",
            report.total_added,
            report.total_removed,
            report.errors.len()
        );

        report
    }

    /// No thumbnail is requested for selectively added clips
    async fn add_selected_file(&self, file: &str) -> Result<ClipChange, ItemError> {
        let path = Path::new(file);
        if !path.is_absolute() || !path.is_file() {
            return Err(ItemError::FileMissing);
        }

        let existing = self
            .store
            .find_by_normalized_path(file, self.identity())
            .await
            .map_err(|e| ItemError::Catalog(e.to_string()))?;
        if existing.is_some() {
            return Err(ItemError::DuplicatePath);
        }

        let clip = NewClip::local(&normalize_path(path));
        let title = clip.title.clone();
        let location = clip.location_key.clone();
        let id = self
            .store
            .insert(clip)
            .await
            .map_err(|e| ItemError::Catalog(e.to_string()))?;

        info!("➕ Added clip {}: {}", id, location);
        Ok(ClipChange {
            id,
            path: location,
            title,
        })
    }

    async fn remove_selected_clip(&self, id: ClipId) -> Result<ClipChange, ItemError> {
        let record = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| ItemError::Catalog(e.to_string()))?
            .ok_or(ItemError::ClipNotFound(id))?;

        self.store
            .delete(id)
            .await
            .map_err(|e| ItemError::Catalog(e.to_string()))?;

        info!("➖ Removed clip {}: {}", id, record.location_key);
        Ok(ClipChange::from(&record))
    }
}
