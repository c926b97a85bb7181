use bjj_core::{ClipRecord, FileSystemEntry, ScanOutcome};
use std::path::Path;
use tracing::info;

use super::{ItemError, PreviewItem, PreviewReport, PreviewStatus, RunBudget, SyncService};

impl SyncService {
    pub(super) async fn run_preview(&self, root: &Path, budget: &RunBudget) -> PreviewReport {
        let root_display = root.to_string_lossy().to_string();
        info!("👀 Preview of {}", root.display());

        let records = match self.store.list_local_records().await {
            Ok(records) => records,
            Err(e) => {
                return PreviewReport::failed(&root_display, format!("Failed to read catalog: {}", e))
            }
        };

        let outcome = match self.scan_root(root, budget).await {
            Ok(outcome) => outcome,
            Err(message) => return PreviewReport::failed(&root_display, message),
        };

        let report = self.build_preview(root_display, records, outcome);

        info!(
            "📊 Preview of {}: {} matched, {} new, {} missing, {} errors",
            report.root_folder_path,
            report.matched_files_count,
            report.new_files_count,
            report.missing_files_count,
            report.error_count
        );

        report
    }

    /// Describe a finished scan against the catalog without touching either
    fn build_preview(
        &self,
        root_display: String,
        records: Vec<ClipRecord>,
        outcome: ScanOutcome,
    ) -> PreviewReport {
        let mut report = PreviewReport::new(root_display.clone());
        report.total_scanned = outcome.files.len();

        if outcome.interrupted {
            report.push(
                PreviewItem::new(root_display, PreviewStatus::Error)
                    .into_error("Scan stopped before completion; results are partial"),
            );
        }

        for dir in &outcome.skipped {
            report.push(
                PreviewItem::new(dir.to_string_lossy(), PreviewStatus::Error)
                    .into_error(ItemError::UnreadableDirectory.to_string()),
            );
        }

        let classification = self.reconciler.classify(&outcome.files, records);

        for matched in &classification.matched {
            let item = PreviewItem::new(matched.path.to_string_lossy(), PreviewStatus::Matched)
                .with_record(&matched.record);
            report.push(with_file_stat(item, &matched.path));
        }

        for path in &classification.new_files {
            let item = PreviewItem::new(path.to_string_lossy(), PreviewStatus::New);
            report.push(with_file_stat(item, path));
        }

        for record in &classification.missing {
            report.push(missing_item(record));
        }

        report
    }
}

/// Fill in size and modification time, or downgrade the item on failure
fn with_file_stat(mut item: PreviewItem, path: &Path) -> PreviewItem {
    item.directory = path.parent().map(|dir| dir.to_string_lossy().to_string());

    match FileSystemEntry::stat(path) {
        Ok(entry) => {
            item.file_size = Some(entry.size_bytes);
            item.last_modified = entry.modified;
            item
        }
        Err(e) => item.into_error(ItemError::Stat(e.to_string()).to_string()),
    }
}

fn missing_item(record: &ClipRecord) -> PreviewItem {
    let mut item =
        PreviewItem::new(record.location_key.clone(), PreviewStatus::Missing).with_record(record);
    item.directory = Path::new(&record.location_key)
        .parent()
        .map(|dir| dir.to_string_lossy().to_string());
    item
}
