use async_trait::async_trait;
use bjj_clip_catalog::catalog::{CatalogResult, CatalogStore, JsonCatalogStore, MemoryCatalogStore};
use bjj_clip_catalog::thumbnails::{ThumbnailError, ThumbnailGenerator, UnavailableThumbnails};
use bjj_clip_catalog::{
    CatalogError, ClipId, ClipRecord, NewClip, PreviewStatus, RunBudget, SyncService,
};
use bjj_core::CaseSensitive;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn write_video(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"mock video content").unwrap();
}

fn root_of(temp_dir: &TempDir) -> String {
    temp_dir.path().to_string_lossy().to_string()
}

fn local_record(id: ClipId, path: &Path) -> ClipRecord {
    ClipRecord::from_new(id, NewClip::local(path))
}

fn service_with(store: Arc<dyn CatalogStore>) -> SyncService {
    SyncService::new(store, Arc::new(UnavailableThumbnails::new("tests")))
}

/// Root with fileA (catalogued as 1), fileB (uncatalogued) and a catalog
/// entry 2 for missing.mp4
fn scenario_layout() -> (TempDir, Arc<MemoryCatalogStore>) {
    let temp_dir = TempDir::new().unwrap();
    let file_a = temp_dir.path().join("fileA.mp4");
    write_video(&file_a);
    write_video(&temp_dir.path().join("fileB.mp4"));

    let store = Arc::new(MemoryCatalogStore::with_records(vec![
        local_record(1, &file_a),
        local_record(2, &temp_dir.path().join("missing.mp4")),
    ]));
    (temp_dir, store)
}

/// Counts calls and optionally deletes a file when invoked
#[derive(Default)]
struct RecordingThumbnails {
    calls: AtomicUsize,
    delete_on_call: Mutex<Option<PathBuf>>,
}

#[async_trait]
impl ThumbnailGenerator for RecordingThumbnails {
    async fn generate(&self, _: &Path, clip_id: ClipId) -> Result<Option<String>, ThumbnailError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let doomed = self.delete_on_call.lock().unwrap().take();
        if let Some(path) = doomed {
            fs::remove_file(path).unwrap();
        }
        Ok(Some(format!("/thumbs/clip_{}.jpg", clip_id)))
    }
}

/// Always fails, as if the backend crashed
struct BrokenThumbnails;

#[async_trait]
impl ThumbnailGenerator for BrokenThumbnails {
    async fn generate(&self, path: &Path, _: ClipId) -> Result<Option<String>, ThumbnailError> {
        Err(ThumbnailError::Ffmpeg {
            path: path.to_path_buf(),
            message: "decoder exploded".to_string(),
        })
    }
}

/// Memory store whose delete fails for one id
struct FlakyStore {
    inner: MemoryCatalogStore,
    failing_id: ClipId,
}

#[async_trait]
impl CatalogStore for FlakyStore {
    async fn list_records(&self) -> CatalogResult<Vec<ClipRecord>> {
        self.inner.list_records().await
    }

    async fn insert(&self, clip: NewClip) -> CatalogResult<ClipId> {
        self.inner.insert(clip).await
    }

    async fn delete(&self, id: ClipId) -> CatalogResult<()> {
        if id == self.failing_id {
            return Err(CatalogError::Unavailable("disk full".to_string()));
        }
        self.inner.delete(id).await
    }

    async fn find_by_id(&self, id: ClipId) -> CatalogResult<Option<ClipRecord>> {
        self.inner.find_by_id(id).await
    }

    async fn set_thumbnail(&self, id: ClipId, thumbnail: &str) -> CatalogResult<()> {
        self.inner.set_thumbnail(id, thumbnail).await
    }
}

/// Store that cannot be read at all
struct OfflineStore;

#[async_trait]
impl CatalogStore for OfflineStore {
    async fn list_records(&self) -> CatalogResult<Vec<ClipRecord>> {
        Err(CatalogError::Unavailable("connection refused".to_string()))
    }

    async fn insert(&self, _: NewClip) -> CatalogResult<ClipId> {
        panic!("insert must not be called");
    }

    async fn delete(&self, _: ClipId) -> CatalogResult<()> {
        panic!("delete must not be called");
    }

    async fn find_by_id(&self, _: ClipId) -> CatalogResult<Option<ClipRecord>> {
        Err(CatalogError::Unavailable("connection refused".to_string()))
    }

    async fn set_thumbnail(&self, _: ClipId, _: &str) -> CatalogResult<()> {
        panic!("set_thumbnail must not be called");
    }
}

#[tokio::test]
async fn test_full_sync_scenario() {
    let (temp_dir, store) = scenario_layout();
    let service = service_with(store.clone());

    let report = service.sync(&root_of(&temp_dir)).await;

    assert_eq!(report.total_scanned, 2);
    assert_eq!(report.total_added, 1);
    assert_eq!(report.total_removed, 1);
    assert!(report.errors.is_empty());
    assert_eq!(report.added_clips[0].title, "fileB");
    assert_eq!(report.removed_clips[0].id, 2);

    let remaining = store.list_local_records().await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().any(|r| r.id == 1));
    assert!(remaining.iter().all(|r| r.id != 2));
}

#[tokio::test]
async fn test_preview_scenario() {
    let (temp_dir, store) = scenario_layout();
    let service = service_with(store.clone());

    let report = service.preview(&root_of(&temp_dir)).await;

    assert_eq!(report.root_folder_path, root_of(&temp_dir));
    assert_eq!(report.total_scanned, 2);
    assert_eq!(report.matched_files_count, 1);
    assert_eq!(report.new_files_count, 1);
    assert_eq!(report.missing_files_count, 1);
    assert_eq!(report.error_count, 0);

    let matched = report
        .items
        .iter()
        .find(|item| item.status == PreviewStatus::Matched)
        .unwrap();
    assert_eq!(matched.clip_id, Some(1));
    assert_eq!(matched.title.as_deref(), Some("fileA"));
    assert_eq!(matched.file_size, Some(18));
    assert!(matched.last_modified.is_some());

    let new = report
        .items
        .iter()
        .find(|item| item.status == PreviewStatus::New)
        .unwrap();
    assert!(new.path.ends_with("fileB.mp4"));
    assert!(new.clip_id.is_none());
    assert_eq!(new.file_size, Some(18));

    let missing = report
        .items
        .iter()
        .find(|item| item.status == PreviewStatus::Missing)
        .unwrap();
    assert_eq!(missing.clip_id, Some(2));
    assert!(missing.file_size.is_none());
    assert!(missing.last_modified.is_none());

    // Preview never mutates
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_selective_add_of_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(MemoryCatalogStore::new());
    let service = service_with(store.clone());
    let ghost = temp_dir.path().join("ghost.mp4").to_string_lossy().to_string();

    let report = service.selective_sync(&root_of(&temp_dir), &[ghost.clone()], &[]).await;

    assert_eq!(report.total_added, 0);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].path, ghost);
    assert_eq!(report.errors[0].message, "File does not exist");
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_second_sync_is_idempotent() {
    let (temp_dir, store) = scenario_layout();
    write_video(&temp_dir.path().join("nested").join("deeper").join("guard.webm"));
    let service = service_with(store);

    let first = service.sync(&root_of(&temp_dir)).await;
    assert_eq!(first.total_added, 2);

    let second = service.sync(&root_of(&temp_dir)).await;
    assert_eq!(second.total_added, 0);
    assert_eq!(second.total_removed, 0);
    assert!(second.errors.is_empty());
    assert_eq!(second.total_scanned, 3);
}

#[tokio::test]
async fn test_idempotent_with_json_store_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let videos = temp_dir.path().join("videos");
    write_video(&videos.join("a.mp4"));
    write_video(&videos.join("b.mov"));
    let catalog_path = temp_dir.path().join("data").join("catalog.json");
    let root = videos.to_string_lossy().to_string();

    let store = Arc::new(JsonCatalogStore::open(catalog_path.clone()).await.unwrap());
    let first = service_with(store).sync(&root).await;
    assert_eq!(first.total_added, 2);

    let reopened = Arc::new(JsonCatalogStore::open(catalog_path).await.unwrap());
    let second = service_with(reopened).sync(&root).await;
    assert_eq!(second.total_added, 0);
    assert_eq!(second.total_removed, 0);
}

#[tokio::test]
async fn test_partition_counts_match_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let mut records = Vec::new();
    for i in 0..6 {
        let path = temp_dir.path().join(format!("clip{}.mp4", i));
        if i % 2 == 0 {
            write_video(&path);
        }
        if i < 4 {
            records.push(local_record(i + 1, &path));
        }
    }
    let catalog_size = records.len();
    let service = service_with(Arc::new(MemoryCatalogStore::with_records(records)));

    let report = service.preview(&root_of(&temp_dir)).await;

    assert_eq!(report.matched_files_count + report.new_files_count, report.total_scanned);
    assert_eq!(report.matched_files_count + report.missing_files_count, catalog_size);
}

#[tokio::test]
async fn test_case_insensitive_identity_in_full_sync() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("Omoplata.MP4");
    write_video(&file);
    let catalogued = file.to_string_lossy().to_lowercase();
    let store = Arc::new(MemoryCatalogStore::with_records(vec![local_record(
        1,
        Path::new(&catalogued),
    )]));
    let service = service_with(store.clone());

    let report = service.sync(&root_of(&temp_dir)).await;

    assert_eq!(report.total_added, 0);
    assert_eq!(report.total_removed, 0);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_case_sensitive_policy_is_injectable() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("Omoplata.mp4");
    write_video(&file);
    let catalogued = file.to_string_lossy().to_uppercase();
    let store = Arc::new(MemoryCatalogStore::with_records(vec![local_record(
        1,
        Path::new(&catalogued),
    )]));
    let service = service_with(store).with_identity(Arc::new(CaseSensitive));

    let report = service.preview(&root_of(&temp_dir)).await;

    assert_eq!(report.matched_files_count, 0);
    assert_eq!(report.new_files_count, 1);
    assert_eq!(report.missing_files_count, 1);
}

#[tokio::test]
async fn test_selective_duplicate_guard_any_case() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("Kimura.mp4");
    write_video(&file);
    let catalogued = file.to_string_lossy().to_uppercase();
    let store = Arc::new(MemoryCatalogStore::with_records(vec![local_record(
        7,
        Path::new(&catalogued),
    )]));
    let service = service_with(store.clone());
    let request = vec![file.to_string_lossy().to_string()];

    let report = service.selective_sync(&root_of(&temp_dir), &request, &[]).await;

    assert_eq!(report.total_added, 0);
    assert_eq!(report.errors[0].message, "A clip with this file path already exists");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_selective_same_file_twice_in_one_batch() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("Kimura.mp4");
    write_video(&file);
    let store = Arc::new(MemoryCatalogStore::new());
    let service = service_with(store.clone());
    let path = file.to_string_lossy().to_string();

    let report = service
        .selective_sync(&root_of(&temp_dir), &[path.clone(), path], &[])
        .await;

    assert_eq!(report.total_added, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].message, "A clip with this file path already exists");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_selective_items_are_independent() {
    let temp_dir = TempDir::new().unwrap();
    let good = temp_dir.path().join("Heel Hook.mp4");
    write_video(&good);
    let catalogued = temp_dir.path().join("old.mp4");
    let store = Arc::new(MemoryCatalogStore::with_records(vec![local_record(3, &catalogued)]));
    let thumbnails = Arc::new(RecordingThumbnails::default());
    let service = SyncService::new(store.clone(), thumbnails.clone());

    let files = vec![
        temp_dir.path().join("nope.mp4").to_string_lossy().to_string(),
        good.to_string_lossy().to_string(),
    ];
    let report = service.selective_sync(&root_of(&temp_dir), &files, &[42, 3]).await;

    assert_eq!(report.total_added, 1);
    assert_eq!(report.added_clips[0].title, "Heel Hook");
    assert_eq!(report.total_removed, 1);
    assert_eq!(report.removed_clips[0].id, 3);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.errors[1].path, "42");
    assert_eq!(report.errors[1].message, "Clip 42 not found");

    // Selective additions never request thumbnails
    assert_eq!(thumbnails.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_extension_filter_in_reports() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("notes.txt"), b"positions").unwrap();
    write_video(&temp_dir.path().join("drill.ogg"));
    let service = service_with(Arc::new(MemoryCatalogStore::new()));

    let preview = service.preview(&root_of(&temp_dir)).await;
    assert!(preview.items.iter().all(|item| !item.path.ends_with("notes.txt")));

    let report = service.sync(&root_of(&temp_dir)).await;
    assert_eq!(report.total_scanned, 1);
    assert!(report.added_clips.iter().all(|c| !c.path.ends_with("notes.txt")));
}

#[tokio::test]
async fn test_recursive_discovery_three_levels() {
    let temp_dir = TempDir::new().unwrap();
    let deep = temp_dir.path().join("a").join("b").join("c").join("berimbolo.avi");
    write_video(&deep);
    let service = service_with(Arc::new(MemoryCatalogStore::new()));

    let report = service.sync(&root_of(&temp_dir)).await;

    assert_eq!(report.total_added, 1);
    assert_eq!(report.added_clips[0].path, deep.to_string_lossy());
}

#[tokio::test]
async fn test_full_sync_requests_thumbnails_and_stores_them() {
    let temp_dir = TempDir::new().unwrap();
    write_video(&temp_dir.path().join("a.mp4"));
    write_video(&temp_dir.path().join("b.mp4"));
    let store = Arc::new(MemoryCatalogStore::new());
    let thumbnails = Arc::new(RecordingThumbnails::default());
    let service = SyncService::new(store.clone(), thumbnails.clone());

    let report = service.sync(&root_of(&temp_dir)).await;

    assert_eq!(report.total_added, 2);
    assert_eq!(thumbnails.calls.load(Ordering::SeqCst), 2);
    let id = report.added_clips[0].id;
    let record = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(record.thumbnail, Some(format!("/thumbs/clip_{}.jpg", id)));
}

#[tokio::test]
async fn test_thumbnail_failure_is_not_a_sync_error() {
    let temp_dir = TempDir::new().unwrap();
    write_video(&temp_dir.path().join("a.mp4"));
    let store = Arc::new(MemoryCatalogStore::new());
    let service = SyncService::new(store.clone(), Arc::new(BrokenThumbnails));

    let report = service.sync(&root_of(&temp_dir)).await;

    assert_eq!(report.total_added, 1);
    assert!(report.errors.is_empty());
    let record = store.find_by_id(report.added_clips[0].id).await.unwrap().unwrap();
    assert!(record.thumbnail.is_none());
}

#[tokio::test]
async fn test_file_vanishing_mid_sync_is_an_item_error() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("a.mp4");
    let second = temp_dir.path().join("b.mp4");
    write_video(&first);
    write_video(&second);

    let thumbnails = Arc::new(RecordingThumbnails::default());
    *thumbnails.delete_on_call.lock().unwrap() = Some(second.clone());
    let store = Arc::new(MemoryCatalogStore::new());
    let service = SyncService::new(store.clone(), thumbnails);

    let report = service.sync(&root_of(&temp_dir)).await;

    assert_eq!(report.total_scanned, 2);
    assert_eq!(report.total_added, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].path, second.to_string_lossy());
    assert_eq!(report.errors[0].message, "File does not exist");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_delete_failure_does_not_block_other_removals() {
    let temp_dir = TempDir::new().unwrap();
    let records = (1..=3)
        .map(|id| local_record(id, &temp_dir.path().join(format!("gone{}.mp4", id))))
        .collect();
    let store = Arc::new(FlakyStore {
        inner: MemoryCatalogStore::with_records(records),
        failing_id: 2,
    });
    let service = service_with(store.clone());

    let report = service.sync(&root_of(&temp_dir)).await;

    assert_eq!(report.total_removed, 2);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].message.contains("disk full"));
    let remaining = store.list_records().await.unwrap();
    assert_eq!(remaining.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);
}

#[tokio::test]
async fn test_unreadable_catalog_reports_instead_of_failing() {
    let temp_dir = TempDir::new().unwrap();
    write_video(&temp_dir.path().join("a.mp4"));
    let service = service_with(Arc::new(OfflineStore));

    let report = service.sync(&root_of(&temp_dir)).await;
    assert_eq!(report.total_added, 0);
    assert!(report.errors[0].message.starts_with("Failed to read catalog"));

    let preview = service.preview(&root_of(&temp_dir)).await;
    assert_eq!(preview.error_count, 1);
}

#[tokio::test]
async fn test_validation_aborts_without_side_effects() {
    let store = Arc::new(MemoryCatalogStore::new());
    let thumbnails = Arc::new(RecordingThumbnails::default());
    let service = SyncService::new(store.clone(), thumbnails.clone());

    for (root, message) in [
        ("", "root folder path is required"),
        ("relative/videos", "root folder path must be an absolute path"),
        ("/no/such/bjj/library", "root folder does not exist"),
    ] {
        let report = service.sync(root).await;
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].message, message);
        assert_eq!(report.total_scanned, 0);

        let selective = service.selective_sync(root, &["/x.mp4".to_string()], &[1]).await;
        assert_eq!(selective.errors.len(), 1);
        assert_eq!(selective.errors[0].message, message);
    }

    assert!(store.is_empty().await);
    assert_eq!(thumbnails.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancelled_run_applies_nothing() {
    let (temp_dir, store) = scenario_layout();
    let service = service_with(store.clone());
    let budget = RunBudget::unlimited();
    budget.cancel();

    let report = service.sync_with_budget(&root_of(&temp_dir), budget).await;

    assert_eq!(report.total_added, 0);
    assert_eq!(report.total_removed, 0);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_cancelled_selective_marks_every_item() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("a.mp4");
    write_video(&file);
    let service = service_with(Arc::new(MemoryCatalogStore::new()));
    let budget = RunBudget::unlimited();
    budget.cancel();

    let report = service
        .selective_sync_with_budget(
            &root_of(&temp_dir),
            &[file.to_string_lossy().to_string()],
            &[1],
            budget,
        )
        .await;

    assert_eq!(report.total_added, 0);
    assert_eq!(report.errors.len(), 2);
    assert!(report
        .errors
        .iter()
        .all(|e| e.message == "Sync cancelled before this item was processed"));
}

#[tokio::test]
async fn test_concurrent_syncs_on_same_root_do_not_double_add() {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..5 {
        write_video(&temp_dir.path().join(format!("round{}.mp4", i)));
    }
    let store = Arc::new(MemoryCatalogStore::new());
    let service = Arc::new(service_with(store.clone()));
    let root = root_of(&temp_dir);

    let (first, second) = tokio::join!(service.sync(&root), service.sync(&root));

    assert_eq!(first.total_added + second.total_added, 5);
    assert_eq!(store.len().await, 5);
}

#[tokio::test]
async fn test_equivalent_root_spellings_keep_records() {
    let temp_dir = TempDir::new().unwrap();
    write_video(&temp_dir.path().join("armbar.mp4"));
    let store = Arc::new(MemoryCatalogStore::new());
    let service = service_with(store.clone());
    let root = root_of(&temp_dir);

    let first = service.sync(&root).await;
    assert_eq!(first.total_added, 1);
    let id = first.added_clips[0].id;

    for spelling in [format!("{}/./", root), format!("{}//", root), format!("{}/", root)] {
        let report = service.sync(&spelling).await;
        assert_eq!(report.total_added, 0, "re-added under {}", spelling);
        assert_eq!(report.total_removed, 0, "removed under {}", spelling);
        assert!(report.errors.is_empty());
    }

    let records = store.list_local_records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert_eq!(records[0].location_key, temp_dir.path().join("armbar.mp4").to_string_lossy());
}

#[tokio::test]
async fn test_non_canonical_paths_are_stored_normalized() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("triangle.mp4");
    write_video(&file);
    let store = Arc::new(MemoryCatalogStore::new());
    let service = service_with(store.clone());
    let root = root_of(&temp_dir);

    let spelled = format!("{}/./triangle.mp4", root);
    let added = service.selective_sync(&root, &[spelled], &[]).await;
    assert_eq!(added.total_added, 1);
    assert_eq!(added.added_clips[0].path, file.to_string_lossy());

    let again = service
        .selective_sync(&root, &[format!("{}//triangle.mp4", root)], &[])
        .await;
    assert_eq!(again.total_added, 0);
    assert_eq!(again.errors[0].message, "A clip with this file path already exists");

    let preview = service.preview(&format!("{}/./", root)).await;
    assert_eq!(preview.matched_files_count, 1);
    assert_eq!(preview.new_files_count, 0);
    assert_eq!(preview.missing_files_count, 0);
}
