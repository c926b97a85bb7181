//! Three-way classification of scanned files against catalog records

use bjj_core::{ClipRecord, PathIdentity};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// A scanned file paired with its catalog record
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedFile {
    pub path: PathBuf,
    pub record: ClipRecord,
}

/// Result of reconciling one scan with the catalog.
///
/// `matched.len() + new_files.len()` equals the number of scanned paths and
/// `matched.len() + missing.len()` equals the number of catalog records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Files with a catalog record, in scan order
    pub matched: Vec<MatchedFile>,

    /// Files without a catalog record, in scan order
    pub new_files: Vec<PathBuf>,

    /// Records whose file was not found, ordered by id
    pub missing: Vec<ClipRecord>,
}

impl Classification {
    pub fn total_scanned(&self) -> usize {
        self.matched.len() + self.new_files.len()
    }
}

/// Matches scanned paths to catalog records under a path identity policy
#[derive(Debug, Clone)]
pub struct Reconciler {
    identity: Arc<dyn PathIdentity>,
}

impl Reconciler {
    pub fn new(identity: Arc<dyn PathIdentity>) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &dyn PathIdentity {
        self.identity.as_ref()
    }

    /// Classify `paths` against local `records`.
    ///
    /// Each record matches at most one file. When several records share an
    /// identity key the lowest id wins and the rest are reported missing.
    pub fn classify(&self, paths: &[PathBuf], mut records: Vec<ClipRecord>) -> Classification {
        records.sort_by_key(|record| record.id);

        let mut lookup: HashMap<String, usize> = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            lookup
                .entry(self.identity.key(&record.location_key))
                .or_insert(index);
        }

        let mut claimed = vec![false; records.len()];
        let mut matched_indices = Vec::new();
        let mut new_files = Vec::new();

        for path in paths {
            let key = self.identity.key(&path.to_string_lossy());
            match lookup.get(&key) {
                Some(&index) if !claimed[index] => {
                    claimed[index] = true;
                    matched_indices.push((path.clone(), index));
                }
                _ => new_files.push(path.clone()),
            }
        }

        let mut slots: Vec<Option<ClipRecord>> = records.into_iter().map(Some).collect();
        let matched = matched_indices
            .into_iter()
            .filter_map(|(path, index)| {
                slots[index].take().map(|record| MatchedFile { path, record })
            })
            .collect();
        let missing = slots.into_iter().flatten().collect();

        Classification {
            matched,
            new_files,
            missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bjj_core::{CaseInsensitive, CaseSensitive, NewClip};
    use std::path::Path;

    fn record(id: i64, path: &str) -> ClipRecord {
        ClipRecord::from_new(id, NewClip::local(Path::new(path)))
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(Arc::new(CaseInsensitive))
    }

    #[test]
    fn test_three_way_classification() {
        let paths = vec![PathBuf::from("/v/fileA.mp4"), PathBuf::from("/v/fileB.mp4")];
        let records = vec![record(1, "/v/fileA.mp4"), record(2, "/v/missing.mp4")];

        let result = reconciler().classify(&paths, records);

        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].record.id, 1);
        assert_eq!(result.new_files, vec![PathBuf::from("/v/fileB.mp4")]);
        assert_eq!(result.missing.len(), 1);
        assert_eq!(result.missing[0].id, 2);
        assert_eq!(result.total_scanned(), 2);
    }

    #[test]
    fn test_case_insensitive_match() {
        let paths = vec![PathBuf::from(r"c:\v\A.MP4")];
        let records = vec![record(1, r"C:\V\a.mp4")];

        let result = reconciler().classify(&paths, records);

        assert_eq!(result.matched.len(), 1);
        assert!(result.new_files.is_empty());
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_case_sensitive_policy_splits_pair() {
        let paths = vec![PathBuf::from("/v/A.mp4")];
        let records = vec![record(1, "/v/a.mp4")];

        let result = Reconciler::new(Arc::new(CaseSensitive)).classify(&paths, records);

        assert!(result.matched.is_empty());
        assert_eq!(result.new_files.len(), 1);
        assert_eq!(result.missing.len(), 1);
    }

    #[test]
    fn test_duplicate_records_lowest_id_matches() {
        let paths = vec![PathBuf::from("/v/a.mp4")];
        let records = vec![record(5, "/V/A.mp4"), record(3, "/v/a.mp4")];

        let result = reconciler().classify(&paths, records);

        assert_eq!(result.matched[0].record.id, 3);
        assert_eq!(result.missing.iter().map(|r| r.id).collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_case_variant_files_share_one_record() {
        let paths = vec![PathBuf::from("/v/a.mp4"), PathBuf::from("/v/A.mp4")];
        let records = vec![record(1, "/v/a.mp4")];

        let result = reconciler().classify(&paths, records);

        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.new_files, vec![PathBuf::from("/v/A.mp4")]);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_partition_holds() {
        let paths: Vec<PathBuf> = (0..20).map(|i| PathBuf::from(format!("/v/{}.mp4", i))).collect();
        let records: Vec<ClipRecord> = (10..30)
            .map(|i| record(i, &format!("/V/{}.MP4", i)))
            .collect();
        let record_count = records.len();

        let result = reconciler().classify(&paths, records);

        assert_eq!(result.matched.len() + result.new_files.len(), paths.len());
        assert_eq!(result.matched.len() + result.missing.len(), record_count);
        assert_eq!(result.matched.len(), 10);
    }

    #[test]
    fn test_empty_inputs() {
        let result = reconciler().classify(&[], Vec::new());
        assert_eq!(result, Classification::default());
    }
}
