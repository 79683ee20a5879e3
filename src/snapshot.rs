use crate::error::SnapshotError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Fingerprint of one scanned file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Modification time in seconds since the Unix epoch
    pub last_modified: f64,
    /// Size in bytes
    pub size: u64,
    /// Lowercase hex SHA-256 of the full content
    pub hash: String,
    /// Import lines in file order, duplicates kept
    pub imports: Vec<String>,
    /// ISO-8601 time this record was produced
    pub last_analyzed: String,
}

impl FileRecord {
    /// Compare everything except `last_analyzed`
    pub fn same_fingerprint(&self, other: &FileRecord) -> bool {
        self.last_modified == other.last_modified
            && self.size == other.size
            && self.hash == other.hash
            && self.imports == other.imports
    }
}

/// Mapping of relative path -> FileRecord as of one completed scan
///
/// Serializes as the bare JSON object so metadata.json stays readable by
/// other tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub files: BTreeMap<String, FileRecord>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn insert(&mut self, path: String, record: FileRecord) {
        self.files.insert(path, record);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileRecord)> {
        self.files.iter()
    }

    /// Paths tracked here but absent from `newer`
    pub fn removed_in(&self, newer: &Snapshot) -> Vec<String> {
        self.files
            .keys()
            .filter(|path| !newer.contains(path))
            .cloned()
            .collect()
    }
}

impl FromIterator<(String, FileRecord)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, FileRecord)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

/// Load the snapshot persisted by the previous run
///
/// A missing file yields an empty snapshot. A file that exists but does not
/// parse yields [`SnapshotError::Corrupt`]; the caller decides the policy.
pub fn load_previous(snapshot_path: &Path) -> Result<Snapshot, SnapshotError> {
    if !snapshot_path.exists() {
        tracing::debug!("Snapshot file not found, starting with empty snapshot");
        return Ok(Snapshot::default());
    }

    let content = fs::read_to_string(snapshot_path).map_err(|e| SnapshotError::ReadFailed {
        path: snapshot_path.display().to_string(),
        reason: e.to_string(),
    })?;

    let snapshot: Snapshot =
        serde_json::from_str(&content).map_err(|e| SnapshotError::Corrupt {
            path: snapshot_path.display().to_string(),
            reason: e.to_string(),
        })?;

    tracing::info!("Loaded snapshot with {} tracked files", snapshot.len());
    Ok(snapshot)
}

/// Persist `snapshot`, fully overwriting any existing file
pub fn persist(snapshot: &Snapshot, snapshot_path: &Path) -> Result<(), SnapshotError> {
    let write_failed = |e: std::io::Error| SnapshotError::WriteFailed {
        path: snapshot_path.display().to_string(),
        reason: e.to_string(),
    };

    if let Some(parent) = snapshot_path.parent() {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }

    let content = serde_json::to_string_pretty(snapshot)
        .map_err(|e| SnapshotError::SerializeFailed(e.to_string()))?;

    fs::write(snapshot_path, content).map_err(write_failed)?;

    tracing::debug!("Saved snapshot to {:?}", snapshot_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    fn record(hash: &str, size: u64) -> FileRecord {
        FileRecord {
            last_modified: 1_700_000_000.25,
            size,
            hash: hash.to_string(),
            imports: vec!["import os".to_string(), "from x import y".to_string()],
            last_analyzed: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_json_field_names() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("pkg/mod.py".to_string(), record("abc", 12));

        let value: serde_json::Value = serde_json::to_value(&snapshot).unwrap();
        let entry = &value["pkg/mod.py"];
        assert!(entry["last_modified"].is_number());
        assert_eq!(entry["size"], 12);
        assert_eq!(entry["hash"], "abc");
        assert_eq!(entry["imports"][0], "import os");
        assert_eq!(entry["last_analyzed"], "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_persist_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".pycompilecheck").join("metadata.json");

        let mut snapshot = Snapshot::new();
        snapshot.insert("a.py".to_string(), record("h1", 1));
        snapshot.insert("b/c.py".to_string(), record("h2", 2));

        persist(&snapshot, &path).unwrap();
        let loaded = load_previous(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_persist_overwrites() {
        let temp = NamedTempFile::new().unwrap();

        let mut first = Snapshot::new();
        first.insert("old.py".to_string(), record("h1", 1));
        persist(&first, temp.path()).unwrap();

        let mut second = Snapshot::new();
        second.insert("new.py".to_string(), record("h2", 2));
        persist(&second, temp.path()).unwrap();

        let loaded = load_previous(temp.path()).unwrap();
        assert!(!loaded.contains("old.py"));
        assert!(loaded.contains("new.py"));
    }

    #[test]
    fn test_load_missing_is_empty() {
        let result = load_previous(Path::new("/nonexistent/path/metadata.json"));
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn test_load_corrupt() {
        let temp = NamedTempFile::new().unwrap();
        fs::write(temp.path(), "{ not json").unwrap();

        let err = load_previous(temp.path()).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_load_wrong_shape_is_corrupt() {
        let temp = NamedTempFile::new().unwrap();
        fs::write(temp.path(), r#"{"a.py": {"size": "big"}}"#).unwrap();

        assert!(load_previous(temp.path()).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_removed_in() {
        let mut old = Snapshot::new();
        old.insert("keep.py".to_string(), record("h", 1));
        old.insert("gone.py".to_string(), record("h", 1));

        let mut new = Snapshot::new();
        new.insert("keep.py".to_string(), record("h", 1));
        new.insert("added.py".to_string(), record("h", 1));

        assert_eq!(old.removed_in(&new), vec!["gone.py".to_string()]);
    }

    #[test]
    fn test_same_fingerprint_ignores_last_analyzed() {
        let a = record("h", 3);
        let mut b = a.clone();
        b.last_analyzed = "2030-01-01T00:00:00+00:00".to_string();
        assert!(a.same_fingerprint(&b));

        b.size = 4;
        assert!(!a.same_fingerprint(&b));
    }
}
