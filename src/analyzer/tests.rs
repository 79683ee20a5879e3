//! Scan-level tests for the analyzer

use super::*;
use std::fs;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_scan_records_relative_keys() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "app.py", "import os\n");
    write(temp.path(), "pkg/util.py", "from app import x\n");

    let outcome = scan(temp.path(), &ScanOptions::default()).unwrap();
    let keys: Vec<_> = outcome.snapshot.iter().map(|(k, _)| k.clone()).collect();
    assert_eq!(keys, vec!["app.py", "pkg/util.py"]);
    assert!(outcome.skipped.is_empty());

    let util = outcome.snapshot.get("pkg/util.py").unwrap();
    assert_eq!(util.imports, vec!["from app import x"]);
    assert_eq!(util.size, 18);
}

#[test]
fn test_rescan_without_changes_is_idempotent() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.py", "import os\nprint(os.getcwd())\n");
    write(temp.path(), "b/c.py", "x = 1\n");

    let options = ScanOptions::default();
    let first = scan(temp.path(), &options).unwrap().snapshot;
    let second = scan(temp.path(), &options).unwrap().snapshot;

    assert!(diff(&first, &second).is_empty());
    assert_eq!(first.len(), second.len());
    for (path, record) in first.iter() {
        assert!(record.same_fingerprint(second.get(path).unwrap()));
    }
}

#[test]
fn test_same_size_content_change() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.py", "x = 1\n");

    let options = ScanOptions::default();
    let previous = scan(temp.path(), &options).unwrap().snapshot;
    write(temp.path(), "a.py", "x = 2\n");
    let current = scan(temp.path(), &options).unwrap().snapshot;

    let changes = diff(&previous, &current);
    assert_eq!(describe(&changes["a.py"]), vec!["content modified"]);
}

#[test]
fn test_import_reorder_detected_by_scan() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.py", "import a\nimport b\n");

    let options = ScanOptions::default();
    let previous = scan(temp.path(), &options).unwrap().snapshot;
    write(temp.path(), "a.py", "import b\nimport a\n");
    let current = scan(temp.path(), &options).unwrap().snapshot;

    assert_eq!(
        diff(&previous, &current)["a.py"],
        vec![Change::ContentModified, Change::ImportsModified]
    );
}

#[test]
fn test_new_file_recorded_not_flagged() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "old.py", "x = 1\n");

    let options = ScanOptions::default();
    let previous = scan(temp.path(), &options).unwrap().snapshot;
    write(temp.path(), "new.py", "import sys\n");
    let current = scan(temp.path(), &options).unwrap().snapshot;

    assert!(current.contains("new.py"));
    assert!(diff(&previous, &current).is_empty());
    assert_eq!(new_files(&previous, &current), vec!["new.py".to_string()]);
}

#[test]
fn test_deleted_file_dropped() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.py", "x = 1\n");
    write(temp.path(), "b.py", "y = 1\n");

    let options = ScanOptions::default();
    let previous = scan(temp.path(), &options).unwrap().snapshot;
    fs::remove_file(temp.path().join("b.py")).unwrap();
    let current = scan(temp.path(), &options).unwrap().snapshot;

    assert!(!current.contains("b.py"));
    assert_eq!(previous.removed_in(&current), vec!["b.py".to_string()]);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_skipped() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "good.py", "x = 1\n");
    std::os::unix::fs::symlink(temp.path().join("missing-target"), temp.path().join("dangling.py"))
        .unwrap();

    let outcome = scan(temp.path(), &ScanOptions::default()).unwrap();
    assert!(outcome.snapshot.contains("good.py"));
    assert!(!outcome.snapshot.contains("dangling.py"));
    assert_eq!(outcome.skipped.len(), 1);
    assert!(outcome.skipped[0].path.ends_with("dangling.py"));
}

#[test]
fn test_scan_missing_root_fails() {
    let result = scan(Path::new("/nonexistent/root/12345"), &ScanOptions::default());
    assert!(result.is_err());
}

#[test]
fn test_matches_extension() {
    let options = ScanOptions::default();
    assert!(options.matches_extension(Path::new("a/b.py")));
    assert!(!options.matches_extension(Path::new("a/b.pyc")));
    assert!(!options.matches_extension(Path::new("a/bpy")));
    assert!(!options.matches_extension(Path::new("a/b.txt")));
}
