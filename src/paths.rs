//! Project-local metadata layout and path helpers
//!
//! Everything pycompilecheck persists for a project lives under
//! `<root>/.pycompilecheck/`. User-wide configuration falls back to the
//! platform config directory.
use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// Name of the reserved metadata directory inside a project root
pub const METADATA_DIR_NAME: &str = ".pycompilecheck";

/// Snapshot file name inside the metadata directory
pub const SNAPSHOT_FILE_NAME: &str = "metadata.json";

/// Paths derived from one project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns: {root}/.pycompilecheck
    pub fn metadata_dir(&self) -> PathBuf {
        self.root.join(METADATA_DIR_NAME)
    }

    /// Returns: {root}/.pycompilecheck/metadata.json
    pub fn snapshot_path(&self) -> PathBuf {
        self.metadata_dir().join(SNAPSHOT_FILE_NAME)
    }

    /// Returns: {root}/.pycompilecheck/metadata.json.corrupt
    pub fn corrupt_backup_path(&self) -> PathBuf {
        self.metadata_dir()
            .join(format!("{}.corrupt", SNAPSHOT_FILE_NAME))
    }

    /// Returns: {root}/.pycompilecheck/run.lock
    pub fn lock_path(&self) -> PathBuf {
        self.metadata_dir().join("run.lock")
    }

    /// Returns: {root}/.pycompilecheck/config.toml
    pub fn project_config_path(&self) -> PathBuf {
        self.metadata_dir().join("config.toml")
    }

    /// Create the metadata directory if it doesn't exist
    pub fn ensure_metadata_dir(&self) -> Result<PathBuf> {
        let dir = self.metadata_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create metadata directory: {}", dir.display()))?;
        Ok(dir)
    }

    /// True when `path` lies inside the metadata directory of this root
    pub fn is_metadata_path(&self, path: &Path) -> bool {
        match path.strip_prefix(&self.root) {
            Ok(rel) => is_under_metadata_dir(rel),
            Err(_) => is_under_metadata_dir(path),
        }
    }
}

/// True when any component of `rel` is the reserved metadata directory
pub fn is_under_metadata_dir(rel: &Path) -> bool {
    rel.components()
        .any(|c| matches!(c, Component::Normal(name) if name == METADATA_DIR_NAME))
}

/// Get the user-wide config file path
///
/// Returns: {config_dir}/pycompilecheck/config.toml
pub fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pycompilecheck")
        .join("config.toml")
}

/// Canonicalize a user-supplied project path
pub fn normalize_path(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path)
        .with_context(|| format!("Failed to canonicalize path: {}", path.display()))
}

/// Render a path relative to `root` as a snapshot key with `/` separators
///
/// Only Windows separators are rewritten; on Unix a `\` is part of the
/// file name and stays in the key.
pub fn relative_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path).to_string_lossy();
    if cfg!(windows) {
        rel.replace('\\', "/")
    } else {
        rel.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout() {
        let paths = ProjectPaths::new("/work/proj");
        assert_eq!(paths.metadata_dir(), PathBuf::from("/work/proj/.pycompilecheck"));
        assert_eq!(
            paths.snapshot_path(),
            PathBuf::from("/work/proj/.pycompilecheck/metadata.json")
        );
        assert_eq!(
            paths.lock_path(),
            PathBuf::from("/work/proj/.pycompilecheck/run.lock")
        );
        assert!(
            paths
                .corrupt_backup_path()
                .ends_with(".pycompilecheck/metadata.json.corrupt")
        );
    }

    #[test]
    fn test_is_metadata_path() {
        let paths = ProjectPaths::new("/work/proj");
        assert!(paths.is_metadata_path(Path::new("/work/proj/.pycompilecheck/x.py")));
        assert!(paths.is_metadata_path(Path::new("/work/proj/sub/.pycompilecheck/y.py")));
        assert!(!paths.is_metadata_path(Path::new("/work/proj/pkg/mod.py")));
        // Only whole components count
        assert!(!paths.is_metadata_path(Path::new("/work/proj/.pycompilecheck_old/m.py")));
    }

    #[test]
    fn test_relative_key() {
        let key = relative_key(Path::new("/a/b"), Path::new("/a/b/pkg/mod.py"));
        assert_eq!(key, "pkg/mod.py");

        // Paths outside the root are kept whole
        let key = relative_key(Path::new("/a/b"), Path::new("/c/d.py"));
        assert_eq!(key, "/c/d.py");
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_key_keeps_backslash_in_name() {
        let key = relative_key(Path::new("/a/b"), Path::new("/a/b/pkg/odd\\name.py"));
        assert_eq!(key, "pkg/odd\\name.py");
        assert_eq!(
            Path::new("/a/b").join(&key),
            PathBuf::from("/a/b/pkg/odd\\name.py")
        );
    }

    #[cfg(windows)]
    #[test]
    fn test_relative_key_windows_separators() {
        let key = relative_key(Path::new(r"C:\proj"), Path::new(r"C:\proj\pkg\mod.py"));
        assert_eq!(key, "pkg/mod.py");
    }

    #[test]
    fn test_ensure_metadata_dir() {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::new(temp.path());
        let dir = paths.ensure_metadata_dir().unwrap();
        assert!(dir.is_dir());
        // Idempotent
        paths.ensure_metadata_dir().unwrap();
    }

    #[test]
    fn test_normalize_path_missing() {
        assert!(normalize_path(Path::new("/nonexistent/path/12345")).is_err());
    }

    #[test]
    fn test_user_config_path() {
        let path = user_config_path();
        assert!(path.ends_with("pycompilecheck/config.toml"));
    }
}
