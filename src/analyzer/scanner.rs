use super::ScanOptions;
use crate::error::ScanError;
use crate::paths::{METADATA_DIR_NAME, relative_key};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Enumerates tracked source files under a project root
pub struct SourceWalker<'a> {
    root: PathBuf,
    options: &'a ScanOptions,
}

impl<'a> SourceWalker<'a> {
    pub fn new(root: impl AsRef<Path>, options: &'a ScanOptions) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options,
        }
    }

    /// Walk the directory and collect all tracked files, sorted by path
    pub fn walk(&self) -> Result<Vec<PathBuf>, ScanError> {
        if !self.root.exists() {
            return Err(ScanError::DirectoryNotFound(self.root.display().to_string()));
        }
        if !self.root.is_dir() {
            return Err(ScanError::NotADirectory(self.root.display().to_string()));
        }

        let respect_ignores = self.options.respect_gitignore;
        let walker = WalkBuilder::new(&self.root)
            .standard_filters(respect_ignores)
            .hidden(false)
            .require_git(false)
            .filter_entry(|entry| entry.file_name() != METADATA_DIR_NAME)
            .build();

        let mut files = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_some_and(|t| t.is_dir()) {
                continue;
            }

            let path = entry.path();
            if !self.is_source_file(path) {
                continue;
            }

            let rel = relative_key(&self.root, path);
            if self.options.exclude.is_excluded(&rel) {
                tracing::debug!("Excluded by pattern: {}", rel);
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        tracing::debug!("Found {} source files under {:?}", files.len(), self.root);
        Ok(files)
    }

    fn is_source_file(&self, path: &Path) -> bool {
        self.options.matches_extension(path)
    }
}
