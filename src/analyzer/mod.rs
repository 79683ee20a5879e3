//! Project scanning, fingerprinting, and change detection
//!
//! The pipeline is a chain of plain functions over explicit values:
//! [`crate::snapshot::load_previous`] -> [`scan`] -> [`diff`] ->
//! [`crate::snapshot::persist`]. Nothing here keeps state between runs.

mod diff;
mod fingerprint;
mod scanner;

pub use diff::{Change, ChangeSet, compare, describe, diff};
pub use fingerprint::{detect_imports, extract_imports, fingerprint_file, hash_file};
pub use scanner::SourceWalker;

use crate::config::AnalysisConfig;
use crate::error::{ConfigError, ScanError};
use crate::glob_utils::ExcludeMatcher;
use crate::paths::relative_key;
use crate::snapshot::Snapshot;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Settings that drive one scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Extension without the dot
    pub extension: String,
    pub import_prefixes: Vec<String>,
    pub exclude: ExcludeMatcher,
    pub respect_gitignore: bool,
    pub chunk_size: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        let config = AnalysisConfig::default();
        Self {
            extension: config.extension,
            import_prefixes: config.import_prefixes,
            exclude: ExcludeMatcher::none(),
            respect_gitignore: config.respect_gitignore,
            chunk_size: config.hash_chunk_size,
        }
    }
}

impl ScanOptions {
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            extension: config.extension.clone(),
            import_prefixes: config.import_prefixes.clone(),
            exclude: ExcludeMatcher::new(&config.exclude_patterns)?,
            respect_gitignore: config.respect_gitignore,
            chunk_size: config.hash_chunk_size,
        })
    }

    /// True when the file name ends in `.{extension}`
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_suffix(self.extension.as_str()))
            .is_some_and(|stem| stem.ends_with('.'))
    }
}

/// A file the scan could not fingerprint
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of one scan: the current snapshot plus anything left out
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub snapshot: Snapshot,
    pub skipped: Vec<SkippedFile>,
}

/// Scan `root` and build the current snapshot
///
/// Fails only when the root itself cannot be walked. Per-file read errors are
/// logged and collected in [`ScanOutcome::skipped`].
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ScanOutcome, ScanError> {
    let files = SourceWalker::new(root, options).walk()?;

    let results: Vec<_> = files
        .par_iter()
        .map(|path| {
            let key = relative_key(root, path);
            let record = fingerprint_file(path, options.chunk_size, &options.import_prefixes);
            (path, key, record)
        })
        .collect();

    let mut outcome = ScanOutcome::default();
    for (path, key, record) in results {
        match record {
            Ok(record) => outcome.snapshot.insert(key, record),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", key, e);
                outcome.skipped.push(SkippedFile {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        "Scanned {} files ({} skipped)",
        outcome.snapshot.len(),
        outcome.skipped.len()
    );
    Ok(outcome)
}

/// Paths in `current` with no counterpart in `previous`
pub fn new_files(previous: &Snapshot, current: &Snapshot) -> Vec<String> {
    current
        .iter()
        .filter(|(path, _)| !previous.contains(path))
        .map(|(path, _)| path.clone())
        .collect()
}

#[cfg(test)]
mod tests;
