//! Analysis runner: one full load -> scan -> diff -> annotate -> persist pass
//!
//! [`AnalysisRunner`] is the seam the watcher triggers through. The only
//! production implementation is [`LocalRunner`], which runs the pipeline
//! in-process.

mod run_lock;

pub use run_lock::RunLock;

use crate::analyzer::{self, ChangeSet, ScanOptions, SkippedFile, describe, fingerprint_file};
use crate::annotator;
use crate::config::{Config, CorruptSnapshotPolicy};
use crate::error::{RunError, ValidationError};
use crate::paths::ProjectPaths;
use crate::snapshot::{self, Snapshot};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Something that can run the full analysis pipeline for a project root
#[async_trait]
pub trait AnalysisRunner: Send + Sync {
    async fn run(&self, root: &Path) -> Result<RunSummary>;
}

/// What one pipeline run did
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub root: PathBuf,
    /// Snapshot as persisted at the end of the run
    pub snapshot: Snapshot,
    /// Changed paths with their ordered changes
    pub changes: ChangeSet,
    /// Paths seen for the first time
    pub new_files: Vec<String>,
    /// Paths tracked previously but not found this run
    pub removed_files: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub annotated: usize,
    pub annotation_failures: usize,
    /// True when a corrupt snapshot was discarded under the reset policy
    pub snapshot_reset: bool,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn files_scanned(&self) -> usize {
        self.snapshot.len()
    }
}

/// Runs the pipeline in the current process
#[derive(Debug, Clone)]
pub struct LocalRunner {
    config: Config,
}

impl LocalRunner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the pipeline synchronously
    pub fn run_blocking(&self, root: &Path) -> Result<RunSummary> {
        let start = Instant::now();

        if !root.exists() {
            return Err(ValidationError::PathNotFound(root.display().to_string()).into());
        }
        if !root.is_dir() {
            return Err(ValidationError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            ))
            .into());
        }

        let paths = ProjectPaths::new(root);
        paths.ensure_metadata_dir()?;

        let timeout = Duration::from_secs(self.config.analysis.lock_timeout_secs);
        let _lock = RunLock::acquire_blocking(&paths.lock_path(), timeout)?
            .ok_or(RunError::LockTimeout(self.config.analysis.lock_timeout_secs))?;

        let (previous, snapshot_reset) = self.load_previous(&paths)?;

        let options = ScanOptions::from_config(&self.config.analysis)?;
        let outcome = analyzer::scan(root, &options)
            .with_context(|| format!("Failed to scan {}", root.display()))?;
        let mut current = outcome.snapshot;

        let changes = analyzer::diff(&previous, &current);
        let new_files = analyzer::new_files(&previous, &current);
        let removed_files = previous.removed_in(&current);

        let mut annotated = 0;
        let mut annotation_failures = 0;

        if self.config.annotation.enabled {
            for (rel, file_changes) in &changes {
                let path = root.join(rel);
                let descriptions = describe(file_changes);

                match annotator::annotate_file(
                    &path,
                    &descriptions,
                    &self.config.annotation.header_prefixes,
                ) {
                    Ok(()) => {
                        annotated += 1;
                        tracing::info!("Annotated {}: {}", rel, descriptions.join(", "));
                        // Track the file as it is now on disk so the next run
                        // does not flag our own comment as a change
                        match fingerprint_file(
                            &path,
                            options.chunk_size,
                            &options.import_prefixes,
                        ) {
                            Ok(record) => current.insert(rel.clone(), record),
                            Err(e) => {
                                tracing::warn!("Failed to refresh fingerprint of {}: {}", rel, e)
                            }
                        }
                    }
                    Err(e) => {
                        annotation_failures += 1;
                        tracing::warn!("Error adding annotation to {}: {}", rel, e);
                    }
                }
            }
        } else if !changes.is_empty() {
            tracing::info!("{} changed files (annotation disabled)", changes.len());
        }

        snapshot::persist(&current, &paths.snapshot_path())?;

        let summary = RunSummary {
            root: root.to_path_buf(),
            snapshot: current,
            changes,
            new_files,
            removed_files,
            skipped: outcome.skipped,
            annotated,
            annotation_failures,
            snapshot_reset,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "Analysis complete: {} files, {} changed, {} new, {} removed in {}ms",
            summary.files_scanned(),
            summary.changes.len(),
            summary.new_files.len(),
            summary.removed_files.len(),
            summary.duration_ms
        );

        Ok(summary)
    }

    /// Load the previous snapshot, applying the corrupt-file policy
    fn load_previous(&self, paths: &ProjectPaths) -> Result<(Snapshot, bool)> {
        let snapshot_path = paths.snapshot_path();

        match snapshot::load_previous(&snapshot_path) {
            Ok(previous) => Ok((previous, false)),
            Err(e) if e.is_corrupt() => match self.config.snapshot.on_corrupt {
                CorruptSnapshotPolicy::Abort => Err(e.into()),
                CorruptSnapshotPolicy::Reset => {
                    let backup = paths.corrupt_backup_path();
                    tracing::warn!("{}; backing it up to {:?} and starting fresh", e, backup);
                    std::fs::rename(&snapshot_path, &backup).with_context(|| {
                        format!("Failed to back up corrupt snapshot to {}", backup.display())
                    })?;
                    Ok((Snapshot::default(), true))
                }
            },
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl AnalysisRunner for LocalRunner {
    async fn run(&self, root: &Path) -> Result<RunSummary> {
        let runner = self.clone();
        let root = root.to_path_buf();

        tokio::task::spawn_blocking(move || runner.run_blocking(&root))
            .await
            .map_err(|e| RunError::TaskFailed(e.to_string()))?
    }
}
