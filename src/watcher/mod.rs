//! Watch mode: re-run the pipeline when tracked sources are modified
//!
//! Filesystem events from `notify` are forwarded into a tokio channel and
//! consumed by a single loop. A qualifying event passes the [`Debouncer`],
//! then the [`RunGuard`], and only then spawns a run on the
//! [`AnalysisRunner`]. Runs never block event delivery.

mod debounce;

pub use debounce::{Debouncer, RunGuard, RunPermit};

use crate::analyzer::ScanOptions;
use crate::error::WatchError;
use crate::paths::ProjectPaths;
use crate::runner::AnalysisRunner;
use anyhow::Result;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// First path of `event` that should trigger a run, if any
///
/// Only modifications count. A path qualifies when it carries the source
/// extension, is not a directory, and is outside the metadata directory.
pub fn relevant_path<'a>(
    event: &'a Event,
    paths: &ProjectPaths,
    options: &ScanOptions,
) -> Option<&'a Path> {
    if !matches!(event.kind, EventKind::Modify(_)) {
        return None;
    }

    event
        .paths
        .iter()
        .map(PathBuf::as_path)
        .find(|path| {
            options.matches_extension(path) && !path.is_dir() && !paths.is_metadata_path(path)
        })
}

/// Watches one project root and triggers analysis runs
pub struct ProjectWatcher {
    paths: ProjectPaths,
    options: ScanOptions,
    runner: Arc<dyn AnalysisRunner>,
    debouncer: Debouncer,
    guard: RunGuard,
    cancel_token: CancellationToken,
}

impl ProjectWatcher {
    pub fn new(
        root: impl AsRef<Path>,
        options: ScanOptions,
        debounce: Duration,
        runner: Arc<dyn AnalysisRunner>,
    ) -> Self {
        Self {
            paths: ProjectPaths::new(root),
            options,
            runner,
            debouncer: Debouncer::new(debounce),
            guard: RunGuard::new(),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    /// Token that stops [`ProjectWatcher::watch`] when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn guard(&self) -> &RunGuard {
        &self.guard
    }

    /// Process one event received at `now`
    ///
    /// Returns the handle of the spawned run when the event triggered one.
    /// Must be called from within a tokio runtime.
    pub fn handle_event(&mut self, event: &Event, now: Instant) -> Option<JoinHandle<()>> {
        let path = relevant_path(event, &self.paths, &self.options)?.to_path_buf();

        if !self.debouncer.should_trigger(now) {
            tracing::debug!("Debounced event for {:?}", path);
            return None;
        }

        let Some(permit) = self.guard.try_begin() else {
            tracing::debug!("Analysis already running, ignoring change to {:?}", path);
            return None;
        };

        tracing::info!("Detected change in {:?}, running analysis", path);
        let runner = Arc::clone(&self.runner);
        let root = self.paths.root().to_path_buf();

        Some(tokio::spawn(async move {
            let _permit = permit;
            match runner.run(&root).await {
                Ok(summary) => tracing::info!(
                    "Watch run finished: {} changed, {} annotated",
                    summary.changes.len(),
                    summary.annotated
                ),
                Err(e) => tracing::error!("Analysis run failed: {:#}", e),
            }
        }))
    }

    /// Watch the root until cancelled or interrupted with Ctrl-C
    ///
    /// Runs still in flight when the loop stops are not awaited.
    pub async fn watch(mut self) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            notify::Config::default(),
        )
        .map_err(|e| WatchError::WatcherInit(e.to_string()))?;

        watcher
            .watch(self.paths.root(), RecursiveMode::Recursive)
            .map_err(|e| WatchError::WatchFailed {
                path: self.paths.root().display().to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            "Watching {} for changes (debounce {:?})",
            self.paths.root().display(),
            self.debouncer.window()
        );

        let cancel_token = self.cancel_token.clone();
        // One listener for the whole loop
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    tracing::info!("Watch cancelled");
                    break;
                }
                _ = &mut ctrl_c => {
                    tracing::info!("Interrupted, stopping watcher");
                    break;
                }
                received = rx.recv() => match received {
                    Some(Ok(event)) => {
                        self.handle_event(&event, Instant::now());
                    }
                    Some(Err(e)) => tracing::warn!("Watch error: {}", e),
                    None => return Err(WatchError::ChannelClosed.into()),
                },
            }
        }

        Ok(())
    }
}
