//! # PyCompileCheck - change detection and annotation for Python sources
//!
//! Fingerprints every source file under a project root, compares the result
//! with the snapshot persisted by the previous run, and inserts a comment
//! into each file whose content, size, or import lines changed.
//!
//! ## Overview
//!
//! A run is a fixed pipeline: load the previous snapshot, scan the tree,
//! diff the two snapshots, annotate changed files, then persist the new
//! snapshot to `<root>/.pycompilecheck/metadata.json`. Watch mode re-runs
//! the pipeline on filesystem modifications, debounced.
//!
//! ## Key Features
//!
//! - **Streamed hashing**: SHA-256 over fixed-size chunks, independent of chunk size
//! - **Import tracking**: order-sensitive list of `import`/`from` lines per file
//! - **Header-aware annotation**: comments land below shebang and encoding lines
//! - **Run lock**: runs on one project never interleave, across processes too
//! - **Watch mode**: leading-edge debounce plus a one-run-at-a-time guard
//!
//! ## Architecture
//!
//! ```text
//!   CLI / watcher
//!        |
//!   AnalysisRunner (LocalRunner)
//!        |  run lock held
//!   snapshot::load_previous -> analyzer::scan -> analyzer::diff
//!        |                                          |
//!   snapshot::persist  <-  annotator::annotate_file
//! ```
//!
//! ## Modules
//!
//! - [`analyzer`]: scanning, fingerprinting, and change detection
//! - [`annotator`]: comment insertion below the header block
//! - [`snapshot`]: persisted file records
//! - [`runner`]: pipeline orchestration and the run lock
//! - [`watcher`]: filesystem watching with debounce
//! - [`report`]: framed JSON report for external tools
//! - [`config`]: configuration management with environment variable support
//! - [`error`]: error types
//! - [`paths`]: metadata layout and path helpers
//! - [`glob_utils`]: exclude-pattern matching
//!
//! ## Usage Example
//!
//! ```no_run
//! use pycompilecheck::config::Config;
//! use pycompilecheck::runner::LocalRunner;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let root = Path::new("./my-project");
//!     let config = Config::resolve(root, None)?;
//!
//!     let summary = LocalRunner::new(config).run_blocking(root)?;
//!     for (file, changes) in &summary.changes {
//!         println!("{}: {:?}", file, changes);
//!     }
//!
//!     Ok(())
//! }
//! ```

/// Project scanning, per-file fingerprints, and snapshot diffing
pub mod analyzer;

/// Change-annotation comments inserted into source files
pub mod annotator;

/// Configuration management with environment variable overrides
pub mod config;

/// Error types and utilities
pub mod error;

/// Exclude-pattern matching for scans
pub mod glob_utils;

/// Metadata directory layout and path utilities
pub mod paths;

/// Sentinel-framed JSON report
pub mod report;

/// Pipeline orchestration and cross-process run lock
pub mod runner;

/// Persisted snapshot of file records
pub mod snapshot;

/// Watch mode
pub mod watcher;
