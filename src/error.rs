//! Centralized error types for pycompilecheck using thiserror
//!
//! Library seams return these typed errors; the runner and CLI wrap them in
//! `anyhow` with context.
use thiserror::Error;

/// Main error type for the change checker
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Annotation error: {0}")]
    Annotate(#[from] AnnotateError),

    #[error("Run error: {0}")]
    Run(#[from] RunError),

    #[error("Watch error: {0}")]
    Watch(#[from] WatchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to the persisted fingerprint snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read snapshot '{path}': {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("Snapshot '{path}' is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Failed to write snapshot '{path}': {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Failed to serialize snapshot: {0}")]
    SerializeFailed(String),
}

/// Errors related to walking and fingerprinting the project tree
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Path is not a directory: {0}")]
    NotADirectory(String),

    #[error("Failed to read file '{file}': {reason}")]
    FileReadFailed { file: String, reason: String },

    #[error("Failed to read metadata for '{file}': {reason}")]
    MetadataFailed { file: String, reason: String },
}

/// Errors related to inserting annotation comments
#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("Failed to read '{file}': {reason}")]
    ReadFailed { file: String, reason: String },

    #[error("File is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("Failed to write '{file}': {reason}")]
    WriteFailed { file: String, reason: String },

    #[error("No changes to annotate for {0}")]
    NoChanges(String),
}

/// Errors related to a single pipeline run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Timed out after {0} seconds waiting for the run lock")]
    LockTimeout(u64),

    #[error("Failed to acquire run lock: {0}")]
    LockFailed(String),

    #[error("Analysis task failed: {0}")]
    TaskFailed(String),
}

/// Errors related to watch mode
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to create filesystem watcher: {0}")]
    WatcherInit(String),

    #[error("Failed to watch '{path}': {reason}")]
    WatchFailed { path: String, reason: String },

    #[error("Watcher event channel closed")]
    ChannelClosed,
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors related to input validation
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Path does not exist: {0}")]
    PathNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl SnapshotError {
    /// True when the snapshot file exists but could not be parsed
    pub fn is_corrupt(&self) -> bool {
        matches!(self, SnapshotError::Corrupt { .. })
    }
}
