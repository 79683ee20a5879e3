//! Configuration system for pycompilecheck
//!
//! Supports loading from multiple sources with priority:
//! CLI args > Environment variables > Config file > Defaults
use crate::error::{CheckError, ConfigError};
use crate::paths::{ProjectPaths, user_config_path};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Scanning and fingerprinting configuration
    pub analysis: AnalysisConfig,

    /// Annotation comment configuration
    pub annotation: AnnotationConfig,

    /// Persisted snapshot configuration
    pub snapshot: SnapshotConfig,

    /// Watch mode configuration
    pub watch: WatchConfig,
}

/// Scanning and fingerprinting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Source file extension to track, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Line prefixes (after trimming) that mark an import statement
    #[serde(default = "default_import_prefixes")]
    pub import_prefixes: Vec<String>,

    /// Glob patterns for relative paths to leave out of the scan
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Honour .gitignore and .ignore files while walking
    #[serde(default)]
    pub respect_gitignore: bool,

    /// Read buffer size used while hashing
    #[serde(default = "default_hash_chunk_size")]
    pub hash_chunk_size: usize,

    /// How long a run waits for another process holding the run lock
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_secs: u64,
}

/// Annotation comment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationConfig {
    /// Insert comments into changed files
    #[serde(default = "default_annotation_enabled")]
    pub enabled: bool,

    /// Leading lines with these prefixes stay above the inserted comment
    #[serde(default = "default_header_prefixes")]
    pub header_prefixes: Vec<String>,
}

/// What to do when metadata.json exists but cannot be parsed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorruptSnapshotPolicy {
    /// Fail the run and leave the file untouched
    #[default]
    Abort,
    /// Back the file up and continue with an empty previous snapshot
    Reset,
}

impl std::str::FromStr for CorruptSnapshotPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "reset" => Ok(Self::Reset),
            other => Err(ConfigError::InvalidValue {
                key: "snapshot.on_corrupt".to_string(),
                reason: format!("must be 'abort' or 'reset', got '{}'", other),
            }),
        }
    }
}

/// Persisted snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub on_corrupt: CorruptSnapshotPolicy,
}

/// Watch mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Quiet window after a triggered run during which events are dropped
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

// Default value functions
fn default_extension() -> String {
    "py".to_string()
}

fn default_import_prefixes() -> Vec<String> {
    vec!["import ".to_string(), "from ".to_string()]
}

fn default_hash_chunk_size() -> usize {
    4096
}

fn default_lock_timeout() -> u64 {
    30
}

fn default_annotation_enabled() -> bool {
    true
}

fn default_header_prefixes() -> Vec<String> {
    vec![
        "#!".to_string(),
        "# -*-".to_string(),
        "# coding".to_string(),
    ]
}

fn default_debounce_ms() -> u64 {
    2000
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            import_prefixes: default_import_prefixes(),
            exclude_patterns: Vec::new(),
            respect_gitignore: false,
            hash_chunk_size: default_hash_chunk_size(),
            lock_timeout_secs: default_lock_timeout(),
        }
    }
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            enabled: default_annotation_enabled(),
            header_prefixes: default_header_prefixes(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, CheckError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load the project config, then the user config, or fall back to defaults
    pub fn load_for_project(root: &Path) -> Result<Self, CheckError> {
        let project_path = ProjectPaths::new(root).project_config_path();
        if project_path.exists() {
            tracing::info!("Loading config from: {}", project_path.display());
            return Self::from_file(&project_path);
        }

        let user_path = user_config_path();
        if user_path.exists() {
            tracing::info!("Loading config from: {}", user_path.display());
            return Self::from_file(&user_path);
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), CheckError> {
        if self.analysis.extension.trim().is_empty() {
            return Err(invalid("analysis.extension", "must not be empty"));
        }

        if self.analysis.extension.starts_with('.') {
            return Err(invalid(
                "analysis.extension",
                "must not start with '.', e.g. use \"py\"",
            ));
        }

        if self.analysis.import_prefixes.is_empty() {
            return Err(invalid("analysis.import_prefixes", "must not be empty"));
        }

        if self.analysis.hash_chunk_size == 0 {
            return Err(invalid("analysis.hash_chunk_size", "must be greater than 0"));
        }

        if self.annotation.header_prefixes.is_empty() {
            return Err(invalid("annotation.header_prefixes", "must not be empty"));
        }

        if self.watch.debounce_ms == 0 {
            return Err(invalid("watch.debounce_ms", "must be greater than 0"));
        }

        // Surfaces bad globs at startup instead of mid-scan
        crate::glob_utils::ExcludeMatcher::new(&self.analysis.exclude_patterns)?;

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), CheckError> {
        if let Ok(extension) = std::env::var("PYCOMPILECHECK_EXTENSION") {
            self.analysis.extension = extension;
        }

        if let Ok(debounce) = std::env::var("PYCOMPILECHECK_DEBOUNCE_MS")
            && let Ok(ms) = debounce.parse()
        {
            self.watch.debounce_ms = ms;
        }

        if let Ok(policy) = std::env::var("PYCOMPILECHECK_ON_CORRUPT") {
            self.snapshot.on_corrupt = policy.parse()?;
        }

        if let Ok(enabled) = std::env::var("PYCOMPILECHECK_ANNOTATE")
            && let Ok(enabled) = enabled.parse()
        {
            self.annotation.enabled = enabled;
        }

        Ok(())
    }

    /// Resolve the effective configuration for a project
    ///
    /// An explicit `config_path` must exist; otherwise the project and user
    /// config files are tried in turn.
    pub fn resolve(root: &Path, config_path: Option<PathBuf>) -> Result<Self, CheckError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(&path)?,
            None => Self::load_for_project(root)?,
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }
}

fn invalid(key: &str, reason: &str) -> CheckError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
