//! Glob pattern matching for excluding paths from a scan

use crate::error::ConfigError;
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled exclude patterns, matched against `/`-separated relative paths
#[derive(Debug, Clone)]
pub struct ExcludeMatcher {
    set: GlobSet,
    empty: bool,
}

impl ExcludeMatcher {
    /// Compile all patterns; fails on the first invalid one
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidValue {
                key: "analysis.exclude_patterns".to_string(),
                reason: format!("invalid glob '{}': {}", pattern, e),
            })?;
            builder.add(glob);
        }

        let set = builder.build().map_err(|e| ConfigError::InvalidValue {
            key: "analysis.exclude_patterns".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            set,
            empty: patterns.is_empty(),
        })
    }

    /// Matcher that excludes nothing
    pub fn none() -> Self {
        Self {
            set: GlobSet::empty(),
            empty: true,
        }
    }

    /// Check if a relative path is excluded
    ///
    /// Patterns like `venv/**` also match when the directory is nested, so
    /// every component suffix of the path is tried.
    ///
    /// ```
    /// use pycompilecheck::glob_utils::ExcludeMatcher;
    ///
    /// let matcher = ExcludeMatcher::new(&["venv/**".to_string()]).unwrap();
    /// assert!(matcher.is_excluded("venv/lib/site.py"));
    /// assert!(matcher.is_excluded("services/api/venv/lib/site.py"));
    /// assert!(!matcher.is_excluded("services/api/app.py"));
    /// ```
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        if self.empty {
            return false;
        }

        let path = relative_path.trim_start_matches('/');
        if self.set.is_match(path) {
            return true;
        }

        let parts: Vec<&str> = path.split('/').collect();
        (1..parts.len()).any(|i| self.set.is_match(parts[i..].join("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(patterns: &[&str]) -> ExcludeMatcher {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        ExcludeMatcher::new(&patterns).unwrap()
    }

    #[test]
    fn test_directory_glob() {
        let m = matcher(&["build/**"]);
        assert!(m.is_excluded("build/gen.py"));
        assert!(m.is_excluded("pkg/build/nested/gen.py"));
        assert!(!m.is_excluded("pkg/builder.py"));
    }

    #[test]
    fn test_file_glob() {
        let m = matcher(&["**/test_*.py"]);
        assert!(m.is_excluded("tests/test_api.py"));
        assert!(m.is_excluded("test_root.py"));
        assert!(!m.is_excluded("tests/conftest.py"));
    }

    #[test]
    fn test_multiple_patterns() {
        let m = matcher(&["venv/**", "**/migrations/*.py"]);
        assert!(m.is_excluded("venv/site.py"));
        assert!(m.is_excluded("app/migrations/0001_initial.py"));
        assert!(!m.is_excluded("app/models.py"));
    }

    #[test]
    fn test_empty_patterns_exclude_nothing() {
        let m = matcher(&[]);
        assert!(!m.is_excluded("any/path.py"));
        assert!(!ExcludeMatcher::none().is_excluded("any/path.py"));
    }

    #[test]
    fn test_leading_slash_ignored() {
        let m = matcher(&["lib/**"]);
        assert!(m.is_excluded("/lib/file.py"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = ExcludeMatcher::new(&["[invalid".to_string()]);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
