//! Machine-readable run report for external tools
//!
//! The JSON document is framed by sentinel lines on stdout so a caller can
//! pick it out of any other output.

use crate::analyzer::Change;
use crate::runner::RunSummary;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

pub const OUTPUT_START: &str = "PYCOMPILECHECK_OUTPUT_START";
pub const OUTPUT_END: &str = "PYCOMPILECHECK_OUTPUT_END";

/// Report for one completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Always "success"; failed runs exit before a report is built
    pub status: String,
    /// Canonical project root
    pub project_path: String,
    /// One entry per tracked file, in path order
    pub changes: Vec<ChangeEntry>,
    /// Unix seconds
    pub timestamp: i64,
}

/// Per-file line of the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub file: String,
    pub has_content_changes: bool,
    pub has_import_changes: bool,
    pub has_size_changes: bool,
    /// The size message when the size changed
    #[serde(default)]
    pub size_change_info: Option<String>,
    /// Whole seconds since the Unix epoch
    pub last_modified: i64,
    pub size: u64,
}

impl AnalysisReport {
    pub fn from_run(summary: &RunSummary) -> Self {
        let changes = summary
            .snapshot
            .iter()
            .map(|(file, record)| {
                let file_changes = summary.changes.get(file).map(Vec::as_slice).unwrap_or(&[]);
                let size_change = file_changes
                    .iter()
                    .find(|c| matches!(c, Change::SizeChanged { .. }));

                ChangeEntry {
                    file: file.clone(),
                    has_content_changes: file_changes.contains(&Change::ContentModified),
                    has_import_changes: file_changes.contains(&Change::ImportsModified),
                    has_size_changes: size_change.is_some(),
                    size_change_info: size_change.map(ToString::to_string),
                    last_modified: record.last_modified as i64,
                    size: record.size,
                }
            })
            .collect();

        Self {
            status: "success".to_string(),
            project_path: summary.root.display().to_string(),
            changes,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn changed_entries(&self) -> impl Iterator<Item = &ChangeEntry> {
        self.changes
            .iter()
            .filter(|e| e.has_content_changes || e.has_import_changes || e.has_size_changes)
    }
}

/// Write the framed report
pub fn emit<W: Write>(report: &AnalysisReport, mut writer: W) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    writeln!(writer, "{}", OUTPUT_START)?;
    writeln!(writer, "{}", json)?;
    writeln!(writer, "{}", OUTPUT_END)?;
    writer.flush()
}
