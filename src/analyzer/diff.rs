//! Record-level comparison between two snapshots

use crate::snapshot::{FileRecord, Snapshot};
use std::collections::BTreeMap;
use std::fmt;

/// One detected difference between the previous and current record of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    ContentModified,
    SizeChanged { from: u64, to: u64 },
    ImportsModified,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::ContentModified => write!(f, "content modified"),
            Change::SizeChanged { from, to } => {
                write!(f, "size changed from {} to {} bytes", from, to)
            }
            Change::ImportsModified => write!(f, "imports modified"),
        }
    }
}

/// Changed paths and their ordered changes; unchanged paths are absent
pub type ChangeSet = BTreeMap<String, Vec<Change>>;

/// Compare two records of the same path, in content/size/imports order
pub fn compare(previous: &FileRecord, current: &FileRecord) -> Vec<Change> {
    let mut changes = Vec::new();

    if previous.hash != current.hash {
        changes.push(Change::ContentModified);
    }
    if previous.size != current.size {
        changes.push(Change::SizeChanged {
            from: previous.size,
            to: current.size,
        });
    }
    if previous.imports != current.imports {
        changes.push(Change::ImportsModified);
    }

    changes
}

/// Diff every path present in both snapshots
pub fn diff(previous: &Snapshot, current: &Snapshot) -> ChangeSet {
    current
        .iter()
        .filter_map(|(path, curr)| {
            let prev = previous.get(path)?;
            let changes = compare(prev, curr);
            (!changes.is_empty()).then(|| (path.clone(), changes))
        })
        .collect()
}

/// Human-readable descriptions, as embedded in annotations
pub fn describe(changes: &[Change]) -> Vec<String> {
    changes.iter().map(ToString::to_string).collect()
}
