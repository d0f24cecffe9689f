use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::ext::BestEffortPathExt;

/// Entry names of one pass, split by what has to happen to them.
///
/// The three sets partition the union of source and replica names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPlan {
    pub to_create: BTreeSet<OsString>,
    pub to_update: BTreeSet<OsString>,
    pub to_remove: BTreeSet<OsString>,
}

impl EntryPlan {
    pub fn from_names(source: &BTreeSet<OsString>, replica: &BTreeSet<OsString>) -> Self {
        Self {
            to_create: source.difference(replica).cloned().collect(),
            to_update: source.intersection(replica).cloned().collect(),
            to_remove: replica.difference(source).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }
}

/// Immediate entry names of `dir`. Directories are single opaque names.
pub fn list_entries(dir: &Path) -> Result<BTreeSet<OsString>, DiffError> {
    let entries = fs::read_dir(dir).context(ListSnafu { path: dir })?;
    entries
        .map(|entry| {
            entry
                .map(|entry| entry.file_name())
                .context(ListSnafu { path: dir })
        })
        .collect()
}

/// Lists both directories and classifies every name.
///
/// Both listings must succeed before anything is classified.
pub fn diff(source: &Path, replica: &Path) -> Result<EntryPlan, DiffError> {
    let source_names = list_entries(source)?;
    let replica_names = list_entries(replica)?;
    let plan = EntryPlan::from_names(&source_names, &replica_names);
    debug!(
        "Planned {} to create, {} to update, {} to remove",
        plan.to_create.len(),
        plan.to_update.len(),
        plan.to_remove.len()
    );
    Ok(plan)
}

#[derive(Debug, Snafu)]
pub enum DiffError {
    #[snafu(display("Failed to list directory {}", path.best_effort_path_display()))]
    ListError {
        path: PathBuf,
        source: std::io::Error,
    },
}
