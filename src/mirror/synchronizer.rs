use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};
use tracing::debug;

use super::stamp::FileStamp;
use super::transfer::{self, Removed, TransferError};
use crate::ext::BestEffortPathExt;
use crate::report::{EntryOperation, Reporter, SyncEvent, error_chain};

/// How an entry name was classified by the differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    ToCreate,
    ToUpdate,
    ToRemove,
}

impl EntryClass {
    fn operation(self) -> EntryOperation {
        match self {
            EntryClass::ToCreate => EntryOperation::Copy,
            EntryClass::ToUpdate => EntryOperation::Update,
            EntryClass::ToRemove => EntryOperation::Remove,
        }
    }
}

/// What happened to a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    CopiedDirectory,
    CopiedFile,
    UpdatedFile,
    RemovedDirectory,
    RemovedFile,
    Unchanged,
}

impl EntryOutcome {
    fn event(self, name: &OsStr) -> Option<SyncEvent> {
        let name = name.to_os_string();
        match self {
            EntryOutcome::CopiedDirectory => Some(SyncEvent::CopiedDirectory { name }),
            EntryOutcome::CopiedFile => Some(SyncEvent::CopiedFile { name }),
            EntryOutcome::UpdatedFile => Some(SyncEvent::UpdatedFile { name }),
            EntryOutcome::RemovedDirectory => Some(SyncEvent::RemovedDirectory { name }),
            EntryOutcome::RemovedFile => Some(SyncEvent::RemovedFile { name }),
            EntryOutcome::Unchanged => None,
        }
    }
}

/// Applies classified entries of one source/replica pair to the replica.
///
/// Failures are isolated per entry: [`EntrySynchronizer::apply`] reports
/// them and returns `None`, leaving the caller free to carry on with the
/// next name.
pub struct EntrySynchronizer<'a> {
    source: &'a Path,
    replica: &'a Path,
    reporter: &'a dyn Reporter,
}

impl<'a> EntrySynchronizer<'a> {
    pub fn new(source: &'a Path, replica: &'a Path, reporter: &'a dyn Reporter) -> Self {
        Self {
            source,
            replica,
            reporter,
        }
    }

    pub fn apply(&self, class: EntryClass, name: &OsStr) -> Option<EntryOutcome> {
        let result = match class {
            EntryClass::ToCreate => self.create(name),
            EntryClass::ToUpdate => self.update(name),
            EntryClass::ToRemove => self.remove(name),
        };

        match result {
            Ok(outcome) => {
                if let Some(event) = outcome.event(name) {
                    self.reporter.report(event);
                }
                Some(outcome)
            }
            Err(err) => {
                self.reporter.report(SyncEvent::EntryFailed {
                    name: name.to_os_string(),
                    operation: class.operation(),
                    cause: error_chain(&err),
                });
                None
            }
        }
    }

    pub fn create(&self, name: &OsStr) -> Result<EntryOutcome, EntrySyncError> {
        let (from, to) = self.paths(name);
        let is_dir = fs::metadata(&from)
            .context(InspectSnafu { path: &from })?
            .is_dir();

        transfer::install(&from, &to).context(TransferSnafu { name })?;

        Ok(if is_dir {
            EntryOutcome::CopiedDirectory
        } else {
            EntryOutcome::CopiedFile
        })
    }

    /// Directories present on both sides are never descended into. A file
    /// is copied over only when the source is strictly newer, or when the
    /// replica holds something other than a plain file under that name.
    pub fn update(&self, name: &OsStr) -> Result<EntryOutcome, EntrySyncError> {
        let (from, to) = self.paths(name);
        let source_metadata = fs::metadata(&from).context(InspectSnafu { path: &from })?;
        if source_metadata.is_dir() {
            return Ok(EntryOutcome::Unchanged);
        }

        let replica_metadata = fs::symlink_metadata(&to).context(InspectSnafu { path: &to })?;
        if replica_metadata.is_dir() {
            debug!(
                "Replacing directory {} with a file",
                to.best_effort_path_display()
            );
            transfer::remove_path(&to).context(TransferSnafu { name })?;
        } else if replica_metadata.is_file() {
            let source_stamp = FileStamp::from_metadata(&source_metadata);
            let replica_stamp = FileStamp::from_metadata(&replica_metadata);
            if !source_stamp.is_newer_than(&replica_stamp) {
                return Ok(EntryOutcome::Unchanged);
            }
        }

        transfer::install(&from, &to).context(TransferSnafu { name })?;
        Ok(EntryOutcome::UpdatedFile)
    }

    pub fn remove(&self, name: &OsStr) -> Result<EntryOutcome, EntrySyncError> {
        let (_, to) = self.paths(name);
        let removed = transfer::remove_path(&to).context(TransferSnafu { name })?;
        Ok(match removed {
            Removed::Directory => EntryOutcome::RemovedDirectory,
            Removed::File => EntryOutcome::RemovedFile,
        })
    }

    fn paths(&self, name: &OsStr) -> (PathBuf, PathBuf) {
        (self.source.join(name), self.replica.join(name))
    }
}

#[derive(Debug, Snafu)]
pub enum EntrySyncError {
    #[snafu(display("Failed to inspect {}", path.best_effort_path_display()))]
    InspectError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to synchronize entry '{}'", name.to_string_lossy()))]
    TransferError {
        name: OsString,
        source: TransferError,
    },
}
