use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::ext::BestEffortPathExt;
use crate::mirror::PassSummary;

/// Severity attached to every [`SyncEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventLevel {
    Info,
    Warning,
    Error,
}

/// The filesystem mutation an entry failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOperation {
    Copy,
    Update,
    Remove,
}

impl fmt::Display for EntryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryOperation::Copy => f.write_str("copy"),
            EntryOperation::Update => f.write_str("update"),
            EntryOperation::Remove => f.write_str("remove"),
        }
    }
}

/// Everything the mirroring core tells the outside world about.
///
/// Entry names are kept as `OsString` so that a non UTF-8 name can still be
/// matched in tests; they are rendered lossily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    PassStarted,
    PassFinished(PassSummary),
    /// The pass stopped before synchronizing anything.
    PassAborted { cause: String },
    MissingSource { path: PathBuf },
    MissingReplica { path: PathBuf },
    ReplicaCreated { path: PathBuf },
    CopiedDirectory { name: OsString },
    CopiedFile { name: OsString },
    UpdatedFile { name: OsString },
    RemovedDirectory { name: OsString },
    RemovedFile { name: OsString },
    EntryFailed {
        name: OsString,
        operation: EntryOperation,
        cause: String,
    },
    Sleeping { interval: Duration },
    Stopped,
}

impl SyncEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            SyncEvent::MissingSource { .. }
            | SyncEvent::PassAborted { .. }
            | SyncEvent::EntryFailed { .. } => EventLevel::Error,
            SyncEvent::MissingReplica { .. } => EventLevel::Warning,
            SyncEvent::PassFinished(summary) if summary.failed > 0 => EventLevel::Warning,
            _ => EventLevel::Info,
        }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncEvent::PassStarted => write!(f, "Starting file sync"),
            SyncEvent::PassFinished(summary) => write!(
                f,
                "File sync finished: {} copied, {} updated, {} removed, {} failed",
                summary.copied, summary.updated, summary.removed, summary.failed
            ),
            SyncEvent::PassAborted { cause } => write!(f, "File sync aborted: {cause}"),
            SyncEvent::MissingSource { path } => write!(
                f,
                "Source path does not exist: {}",
                path.best_effort_path_display()
            ),
            SyncEvent::MissingReplica { path } => write!(
                f,
                "Replica path does not exist: {}",
                path.best_effort_path_display()
            ),
            SyncEvent::ReplicaCreated { path } => write!(
                f,
                "Created replica directory {}",
                path.best_effort_path_display()
            ),
            SyncEvent::CopiedDirectory { name } => {
                write!(f, "Copied directory tree '{}'", name.to_string_lossy())
            }
            SyncEvent::CopiedFile { name } => {
                write!(f, "Copied file '{}'", name.to_string_lossy())
            }
            SyncEvent::UpdatedFile { name } => {
                write!(f, "Updated file '{}'", name.to_string_lossy())
            }
            SyncEvent::RemovedDirectory { name } => {
                write!(f, "Removed directory tree '{}'", name.to_string_lossy())
            }
            SyncEvent::RemovedFile { name } => {
                write!(f, "Removed file '{}'", name.to_string_lossy())
            }
            SyncEvent::EntryFailed {
                name,
                operation,
                cause,
            } => write!(
                f,
                "Failed to {operation} '{}': {cause}",
                name.to_string_lossy()
            ),
            SyncEvent::Sleeping { interval } => {
                write!(f, "Sleeping for {} seconds...", interval.as_secs_f64())
            }
            SyncEvent::Stopped => write!(f, "Sync stopped: cancellation requested"),
        }
    }
}
