use std::fs::Metadata;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use snafu::{ResultExt, Snafu};

use crate::ext::BestEffortPathExt;

/// Access and modification times of a file, read with nanosecond precision.
///
/// Source and replica are always read through this type, so a comparison
/// never mixes granularities. Copies write both values back verbatim, which
/// is what makes a steady-state pass compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub accessed: FileTime,
    pub modified: FileTime,
}

impl FileStamp {
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            accessed: FileTime::from_last_access_time(metadata),
            modified: FileTime::from_last_modification_time(metadata),
        }
    }

    pub fn read(path: &Path) -> Result<Self, StampError> {
        let metadata = std::fs::metadata(path).context(ReadSnafu { path })?;
        Ok(Self::from_metadata(&metadata))
    }

    pub fn apply(&self, path: &Path) -> Result<(), StampError> {
        filetime::set_file_times(path, self.accessed, self.modified).context(WriteSnafu { path })
    }

    /// Staleness rule: only a strictly newer source counts.
    pub fn is_newer_than(&self, other: &FileStamp) -> bool {
        self.modified > other.modified
    }
}

#[derive(Debug, Snafu)]
pub enum StampError {
    #[snafu(display("Failed to read timestamps of {}", path.best_effort_path_display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to set timestamps of {}", path.best_effort_path_display()))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}
