use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};

use crate::ext::BestEffortPathExt;
use crate::report::{Reporter, SyncEvent};

/// Fails with [`ProbeError::MissingSource`] when the source is absent.
///
/// The source is the user's data and is never created here.
pub fn ensure_source_exists(path: &Path, reporter: &dyn Reporter) -> Result<(), ProbeError> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => SourceNotDirectorySnafu { path }.fail(),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            reporter.report(SyncEvent::MissingSource {
                path: path.to_path_buf(),
            });
            MissingSourceSnafu { path }.fail()
        }
        Err(err) => Err(err).context(InspectSnafu { path }),
    }
}

/// Creates the replica directory tree when it does not exist yet, warning
/// about it first.
pub fn ensure_replica_exists(path: &Path, reporter: &dyn Reporter) -> Result<(), ProbeError> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => ReplicaNotDirectorySnafu { path }.fail(),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            reporter.report(SyncEvent::MissingReplica {
                path: path.to_path_buf(),
            });
            fs::create_dir_all(path).context(CreateReplicaSnafu { path })?;
            reporter.report(SyncEvent::ReplicaCreated {
                path: path.to_path_buf(),
            });
            Ok(())
        }
        Err(err) => Err(err).context(InspectSnafu { path }),
    }
}

#[derive(Debug, Snafu)]
pub enum ProbeError {
    #[snafu(display("Source path {} does not exist", path.best_effort_path_display()))]
    MissingSource { path: PathBuf },
    #[snafu(display("Source path {} is not a directory", path.best_effort_path_display()))]
    SourceNotDirectory { path: PathBuf },
    #[snafu(display("Replica path {} is not a directory", path.best_effort_path_display()))]
    ReplicaNotDirectory { path: PathBuf },
    #[snafu(display("Failed to create replica directory {}", path.best_effort_path_display()))]
    CreateReplicaError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to inspect {}", path.best_effort_path_display()))]
    InspectError {
        path: PathBuf,
        source: std::io::Error,
    },
}
