//! Metadata-preserving copies and removals inside the replica.
//!
//! Copies never write to their final name directly. They are built under a
//! fresh `.dirmirror-XXXXXX.partial` name next to the destination and renamed
//! into place once complete. The random part is chosen when staging starts,
//! so staging never claims a name some other entry already holds. A
//! leftover from an interrupted run is an ordinary replica-only name and is
//! removed by the next pass.

use std::fs::{self, Metadata};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};
use tempfile::Builder;
use tracing::debug;

use super::stamp::{FileStamp, StampError};
use crate::ext::BestEffortPathExt;

const STAGING_PREFIX: &str = ".dirmirror-";
const STAGING_SUFFIX: &str = ".partial";

fn staging() -> Builder<'static, 'static> {
    let mut builder = Builder::new();
    builder.prefix(STAGING_PREFIX).suffix(STAGING_SUFFIX);
    builder
}

/// Copies `from` (file or directory tree) to `to` through a staging entry.
///
/// `to` must either not exist or be a non-directory entry, which the final
/// rename replaces in one step. On failure the staging entry is dropped and
/// `to` is left as it was.
pub fn install(from: &Path, to: &Path) -> Result<(), TransferError> {
    let parent = match to.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let metadata = fs::metadata(from).context(InspectSnafu { path: from })?;

    if metadata.is_dir() {
        let staged = staging()
            .tempdir_in(parent)
            .context(StageSnafu { path: parent })?;
        fill_tree(from, staged.path(), &metadata)?;
        fs::rename(staged.path(), to).context(CommitSnafu {
            from: staged.path(),
            to,
        })?;
        // Already moved to `to`, nothing left to clean up.
        let _ = staged.keep();
    } else {
        let staged = staging()
            .tempfile_in(parent)
            .context(StageSnafu { path: parent })?
            .into_temp_path();
        copy_file(from, &staged)?;
        let staged_path = staged.to_path_buf();
        staged
            .persist(to)
            .map_err(|err| err.error)
            .context(CommitSnafu {
                from: staged_path,
                to,
            })?;
    }
    Ok(())
}

fn copy_path(from: &Path, to: &Path) -> Result<(), TransferError> {
    let metadata = fs::metadata(from).context(InspectSnafu { path: from })?;
    if metadata.is_dir() {
        copy_tree(from, to)
    } else {
        copy_file(from, to)
    }
}

/// Copies content, permission bits and timestamps of a single file.
pub fn copy_file(from: &Path, to: &Path) -> Result<(), TransferError> {
    // `fs::copy` carries the permission bits over.
    fs::copy(from, to).context(CopyFileSnafu { from, to })?;
    FileStamp::read(from)
        .and_then(|stamp| stamp.apply(to))
        .context(StampSnafu)?;
    Ok(())
}

/// Recursively copies a directory tree. Symlinks are followed.
pub fn copy_tree(from: &Path, to: &Path) -> Result<(), TransferError> {
    fs::create_dir(to).context(CreateDirSnafu { path: to })?;
    let metadata = fs::metadata(from).context(InspectSnafu { path: from })?;
    fill_tree(from, to, &metadata)
}

/// Copies the children of `from` into the existing directory `to`.
///
/// Directory permissions and timestamps are applied after the children are
/// in place; writing the children would otherwise bump the timestamps, and
/// a read-only directory could not receive them.
fn fill_tree(from: &Path, to: &Path, metadata: &Metadata) -> Result<(), TransferError> {
    let entries = fs::read_dir(from).context(ReadDirSnafu { path: from })?;
    for entry in entries {
        let entry = entry.context(ReadDirSnafu { path: from })?;
        copy_path(&entry.path(), &to.join(entry.file_name()))?;
    }

    fs::set_permissions(to, metadata.permissions()).context(PermissionsSnafu { path: to })?;
    FileStamp::from_metadata(metadata)
        .apply(to)
        .context(StampSnafu)?;
    Ok(())
}

/// What [`remove_path`] deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removed {
    Directory,
    File,
}

/// Removes a file, symlink or whole directory tree. Symlinks are unlinked,
/// never followed.
pub fn remove_path(path: &Path) -> Result<Removed, TransferError> {
    let metadata = fs::symlink_metadata(path).context(InspectSnafu { path })?;

    if !metadata.is_dir() {
        fs::remove_file(path).context(RemoveSnafu { path })?;
        return Ok(Removed::File);
    }

    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::PermissionDenied => {
            // Read-only directories mirrored from the source block removal
            // of their children until they are writable again.
            debug!(
                "Granting write access below {} before removal",
                path.best_effort_path_display()
            );
            grant_write_recursive(path)?;
            fs::remove_dir_all(path).context(RemoveSnafu { path })?;
        }
        Err(err) => return Err(err).context(RemoveSnafu { path }),
    }
    Ok(Removed::Directory)
}

fn grant_write_recursive(dir: &Path) -> Result<(), TransferError> {
    grant_write(dir)?;
    let entries = fs::read_dir(dir).context(ReadDirSnafu { path: dir })?;
    for entry in entries {
        let entry = entry.context(ReadDirSnafu { path: dir })?;
        let file_type = entry.file_type().context(InspectSnafu { path: dir })?;
        if file_type.is_dir() {
            grant_write_recursive(&entry.path())?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn grant_write(path: &Path) -> Result<(), TransferError> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)
        .context(InspectSnafu { path })?
        .permissions();
    permissions.set_mode(permissions.mode() | 0o700);
    fs::set_permissions(path, permissions).context(PermissionsSnafu { path })
}

#[cfg(not(unix))]
fn grant_write(path: &Path) -> Result<(), TransferError> {
    let mut permissions = fs::metadata(path)
        .context(InspectSnafu { path })?
        .permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    permissions.set_readonly(false);
    fs::set_permissions(path, permissions).context(PermissionsSnafu { path })
}

#[derive(Debug, Snafu)]
pub enum TransferError {
    #[snafu(display("Failed to inspect {}", path.best_effort_path_display()))]
    InspectError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to stage a copy in {}", path.best_effort_path_display()))]
    StageError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to create directory {}", path.best_effort_path_display()))]
    CreateDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to list directory {}", path.best_effort_path_display()))]
    ReadDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "Failed to copy {} to {}",
        from.best_effort_path_display(),
        to.best_effort_path_display()
    ))]
    CopyFileError {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to set permissions of {}", path.best_effort_path_display()))]
    PermissionsError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to preserve timestamps"))]
    StampError { source: StampError },
    #[snafu(display(
        "Failed to move {} into place at {}",
        from.best_effort_path_display(),
        to.best_effort_path_display()
    ))]
    CommitError {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to remove {}", path.best_effort_path_display()))]
    RemoveError {
        path: PathBuf,
        source: std::io::Error,
    },
}
