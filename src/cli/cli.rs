use std::path::PathBuf;

use clap::Parser;

use crate::application::data::{LogLevel, SyncInterval};
use crate::mirror::MissingSourcePolicy;

/// Keeps a replica directory mirrored from a source directory.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Directory to mirror from; it is never modified
    pub source: PathBuf,
    /// Directory to mirror into; created when missing
    pub replica: PathBuf,
    /// File that log lines are appended to, in addition to stdout
    pub log_file: PathBuf,
    /// Seconds between two passes; fractions are allowed
    pub interval: SyncInterval,

    #[clap(long, short, default_value = "info", value_enum)]
    pub log_level: LogLevel,

    /// What to do with the replica when the source directory is missing
    #[clap(long, default_value = "skip", value_enum)]
    pub on_missing_source: MissingSourcePolicy,

    /// Run a single pass and exit
    #[clap(long)]
    pub once: bool,
}
