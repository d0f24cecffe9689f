use std::path::PathBuf;

use crate::application::data::SyncInterval;
use crate::cli::Cli;
use crate::mirror::{MirrorRoots, MissingSourcePolicy};

/// Settings the mirroring loop runs with, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub roots: MirrorRoots,
    pub interval: SyncInterval,
    pub missing_source: MissingSourcePolicy,
    pub once: bool,
}

impl RuntimeConfig {
    pub fn source(&self) -> &PathBuf {
        &self.roots.source
    }

    pub fn replica(&self) -> &PathBuf {
        &self.roots.replica
    }
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            roots: MirrorRoots::new(cli.source, cli.replica),
            interval: cli.interval,
            missing_source: cli.on_missing_source,
            once: cli.once,
        }
    }
}
