use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::PathBuf;

use clap::ValueEnum;
use snafu::{ResultExt, Snafu};
use tracing::debug;

use super::differ::{self, DiffError, EntryPlan};
use super::probe::{self, ProbeError};
use super::synchronizer::{EntryClass, EntryOutcome, EntrySynchronizer};
use crate::report::{Reporter, SyncEvent, error_chain};

/// What a pass does when the source directory is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MissingSourcePolicy {
    /// Report and abort the pass; the replica is left untouched.
    #[default]
    Skip,
    /// Treat the source as empty, which clears the replica.
    Mirror,
}

/// Counts of what one pass did to the replica.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub copied: usize,
    pub updated: usize,
    pub removed: usize,
    pub failed: usize,
}

impl PassSummary {
    fn record(&mut self, outcome: Option<EntryOutcome>) {
        match outcome {
            Some(EntryOutcome::CopiedDirectory | EntryOutcome::CopiedFile) => self.copied += 1,
            Some(EntryOutcome::UpdatedFile) => self.updated += 1,
            Some(EntryOutcome::RemovedDirectory | EntryOutcome::RemovedFile) => self.removed += 1,
            Some(EntryOutcome::Unchanged) => {}
            None => self.failed += 1,
        }
    }
}

/// The pair of directories being mirrored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRoots {
    pub source: PathBuf,
    pub replica: PathBuf,
}

impl MirrorRoots {
    pub fn new(source: impl Into<PathBuf>, replica: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
        }
    }
}

/// Runs one full reconciliation pass: probe, diff, then create, update and
/// remove entries in that order.
///
/// Entry failures are counted in the summary and do not stop the pass.
/// Only probe and listing failures abort it, and both are reported.
pub fn run_pass(
    roots: &MirrorRoots,
    policy: MissingSourcePolicy,
    reporter: &dyn Reporter,
) -> Result<PassSummary, PassError> {
    reporter.report(SyncEvent::PassStarted);

    let result = reconcile(roots, policy, reporter);
    match &result {
        Ok(summary) => reporter.report(SyncEvent::PassFinished(*summary)),
        Err(err) => reporter.report(SyncEvent::PassAborted {
            cause: error_chain(err),
        }),
    }
    result
}

fn reconcile(
    roots: &MirrorRoots,
    policy: MissingSourcePolicy,
    reporter: &dyn Reporter,
) -> Result<PassSummary, PassError> {
    let source_present = match probe::ensure_source_exists(&roots.source, reporter) {
        Ok(()) => true,
        Err(ProbeError::MissingSource { .. }) if policy == MissingSourcePolicy::Mirror => {
            debug!("Source is missing, mirroring it as an empty directory");
            false
        }
        Err(err) => return Err(err).context(ProbeSnafu),
    };
    probe::ensure_replica_exists(&roots.replica, reporter).context(ProbeSnafu)?;

    let plan = if source_present {
        differ::diff(&roots.source, &roots.replica).context(DiffSnafu)?
    } else {
        let replica_names = differ::list_entries(&roots.replica).context(DiffSnafu)?;
        EntryPlan::from_names(&BTreeSet::new(), &replica_names)
    };

    if plan.is_empty() {
        debug!("Nothing to reconcile");
        return Ok(PassSummary::default());
    }

    let synchronizer = EntrySynchronizer::new(&roots.source, &roots.replica, reporter);
    let mut summary = PassSummary::default();
    let phases: [(EntryClass, &BTreeSet<OsString>); 3] = [
        (EntryClass::ToCreate, &plan.to_create),
        (EntryClass::ToUpdate, &plan.to_update),
        (EntryClass::ToRemove, &plan.to_remove),
    ];
    for (class, names) in phases {
        for name in names {
            summary.record(synchronizer.apply(class, name));
        }
    }

    Ok(summary)
}

#[derive(Debug, Snafu)]
pub enum PassError {
    #[snafu(display("Path check failed"))]
    ProbeError { source: ProbeError },
    #[snafu(display("Failed to compute the entry plan"))]
    DiffError { source: DiffError },
}

impl PassError {
    pub fn is_missing_source(&self) -> bool {
        matches!(
            self,
            PassError::ProbeError {
                source: ProbeError::MissingSource { .. }
            }
        )
    }
}
