//! One-way mirroring of a source directory's immediate entries into a
//! replica directory.
//!
//! A pass probes both roots, classifies every top-level entry name and then
//! copies, updates or removes entries in the replica. Subdirectories are
//! handled as opaque units: copied or removed whole, never diffed.

mod differ;
mod pass;
mod probe;
mod stamp;
mod synchronizer;
mod transfer;

pub use pass::{MirrorRoots, MissingSourcePolicy, PassError, PassSummary, run_pass};
