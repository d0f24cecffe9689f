//! Reporting interface of the mirroring core.
//!
//! The core emits one [`SyncEvent`] per observable step of a pass and hands
//! it to a [`Reporter`]. The binary plugs in [`TracingReporter`].

mod event;
mod reporter;

pub use event::{EntryOperation, EventLevel, SyncEvent};
#[cfg(test)]
pub use reporter::RecordingReporter;
pub use reporter::{Reporter, TracingReporter};

/// Renders an error and all of its sources on a single line.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut current = error.source();
    while let Some(cause) = current {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        current = cause.source();
    }
    rendered
}
