use tracing::{error, info, warn};

use super::{EventLevel, SyncEvent};

/// Sink for [`SyncEvent`]s.
///
/// Every operation that has something to say takes a reporter explicitly;
/// there is no process-wide registry.
pub trait Reporter {
    fn report(&self, event: SyncEvent);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, event: SyncEvent) {
        (**self).report(event)
    }
}

/// Forwards events to whatever `tracing` subscriber is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: SyncEvent) {
        match event.level() {
            EventLevel::Info => info!("{event}"),
            EventLevel::Warning => warn!("{event}"),
            EventLevel::Error => error!("{event}"),
        }
    }
}

#[cfg(test)]
pub use recording::RecordingReporter;
