//! Interval-driven reconciliation loop with cooperative cancellation.

mod reconciler;
mod stop;

pub use reconciler::Reconciler;
pub use stop::{StopHandle, StopToken, stop_channel};
