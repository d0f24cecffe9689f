use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::FutureExt;
use futures::future::{Shared, pending};
use futures_channel::oneshot;

/// Creates a connected stop handle and token.
pub fn stop_channel() -> (StopHandle, StopToken) {
    let requested = Arc::new(AtomicBool::new(false));
    let (sender, receiver) = oneshot::channel();
    (
        StopHandle {
            requested: requested.clone(),
            sender,
        },
        StopToken {
            requested,
            signal: receiver.shared(),
        },
    )
}

/// Requests the reconciliation loop to stop.
#[derive(Debug)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
    sender: oneshot::Sender<()>,
}

impl StopHandle {
    pub fn stop(self) {
        self.requested.store(true, Ordering::SeqCst);
        // The token side may already be gone, in which case nobody is
        // waiting anymore.
        let _ = self.sender.send(());
    }
}

/// Observes a stop request, either by polling or by awaiting it.
#[derive(Clone)]
pub struct StopToken {
    requested: Arc<AtomicBool>,
    signal: Shared<oneshot::Receiver<()>>,
}

impl StopToken {
    pub fn is_stopped(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Resolves once [`StopHandle::stop`] has been called. A handle dropped
    /// without stopping never resolves this.
    pub async fn stopped(&self) {
        if self.signal.clone().await.is_err() {
            pending::<()>().await;
        }
    }
}
