use std::sync::Arc;

use tokio::sync::watch;

/// Cooperative cancellation shared by the pipeline, the runner and the interrupt handler.
///
/// Once triggered it stays triggered: the running tool is killed, no new tool is spawned
/// and the sequencer stops before the next stage.
#[derive(Clone, Debug)]
pub struct StopSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`trigger`](Self::trigger) has been called, immediately if it already was.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        if rx.wait_for(|stopped| *stopped).await.is_err() {
            // The sender lives as long as `self`, so the channel cannot close under us.
            std::future::pending::<()>().await;
        }
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}
