use std::sync::Arc;

use taskpilot_engine::traits::{Relay, RelayRequest, RelayResult};
use tokio::sync::{mpsc, oneshot};

type Job = (RelayRequest, oneshot::Sender<RelayResult>);

/// Relay served by a background task, like an extension's background process.
///
/// Callers post a request and await a single reply. Each request runs on its own task,
/// so a slow call never holds up the next one.
#[derive(Clone)]
pub struct BackgroundRelay {
    tx: mpsc::Sender<Job>,
}

impl BackgroundRelay {
    /// Must be called from within a tokio runtime.
    pub fn spawn(inner: Arc<dyn Relay>) -> Self {
        let (tx, mut rx) = mpsc::channel::<Job>(32);

        tokio::spawn(async move {
            while let Some((request, reply)) = rx.recv().await {
                let inner = inner.clone();
                tokio::spawn(async move {
                    let result = inner.send(request).await;
                    if reply.send(result).is_err() {
                        log::debug!("relay caller went away before the reply");
                    }
                });
            }
            log::debug!("background relay stopped");
        });

        Self { tx }
    }
}

#[async_trait::async_trait]
impl Relay for BackgroundRelay {
    async fn send(&self, request: RelayRequest) -> RelayResult {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send((request, reply_tx)).await.is_err() {
            return RelayResult::failure("relay unavailable");
        }

        // A dropped sender (worker panicked or shut down) still resolves the caller.
        reply_rx
            .await
            .unwrap_or_else(|_| RelayResult::failure("relay unavailable"))
    }
}
