//! Stop signal for the daemon's serve loop.
//!
//! SIGINT/SIGTERM end up as one message on a broadcast channel; the loop
//! breaks on it and the node then writes its ban list one last time.

use tokio::signal;
use tokio::sync::broadcast;

/// Fan-out of a single stop request. Receivers obtained from
/// [`subscribe`](Self::subscribe) before the request all see it.
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// No-op for the channel when nobody is subscribed.
    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }

    /// Resolve on the first of SIGINT or SIGTERM and broadcast the stop.
    /// A handler that cannot be installed is logged and never fires.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for SIGINT");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!(signal = "SIGINT", "stop requested"),
            _ = terminate => tracing::info!(signal = "SIGTERM", "stop requested"),
        }

        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stop_reaches_subscriber() {
        let stop = ShutdownController::new();
        let mut serve_loop = stop.subscribe();
        stop.shutdown();
        assert!(serve_loop.recv().await.is_ok());
    }

    #[tokio::test]
    async fn every_subscriber_is_notified() {
        let stop = ShutdownController::new();
        let receivers: Vec<_> = (0..3).map(|_| stop.subscribe()).collect();
        stop.shutdown();
        for mut rx in receivers {
            assert!(rx.recv().await.is_ok());
        }
    }

    #[test]
    fn shutdown_without_subscribers_is_harmless() {
        ShutdownController::default().shutdown();
    }
}
