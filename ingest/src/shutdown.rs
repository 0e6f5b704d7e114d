//! Graceful shutdown coordination.
//!
//! Shutdown is cooperative and honoured only at block boundaries: the
//! [`Ingestor`](crate::Ingestor) polls its [`DrainSignal`] between blocks,
//! finishes the in-flight block, and only then stops. The controller
//! broadcasts to any number of signals, from an OS signal or
//! programmatically.

use tokio::signal;
use tokio::sync::broadcast;

/// Coordinates graceful shutdown of the ingestion pipeline.
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A sticky drain signal for one consumer.
    pub fn drain_signal(&self) -> DrainSignal {
        DrainSignal {
            rx: self.tx.subscribe(),
            raised: false,
        }
    }

    /// Trigger shutdown programmatically.
    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }

    /// Wait for SIGTERM or SIGINT, then trigger shutdown.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("received SIGINT, draining"); }
            _ = terminate => { tracing::info!("received SIGTERM, draining"); }
        }

        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// A sticky, single-consumer view of the shutdown broadcast.
///
/// Once raised it stays raised, so the orchestrator can poll it at every
/// block boundary without re-observing the channel.
pub struct DrainSignal {
    rx: broadcast::Receiver<()>,
    raised: bool,
}

impl DrainSignal {
    /// Non-blocking check, suitable for a block-boundary poll.
    pub fn is_raised(&mut self) -> bool {
        if !self.raised && self.rx.try_recv().is_ok() {
            self.raised = true;
        }
        self.raised
    }

    /// Wait until the signal is raised.
    pub async fn raised(&mut self) {
        if !self.raised {
            let _ = self.rx.recv().await;
            self.raised = true;
        }
    }
}
