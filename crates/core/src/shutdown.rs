//! Cooperative shutdown token.
//!
//! A controller/signal pair over a broadcast channel. The controller side is
//! held by whatever decides to stop (a Ctrl+C handler, a deadline task); the
//! signal side is observed by the consumption loop once per iteration.

use tokio::sync::broadcast;

/// Creates a connected controller/signal pair.
pub fn shutdown_channel() -> (ShutdownController, ShutdownSignal) {
    let (tx, rx) = broadcast::channel(1);
    (ShutdownController { tx }, ShutdownSignal { rx })
}

/// Sending half: raises the shutdown signal.
#[derive(Debug, Clone)]
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    /// Request shutdown. Idempotent; later calls are no-ops.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Another signal observing this controller.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiving half: observed by the loop.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
}

impl ShutdownSignal {
    /// Completes once shutdown has been requested. Cancel-safe.
    ///
    /// Dropping every controller counts as a request: a loop whose operators
    /// are all gone has nothing left to run for.
    pub async fn triggered(&mut self) {
        let _ = self.rx.recv().await;
    }
}
