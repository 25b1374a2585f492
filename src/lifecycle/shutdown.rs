//! Shutdown coordination for the service.

use tokio::sync::watch;

/// Coordinator for graceful shutdown.
///
/// Every long-running task holds a [`ShutdownSignal`]. Subscribing after the
/// trigger still observes it, so tasks spawned late exit immediately.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether shutdown has been triggered.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of live subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half of [`Shutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown has been triggered (or the coordinator is gone).
    pub async fn recv(&mut self) {
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_late_subscriber_sees_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let mut signal = shutdown.subscribe();
        tokio::time::timeout(Duration::from_millis(100), signal.recv())
            .await
            .expect("signal should already be set");
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_waiting_subscriber_wakes() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 1);

        let waiter = tokio::spawn(async move { signal.recv().await });
        shutdown.trigger();
        tokio::time::timeout(Duration::from_millis(100), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
