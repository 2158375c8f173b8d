//! One-shot "workspace parsed" signal.
//!
//! Completion must not run before the initial workspace scan has produced a
//! snapshot for every script. The gate starts closed, is opened exactly once
//! after the scan, and stays open for the rest of the process. Waiters
//! suspend on a `watch` channel instead of polling.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ReadinessGate {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Open the gate. Later calls are no-ops.
    pub fn open(&self) {
        let changed = self.tx.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        });
        if changed {
            info!("Workspace ready, releasing pending completion requests");
        }
    }

    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the gate is open; immediately if it already is.
    pub async fn wait(&self) {
        if self.is_open() {
            return;
        }
        debug!("Waiting for workspace readiness");
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_resolves_after_open() {
        let gate = ReadinessGate::new();
        assert!(!gate.is_open());

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.wait().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        gate.open();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter released")
            .expect("waiter task");
        assert!(gate.is_open());
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let gate = ReadinessGate::new();
        gate.open();
        gate.open();
        assert!(gate.is_open());
        tokio::time::timeout(Duration::from_millis(100), gate.wait())
            .await
            .expect("open gate resolves immediately");
    }
}
