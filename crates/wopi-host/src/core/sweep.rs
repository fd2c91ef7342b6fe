//! Periodic removal of expired capabilities
//!
//! Runs alongside lazy eviction in the validator. Each pass is a single
//! store-level sweep; the task never holds store state across ticks.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use wopi_core::Clock;

use crate::storage::CapabilityStore;

/// Handle to a running sweep task.
///
/// Dropping the handle signals the task to stop.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SweepHandle {
    /// Signal the task to stop and wait for it to finish
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(error = %e, "Capability sweep task ended abnormally");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

/// Spawns the background sweep
pub struct CapabilitySweeper {
    store: Arc<dyn CapabilityStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl CapabilitySweeper {
    pub fn new(store: Arc<dyn CapabilityStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self { store, clock, interval }
    }

    /// Run one sweep pass now. Store faults are logged, never raised.
    pub async fn sweep_once(&self) -> usize {
        match self.store.sweep_expired(self.clock.now()).await {
            Ok(removed) => removed,
            Err(e) => {
                error!(error = %e, "Capability sweep failed");
                0
            }
        }
    }

    /// Start sweeping on the configured cadence
    pub fn spawn(self) -> SweepHandle {
        let (shutdown, mut stop) = watch::channel(false);
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; skip it so the first pass
            // runs one full interval after startup.
            ticker.tick().await;

            info!(interval_secs = interval.as_secs(), "Capability sweep started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = self.sweep_once().await;
                        debug!(removed = removed, "Capability sweep pass complete");
                    }
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Capability sweep stopped");
        });

        SweepHandle {
            shutdown,
            task: Some(task),
        }
    }
}
