//! Fixed-interval sync loop.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use nbsync_connector::traits::{DeviceProvisionOp, DeviceUpdateOp, SourceInventory};

use crate::engine::ReconciliationEngine;

/// Default pause between cycles.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(300);

/// Runs reconciliation cycles back to back with a fixed pause between them.
///
/// Cycles never overlap: the next one starts only after the previous one
/// returned and the interval elapsed.
pub struct SyncScheduler<S, M> {
    engine: ReconciliationEngine<S, M>,
    interval: Duration,
}

impl<S, M> SyncScheduler<S, M>
where
    S: SourceInventory,
    M: DeviceUpdateOp + DeviceProvisionOp,
{
    #[must_use]
    pub fn new(engine: ReconciliationEngine<S, M>) -> Self {
        Self {
            engine,
            interval: DEFAULT_SYNC_INTERVAL,
        }
    }

    /// Override the interval (default: 300 seconds).
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until `cancel` flips to `true`. Returns the number of cycles run.
    ///
    /// The signal is checked between cycles and interrupts the pause; a cycle
    /// in progress always runs to completion.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) -> u64 {
        info!(interval_secs = self.interval.as_secs(), "Sync scheduler started");

        let mut cycles = 0u64;
        loop {
            if *cancel.borrow() {
                info!(cycles, "Sync scheduler received cancel signal, shutting down");
                break;
            }

            cycles += 1;
            match self.engine.run_cycle().await {
                Ok(report) => {
                    if report.statistics.has_failures() {
                        warn!(
                            run_id = %report.run_id,
                            writes_failed = report.statistics.writes_failed,
                            creates_failed = report.statistics.creates_failed,
                            "Sync cycle finished with failures"
                        );
                    }
                }
                Err(e) if e.is_transient() => {
                    warn!(error = %e, error_code = e.error_code(), "Sync cycle aborted, retrying next cycle");
                }
                Err(e) => {
                    error!(error = %e, error_code = e.error_code(), "Sync cycle aborted");
                }
            }

            if *cancel.borrow() {
                continue;
            }

            info!(interval_secs = self.interval.as_secs(), "Waiting for the next sync");
            let pause = tokio::time::sleep(self.interval);
            tokio::pin!(pause);
            // Only a cancel ends the pause early.
            loop {
                tokio::select! {
                    () = &mut pause => break,
                    changed = cancel.changed() => {
                        if *cancel.borrow() {
                            break;
                        }
                        if changed.is_err() {
                            (&mut pause).await;
                            break;
                        }
                    }
                }
            }
        }

        cycles
    }
}
