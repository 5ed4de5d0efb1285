use super::{Result, Shipper, TickStats};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Single re-arming timer around [`Shipper::tick`].
///
/// At most one tick runs at a time: the loop only sleeps again after the
/// previous tick has fully returned, so uploads stay strictly serialized.
/// The cancellation token and the task handle realize the
/// Running/Stopping/Stopped lifecycle: cancelling stops the pending timer,
/// joining the handle proves no tick is in flight.
///
/// Calling [`shutdown`](Scheduler::shutdown) before process exit is a
/// mandatory part of the lifecycle contract. The scheduler registers no
/// process-exit hooks; a host that skips shutdown strands whatever the
/// writer appended after the last tick.
pub struct Scheduler {
    shipper: Arc<Shipper>,
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    /// Begin single-shot re-arming: after each tick completes, success or
    /// failure, a new delay of `period` is scheduled.
    pub fn start(shipper: Arc<Shipper>, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let loop_shipper = Arc::clone(&shipper);
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = loop_cancel.cancelled() => break,
                    _ = tokio::time::sleep(period) => {}
                }
                log_outcome(loop_shipper.tick().await);
            }
        });
        Self {
            shipper,
            cancel,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Stop the timer, wait for any in-flight tick, then run one final tick
    /// so no buffered backlog is stranded. Idempotent: later calls return
    /// immediately.
    pub async fn shutdown(&self) {
        let handle = self.handle.lock().unwrap().take();
        let Some(handle) = handle else { return };

        info!("Shutting down shipper");
        self.cancel.cancel();
        if let Err(e) = handle.await {
            warn!(error = %e, "Shipping loop task failed to join");
        }
        log_outcome(self.shipper.tick().await);
    }
}

fn log_outcome(outcome: Result<TickStats>) {
    match outcome {
        Ok(stats) if stats.lines > 0 => {
            info!(batches = stats.batches, lines = stats.lines, "Shipped")
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Tick failed, will retry on next period"),
    }
}
