//! Background polling of a batch until it reaches a terminal status
//!
//! Views watch a freshly uploaded batch move through the processing
//! stages. The watcher re-fetches on a fixed interval through the
//! authenticated request path, never overlaps polls, absorbs transient
//! fetch errors, and stops on its own the moment the batch is terminal.
//! Cancellation (explicit stop or dropping the handle) is the only other
//! way the loop ends; a cancelled watcher can no longer publish updates.

use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::BatchesApi;
use crate::entities::Batch;

/// Interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Handle to a spawned polling task.
///
/// Dropping the handle tears the task down immediately.
pub struct BatchWatcher {
    updates: watch::Receiver<Option<Batch>>,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl BatchWatcher {
    /// Start polling `batch_id` every `interval`.
    ///
    /// The first poll fires after one full interval; an explicit
    /// foreground fetch is the caller's responsibility. Spawn only for a
    /// batch that is not already terminal.
    pub fn spawn(api: BatchesApi, batch_id: impl Into<String>, interval: Duration) -> Self {
        let batch_id = batch_id.into();
        let (tx, rx) = watch::channel(None);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The zeroth tick completes immediately; consume it so the
            // first poll waits a full interval.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {}
                }

                tokio::select! {
                    _ = &mut stop_rx => break,
                    fetched = api.get(&batch_id) => match fetched {
                        Ok(batch) => {
                            let terminal = batch.is_terminal();
                            if tx.send(Some(batch)).is_err() {
                                break;
                            }
                            if terminal {
                                tracing::debug!(batch_id = %batch_id, "batch reached terminal status, polling stopped");
                                break;
                            }
                        }
                        Err(e) => {
                            // Transient poll failures are not surfaced;
                            // the next interval fires regardless.
                            tracing::debug!(batch_id = %batch_id, error = %e, "background poll failed");
                        }
                    }
                }
            }
        });

        Self {
            updates: rx,
            stop: Some(stop_tx),
            task,
        }
    }

    /// Receiver of batch updates; holds `None` until the first
    /// successful poll.
    pub fn updates(&self) -> watch::Receiver<Option<Batch>> {
        self.updates.clone()
    }

    /// Ask the polling task to stop at the next opportunity.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// True once the polling task has ended, whatever the reason.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for BatchWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
