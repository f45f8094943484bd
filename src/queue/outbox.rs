//! Offline submission queue.
//!
//! `OfflineQueue` tries to deliver each submitted record right away and keeps
//! it in a persisted queue when that is not possible. `flush` later drains the
//! queue once the API is reachable again.
//!
//! Concurrency notes:
//! - The in-memory queue sits behind an async mutex and every write to the
//!   store happens while that lock is held, so a `submit` running during a
//!   `flush` can never be overwritten by the flush's own persist.
//! - Every write stores the live queue and the in-flight batch together.
//! - The lock is never held across a delivery. Submissions keep flowing while
//!   a flush waits on the network.
//! - A second mutex gates `flush` itself, so overlapping triggers run one
//!   after the other instead of interleaving their batches.

use std::collections::VecDeque;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::persistence::{QueueStore, StoredQueue};
use crate::queue::Record;
use crate::transport::Delivery;
use crate::utils::error::StorageResult;

/// What happened to a submitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The API accepted the record.
    Delivered,
    /// The record was saved offline and will be retried on the next flush.
    Queued,
}

/// Result of a single `flush`.
///
/// `synced` counts deliveries as they succeed, so records submitted while the
/// flush was running do not skew it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    /// Records taken out of the queue for this flush.
    pub attempted: usize,
    pub synced: usize,
    pub requeued: usize,
    /// Queue length once the flush finished.
    pub remaining: usize,
}

/// Live queue plus the batch a running flush has taken out of it.
///
/// Both halves are written to the store together on every mutation, so the
/// persisted copy never holds a record twice.
#[derive(Debug, Default)]
struct QueueState {
    pending: Vec<Record>,
    in_flight: VecDeque<Record>,
}

pub struct OfflineQueue<D> {
    store: QueueStore,
    delivery: D,
    online: watch::Receiver<bool>,
    state: Mutex<QueueState>,
    flush_gate: Mutex<()>,
}

impl<D: Delivery> OfflineQueue<D> {
    /// Load the persisted queue and wrap it.
    ///
    /// Records left in flight by an interrupted flush go back to the front of
    /// the queue, ahead of anything queued after them.
    pub fn open(
        store: QueueStore,
        delivery: D,
        online: watch::Receiver<bool>,
    ) -> StorageResult<Self> {
        let StoredQueue {
            pending,
            in_flight,
        } = store.load()?;

        let pending = if in_flight.is_empty() {
            pending
        } else {
            info!(
                key = %store.queue_key(),
                count = in_flight.len(),
                "Recovered records from an interrupted flush"
            );
            let mut restored = in_flight;
            restored.extend(pending);
            store.persist(&restored, &[])?;
            restored
        };

        debug!(key = %store.queue_key(), count = pending.len(), "Loaded offline queue");

        Ok(Self {
            store,
            delivery,
            online,
            state: Mutex::new(QueueState {
                pending,
                in_flight: VecDeque::new(),
            }),
            flush_gate: Mutex::new(()),
        })
    }

    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.pending.is_empty()
    }

    /// Copy of the queued records, oldest first. Records a running flush is
    /// still delivering are not included.
    pub async fn snapshot(&self) -> Vec<Record> {
        self.state.lock().await.pending.clone()
    }

    /// Deliver `record` now if the API is reachable, otherwise (or on any
    /// delivery failure) save it offline.
    ///
    /// Only a failed write to the local store is an error; the in-memory
    /// queue is left as it was in that case.
    pub async fn submit(&self, record: Record) -> StorageResult<SubmitOutcome> {
        if self.is_online() {
            match self.delivery.deliver(&record).await {
                Ok(()) => {
                    info!(user_id = %record.user_id, "Expense delivered");
                    return Ok(SubmitOutcome::Delivered);
                }
                Err(e) => {
                    warn!(user_id = %record.user_id, error = %e, "Delivery failed, saving offline");
                }
            }
        } else {
            debug!(user_id = %record.user_id, "Offline, saving expense locally");
        }

        self.enqueue(record).await?;
        Ok(SubmitOutcome::Queued)
    }

    async fn enqueue(&self, mut record: Record) -> StorageResult<()> {
        record.stamp();

        let mut state = self.state.lock().await;
        state.pending.push(record);
        if let Err(e) = self.write(&mut state) {
            state.pending.pop();
            return Err(e);
        }

        info!(count = state.pending.len(), "Expense saved offline");
        Ok(())
    }

    /// Attempt delivery of every queued record.
    ///
    /// Does nothing while offline or when the queue is empty. Delivered
    /// records are dropped; failed ones are appended back to the live queue
    /// behind anything submitted in the meantime.
    pub async fn flush(&self) -> StorageResult<FlushReport> {
        let _gate = self.flush_gate.lock().await;

        if !self.is_online() {
            debug!("Offline, skipping flush");
            return Ok(FlushReport::default());
        }

        let mut report = {
            let mut state = self.state.lock().await;
            if state.pending.is_empty() {
                return Ok(FlushReport::default());
            }
            let batch = std::mem::take(&mut state.pending);
            state.in_flight = batch.into();
            if let Err(e) = self.write(&mut state) {
                self.requeue_in_flight(&mut state);
                return Err(e);
            }
            FlushReport {
                attempted: state.in_flight.len(),
                ..FlushReport::default()
            }
        };
        info!(count = report.attempted, "Flushing offline queue");

        loop {
            // stays in flight, and persisted as such, until delivery settles
            let Some(record) = self.state.lock().await.in_flight.front().cloned() else {
                break;
            };
            let outcome = self.delivery.deliver(&record).await;

            let mut state = self.state.lock().await;
            state.in_flight.pop_front();
            match outcome {
                Ok(()) => {
                    debug!(user_id = %record.user_id, timestamp = ?record.timestamp, "Synced offline record");
                    report.synced += 1;
                }
                Err(e) => {
                    warn!(user_id = %record.user_id, error = %e, "Failed to sync offline record");
                    report.requeued += 1;
                    state.pending.push(record);
                }
            }

            if let Err(e) = self.write(&mut state) {
                self.requeue_in_flight(&mut state);
                return Err(e);
            }
            report.remaining = state.pending.len();
        }

        info!(
            synced = report.synced,
            requeued = report.requeued,
            remaining = report.remaining,
            "Flush finished"
        );
        Ok(report)
    }

    fn write(&self, state: &mut QueueState) -> StorageResult<()> {
        self.store
            .persist(&state.pending, state.in_flight.make_contiguous())
    }

    /// Abandon a flush after a failed write: undelivered records rejoin the
    /// live queue, and the store is brought in line if it accepts writes.
    fn requeue_in_flight(&self, state: &mut QueueState) {
        state.pending.extend(state.in_flight.drain(..));

        if let Err(e) = self.write(state) {
            warn!(error = %e, "Store still rejects writes; in-flight records kept in memory");
        }
    }
}

impl<D> std::fmt::Debug for OfflineQueue<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineQueue")
            .field("store", &self.store)
            .field("online", &*self.online.borrow())
            .finish()
    }
}
