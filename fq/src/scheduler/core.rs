//! Scheduler implementation

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Instant;

use eyre::Result;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::config::SchedulerConfig;
use super::error::ScheduleError;
use super::queue::{
    Fate, OpKind, QueuedOperation, SchedulerStats, SettleJob, StatusSnapshot, Ticket, insert_by_submission,
    operation_id,
};

/// Internal state protected by mutex
struct SchedulerInner {
    /// Pending operations in ascending submission order
    pending: VecDeque<QueuedOperation>,

    /// Operations currently executing
    in_flight: usize,

    /// Set by shutdown(); later submissions settle immediately
    closed: bool,

    /// Statistics
    stats: SchedulerStats,
}

/// The Scheduler serializes mutating operations against a shared backend
/// with a concurrency ceiling, queue-size bounding via oldest-first
/// eviction, and per-request queue-wait timeouts.
///
/// Every mutation of scheduler state happens inside a lock-held critical
/// section, so no compound update is ever interleaved with a suspension
/// point.
pub struct Scheduler {
    config: SchedulerConfig,
    inner: Mutex<SchedulerInner>,

    /// Self-reference handed to timeout and completion tasks; they no-op
    /// once the scheduler is gone
    weak: Weak<Scheduler>,
}

/// Settle a removed entry with a failure. Consuming the job is what makes
/// a second settlement impossible.
fn reject(entry: QueuedOperation, error: ScheduleError) {
    entry.timeout.abort();
    let _ = (entry.job)(Fate::Reject(error));
}

impl Scheduler {
    /// Create a new scheduler with the given configuration
    pub fn new(config: SchedulerConfig) -> Arc<Self> {
        debug!(?config, "Scheduler::new: called");
        Arc::new_cyclic(|weak| Self {
            config,
            inner: Mutex::new(SchedulerInner {
                pending: VecDeque::new(),
                in_flight: 0,
                closed: false,
                stats: SchedulerStats::default(),
            }),
            weak: weak.clone(),
        })
    }

    /// Submit an operation for execution.
    ///
    /// The operation is queued in submission order and started once a
    /// concurrency slot frees up. The returned [`Ticket`] resolves exactly
    /// once: with the operation's own result, or with a [`ScheduleError`]
    /// describing why it never ran.
    ///
    /// When the queue is full, the *oldest* pending operation is evicted
    /// to make room, so a submission can fail an unrelated older request.
    /// That is the documented overflow policy, not an accident: capacity
    /// is spent on recent work.
    pub async fn submit<T, F, Fut>(&self, kind: OpKind, operation: F) -> Ticket<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let id = operation_id(kind);
        debug!(%id, %kind, "Scheduler::submit: called");

        let (tx, rx) = oneshot::channel::<Result<T, ScheduleError>>();
        let job: SettleJob = Box::new(move |fate| match fate {
            Fate::Run => Box::pin(async move {
                let outcome = operation().await.map_err(ScheduleError::Operation);
                let ran_ok = outcome.is_ok();
                let _ = tx.send(outcome);
                ran_ok
            }),
            Fate::Reject(error) => {
                let _ = tx.send(Err(error));
                Box::pin(std::future::ready(false))
            }
        });

        let mut inner = self.inner.lock().await;

        if inner.closed {
            debug!(%id, "Scheduler::submit: scheduler closed, rejecting");
            drop(inner);
            let _ = job(Fate::Reject(ScheduleError::Shutdown));
            return Ticket::new(rx);
        }

        if inner.pending.len() >= self.config.max_queue_size {
            if let Some(victim) = inner.pending.pop_front() {
                warn!(id = %victim.id, kind = %victim.kind, "Scheduler::submit: queue full, evicting oldest pending");
                inner.stats.total_evicted += 1;
                reject(victim, ScheduleError::QueueOverflow);
            }
        }

        let entry = QueuedOperation {
            id: id.clone(),
            kind,
            submitted_at: Instant::now(),
            job,
            timeout: self.arm_timeout(id),
        };
        insert_by_submission(&mut inner.pending, entry);
        inner.stats.total_submitted += 1;
        inner.stats.peak_queue_depth = inner.stats.peak_queue_depth.max(inner.pending.len());
        drop(inner);

        self.pump().await;

        Ticket::new(rx)
    }

    /// Arm the queue-wait timeout for a pending operation.
    ///
    /// The handle is aborted at admission: the timeout bounds time spent
    /// waiting in the queue, never execution time.
    fn arm_timeout(&self, id: String) -> JoinHandle<()> {
        let wait = self.config.request_timeout();
        let scheduler = self.weak.clone();
        tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            if let Some(scheduler) = scheduler.upgrade() {
                scheduler.expire(&id).await;
            }
        })
    }

    /// Remove a pending operation whose queue-wait timeout fired.
    ///
    /// Racing with admission is expected: both sides remove the entry
    /// under the state lock, so exactly one of them finds it and the
    /// loser is a no-op.
    async fn expire(&self, id: &str) {
        let mut inner = self.inner.lock().await;
        let Some(at) = inner.pending.iter().position(|entry| entry.id == id) else {
            debug!(%id, "Scheduler::expire: already admitted or removed");
            return;
        };
        let Some(entry) = inner.pending.remove(at) else {
            return;
        };
        inner.stats.total_timed_out += 1;
        drop(inner);

        warn!(%id, kind = %entry.kind, waited = ?entry.submitted_at.elapsed(), "Scheduler::expire: timed out waiting for admission");
        reject(entry, ScheduleError::Timeout(self.config.request_timeout()));
    }

    /// Admit queued operations while concurrency slots are free
    fn pump(&self) -> std::pin::Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
        loop {
            let mut inner = self.inner.lock().await;
            if inner.in_flight >= self.config.max_concurrent {
                break;
            }
            let Some(entry) = inner.pending.pop_front() else {
                break;
            };
            entry.timeout.abort();
            inner.in_flight += 1;
            inner.stats.peak_concurrent = inner.stats.peak_concurrent.max(inner.in_flight);
            drop(inner);

            debug!(id = %entry.id, kind = %entry.kind, waited = ?entry.submitted_at.elapsed(), "Scheduler::pump: admitting");
            let run = (entry.job)(Fate::Run);
            let scheduler = self.weak.clone();
            tokio::spawn(async move {
                let ran_ok = run.await;
                if let Some(scheduler) = scheduler.upgrade() {
                    scheduler.finish(ran_ok).await;
                }
            });
        }
        })
    }

    /// Record a completion and try to admit the next queued operation
    async fn finish(&self, ran_ok: bool) {
        let mut inner = self.inner.lock().await;
        inner.in_flight = inner.in_flight.saturating_sub(1);
        inner.stats.total_completed += 1;
        if !ran_ok {
            inner.stats.total_failed += 1;
        }
        drop(inner);

        // One scheduling tick between a completion and the next admission
        // pass, so timeouts and fresh submissions interleave while the
        // queue drains continuously.
        tokio::task::yield_now().await;
        self.pump().await;
    }

    /// Non-mutating snapshot of queue depth and in-flight count
    pub async fn status(&self) -> StatusSnapshot {
        let inner = self.inner.lock().await;
        StatusSnapshot {
            queue_size: inner.pending.len(),
            in_flight: inner.in_flight,
            max_concurrent: self.config.max_concurrent,
            max_queue_size: self.config.max_queue_size,
        }
    }

    /// Get the scheduler statistics
    pub async fn stats(&self) -> SchedulerStats {
        let inner = self.inner.lock().await;
        inner.stats.clone()
    }

    /// Drain the queue, settling every pending operation with
    /// [`ScheduleError::Shutdown`]. In-flight operations run to
    /// completion; later submissions settle with `Shutdown` immediately.
    pub async fn shutdown(&self) {
        debug!("Scheduler::shutdown: called");
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return;
        }
        inner.closed = true;
        let drained: Vec<QueuedOperation> = inner.pending.drain(..).collect();
        drop(inner);

        if !drained.is_empty() {
            warn!(rejected = drained.len(), "Scheduler::shutdown: rejecting pending operations");
        }
        for entry in drained {
            reject(entry, ScheduleError::Shutdown);
        }
    }
}
