//! Queue types for the scheduler

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::error::ScheduleError;

/// Kind tag for a submitted operation
///
/// Purely informational: carried into ids, log fields, and reports. Has no
/// effect on ordering or priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Like,
    Unlike,
    ContentUpdate,
    CategoryUpdate,
    BoardUpdate,
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Like => write!(f, "like"),
            Self::Unlike => write!(f, "unlike"),
            Self::ContentUpdate => write!(f, "content_update"),
            Self::CategoryUpdate => write!(f, "category_update"),
            Self::BoardUpdate => write!(f, "board_update"),
        }
    }
}

impl std::str::FromStr for OpKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "like" => Ok(Self::Like),
            "unlike" => Ok(Self::Unlike),
            "content_update" => Ok(Self::ContentUpdate),
            "category_update" => Ok(Self::CategoryUpdate),
            "board_update" => Ok(Self::BoardUpdate),
            _ => Err(format!("Unknown operation kind: {}", s)),
        }
    }
}

/// Generate an operation id: kind prefix plus a UUIDv7 (timestamp + random
/// suffix). Internal lookup only, never exposed to callers.
pub(crate) fn operation_id(kind: OpKind) -> String {
    format!("{}-{}", kind, uuid::Uuid::now_v7())
}

/// What happens to a queued operation's settlement closure
pub(crate) enum Fate {
    /// Execute the operation and settle with its result
    Run,

    /// Settle immediately with a failure; the operation never runs
    Reject(ScheduleError),
}

/// Type-erased settlement closure owning both the caller's operation and
/// the reply channel. Consuming it is what makes settlement exactly-once.
/// The returned future reports whether the operation ran and succeeded.
pub(crate) type SettleJob = Box<dyn FnOnce(Fate) -> BoxFuture<'static, bool> + Send>;

/// One pending unit of work
pub(crate) struct QueuedOperation {
    pub id: String,
    pub kind: OpKind,
    pub submitted_at: Instant,
    pub job: SettleJob,
    pub timeout: JoinHandle<()>,
}

/// Insert an entry preserving ascending submission order.
///
/// Scans to the first entry with a strictly greater timestamp, so entries
/// with equal timestamps keep their insertion order.
pub(crate) fn insert_by_submission(pending: &mut VecDeque<QueuedOperation>, entry: QueuedOperation) {
    let at = pending
        .iter()
        .position(|queued| queued.submitted_at > entry.submitted_at)
        .unwrap_or(pending.len());
    pending.insert(at, entry);
}

/// Awaitable settlement handle returned by `submit`.
///
/// Resolves exactly once: with the operation's own result, or with a
/// [`ScheduleError`] describing why it never ran or did not finish.
pub struct Ticket<T> {
    rx: oneshot::Receiver<Result<T, ScheduleError>>,
}

impl<T> Ticket<T> {
    pub(crate) fn new(rx: oneshot::Receiver<Result<T, ScheduleError>>) -> Self {
        Self { rx }
    }
}

impl<T> Future for Ticket<T> {
    type Output = Result<T, ScheduleError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx).poll(cx).map(|settled| match settled {
            Ok(outcome) => outcome,
            // Sender dropped without settling: the scheduler was torn down
            Err(_) => Err(ScheduleError::Shutdown),
        })
    }
}

/// Non-mutating snapshot of scheduler state
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusSnapshot {
    pub queue_size: usize,
    pub in_flight: usize,
    pub max_concurrent: usize,
    pub max_queue_size: usize,
}

/// Statistics for the scheduler
#[derive(Debug, Default, Clone, Serialize)]
pub struct SchedulerStats {
    pub total_submitted: u64,
    pub total_completed: u64,
    pub total_failed: u64,
    pub total_evicted: u64,
    pub total_timed_out: u64,
    pub peak_queue_depth: usize,
    pub peak_concurrent: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry_at(id: &str, submitted_at: Instant) -> QueuedOperation {
        QueuedOperation {
            id: id.to_string(),
            kind: OpKind::Like,
            submitted_at,
            job: Box::new(|_| Box::pin(std::future::ready(false))),
            timeout: tokio::spawn(async {}),
        }
    }

    #[test]
    fn test_op_kind_display() {
        assert_eq!(OpKind::Like.to_string(), "like");
        assert_eq!(OpKind::Unlike.to_string(), "unlike");
        assert_eq!(OpKind::ContentUpdate.to_string(), "content_update");
        assert_eq!(OpKind::CategoryUpdate.to_string(), "category_update");
        assert_eq!(OpKind::BoardUpdate.to_string(), "board_update");
    }

    #[test]
    fn test_op_kind_parse() {
        assert_eq!("like".parse::<OpKind>().unwrap(), OpKind::Like);
        assert_eq!("BOARD_UPDATE".parse::<OpKind>().unwrap(), OpKind::BoardUpdate);
        assert!("delete".parse::<OpKind>().is_err());
    }

    #[test]
    fn test_op_kind_serde() {
        let json = serde_json::to_string(&OpKind::ContentUpdate).unwrap();
        assert_eq!(json, "\"content_update\"");

        let kind: OpKind = serde_json::from_str("\"unlike\"").unwrap();
        assert_eq!(kind, OpKind::Unlike);
    }

    #[test]
    fn test_operation_id_format() {
        let id = operation_id(OpKind::CategoryUpdate);
        assert!(id.starts_with("category_update-"));

        let other = operation_id(OpKind::CategoryUpdate);
        assert_ne!(id, other);
    }

    #[tokio::test]
    async fn test_insert_keeps_ascending_order() {
        let base = Instant::now();
        let mut pending = VecDeque::new();

        insert_by_submission(&mut pending, entry_at("c", base + Duration::from_millis(2)));
        insert_by_submission(&mut pending, entry_at("a", base));
        insert_by_submission(&mut pending, entry_at("b", base + Duration::from_millis(1)));

        let order: Vec<&str> = pending.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_insert_equal_timestamps_stable() {
        let base = Instant::now();
        let stamp = base + Duration::from_millis(5);
        let mut pending = VecDeque::new();

        insert_by_submission(&mut pending, entry_at("first", stamp));
        insert_by_submission(&mut pending, entry_at("second", stamp));
        insert_by_submission(&mut pending, entry_at("earlier", base));

        let order: Vec<&str> = pending.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, ["earlier", "first", "second"]);
    }

    #[tokio::test]
    async fn test_ticket_resolves_shutdown_when_sender_dropped() {
        let (tx, rx) = oneshot::channel::<Result<u32, ScheduleError>>();
        drop(tx);

        let ticket = Ticket::new(rx);
        assert!(matches!(ticket.await.unwrap_err(), ScheduleError::Shutdown));
    }
}
