//! Synthetic workload driver
//!
//! Stands in for the UI handlers and backend calls that feed the
//! scheduler in a real deployment: submits a burst of operations with
//! simulated latency and failure rate, then tallies how each one settled.

use std::sync::Arc;
use std::time::Duration;

use eyre::{Result, eyre};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::scheduler::{OpKind, ScheduleError, Scheduler};

/// Synthetic workload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Number of operations per burst
    #[serde(default = "default_ops")]
    pub ops: usize,

    /// Simulated backend latency per operation in milliseconds
    #[serde(default = "default_op_delay_ms")]
    pub op_delay_ms: u64,

    /// Percentage of operations that fail in the backend
    #[serde(default = "default_fail_percent")]
    pub fail_percent: u8,
}

fn default_ops() -> usize {
    25
}

fn default_op_delay_ms() -> u64 {
    200
}

fn default_fail_percent() -> u8 {
    10
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            ops: 25,
            op_delay_ms: 200,
            fail_percent: 10,
        }
    }
}

/// Outcome tally for one burst
#[derive(Debug, Default, Clone, Serialize)]
pub struct BurstReport {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub evicted: usize,
    pub timed_out: usize,
    pub shut_down: usize,
}

/// Submit a burst of synthetic operations and wait for every settlement
pub async fn run_burst(scheduler: &Arc<Scheduler>, config: &WorkloadConfig) -> BurstReport {
    info!(
        ops = config.ops,
        op_delay_ms = config.op_delay_ms,
        fail_percent = config.fail_percent,
        "starting burst"
    );

    let delay = Duration::from_millis(config.op_delay_ms);
    let mut tickets = Vec::with_capacity(config.ops);
    for n in 0..config.ops {
        let kind = random_kind();
        let fail_percent = config.fail_percent;
        let ticket = scheduler
            .submit(kind, move || simulate_backend_call(n, delay, fail_percent))
            .await;
        tickets.push((kind, ticket));
    }

    let mut report = BurstReport {
        submitted: config.ops,
        ..Default::default()
    };
    for (kind, ticket) in tickets {
        match ticket.await {
            Ok(_) => report.succeeded += 1,
            Err(error) => {
                debug!(%kind, %error, "operation did not succeed");
                match error {
                    ScheduleError::QueueOverflow => report.evicted += 1,
                    ScheduleError::Timeout(_) => report.timed_out += 1,
                    ScheduleError::Shutdown => report.shut_down += 1,
                    ScheduleError::Operation(_) => report.failed += 1,
                }
            }
        }
    }

    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        evicted = report.evicted,
        timed_out = report.timed_out,
        "burst finished"
    );
    report
}

/// One synthetic backend call: fixed latency, configurable failure rate
async fn simulate_backend_call(n: usize, delay: Duration, fail_percent: u8) -> Result<u64> {
    tokio::time::sleep(delay).await;
    if rand::rng().random_range(0..100u32) < u32::from(fail_percent) {
        return Err(eyre!("backend rejected request {n}"));
    }
    Ok(n as u64)
}

fn random_kind() -> OpKind {
    match rand::rng().random_range(0..5u8) {
        0 => OpKind::Like,
        1 => OpKind::Unlike,
        2 => OpKind::ContentUpdate,
        3 => OpKind::CategoryUpdate,
        _ => OpKind::BoardUpdate,
    }
}
