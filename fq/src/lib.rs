//! Fairqueue - bounded fair request scheduler
//!
//! A small, load-shedding scheduler that serializes mutating operations
//! against a shared backend. Callers hand it opaque asynchronous
//! operations; it bounds how many run at once, how many may wait, and how
//! long any of them waits.
//!
//! # Core Concepts
//!
//! - **Bounded parallelism**: at most `max_concurrent` operations in flight
//! - **Bounded memory**: a full queue evicts its oldest pending entry
//! - **Bounded waiting**: queued operations time out; running ones never do
//! - **Exactly-once settlement**: every accepted ticket resolves exactly once
//!
//! # Modules
//!
//! - [`scheduler`] - the scheduler core, its configuration and errors
//! - [`workload`] - synthetic workload driver used by the binary
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod scheduler;
pub mod workload;

// Re-export commonly used types
pub use config::Config;
pub use scheduler::{OpKind, ScheduleError, Scheduler, SchedulerConfig, SchedulerStats, StatusSnapshot, Ticket};
pub use workload::{BurstReport, WorkloadConfig};
