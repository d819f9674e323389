//! Shortest-job-first dispatch across a pool of virtual processors.
//!
//! Each processor is a worker thread that repeatedly locks the shared
//! process table, picks the best eligible process for its own virtual
//! clock, and simulates running it with the lock released.

pub mod config;
pub mod core;
pub mod error;
pub mod scheduler;
pub mod sim;

pub use config::{PolicyKind, SimConfig};
pub use crate::core::{ProcessRecord, ProcessState, SchedEvent, SchedulerState};
pub use error::SimError;
pub use scheduler::{Policy, select_next};
pub use sim::{Outcome, ProcessSpec, Report, Sim};

/// Processors in the reference topology
pub const DEFAULT_NUM_CPUS: usize = 2;

/// Wall-clock milliseconds per simulated time unit
pub const DEFAULT_TIME_UNIT_MS: u64 = 10;

/// Re-check interval for a processor with nothing left to pick up
pub const DEFAULT_IDLE_POLL_MS: u64 = 5;
