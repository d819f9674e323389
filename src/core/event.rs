use crate::core::{CpuId, ProcId, Ticks};

/// Transitions recorded in lock order. `at` is in simulated time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedEvent {
    Dispatched {
        cpu: CpuId,
        process: ProcId,
        at: Ticks,
    },
    Completed {
        cpu: CpuId,
        process: ProcId,
        at: Ticks,
    },
    // No eligible process; clock jumped to the next arrival
    IdleAdvance {
        cpu: CpuId,
        from: Ticks,
        to: Ticks,
    },
    // Nothing eligible and nothing left to arrive
    Stalled {
        cpu: CpuId,
        at: Ticks,
    },
}

impl SchedEvent {
    pub fn cpu(&self) -> CpuId {
        match *self {
            Self::Dispatched { cpu, .. }
            | Self::Completed { cpu, .. }
            | Self::IdleAdvance { cpu, .. }
            | Self::Stalled { cpu, .. } => cpu,
        }
    }
}
