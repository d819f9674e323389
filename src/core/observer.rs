use super::{
    event::SchedEvent,
    state::{CpuId, ProcId, Ticks},
};
use rustc_hash::{FxHashMap, FxHashSet};

/// Checks protocol invariants on every transition and keeps the timeline.
/// Only ever touched with the table lock held.
#[derive(Debug)]
pub struct Observer {
    events: Vec<SchedEvent>,
    dispatched: FxHashMap<ProcId, CpuId>,
    completed: FxHashSet<ProcId>,
    // Latest simulated time seen per cpu
    horizon: Vec<Ticks>,
    // Cpus whose last recorded event was a stall
    stalled: Vec<bool>,
}

impl Observer {
    pub fn new(num_cpus: usize) -> Self {
        Self {
            events: Vec::new(),
            dispatched: FxHashMap::default(),
            completed: FxHashSet::default(),
            horizon: vec![0; num_cpus],
            stalled: vec![false; num_cpus],
        }
    }

    pub fn observe(&mut self, event: SchedEvent) {
        match event {
            SchedEvent::Dispatched { cpu, process, at } => {
                let previous = self.dispatched.insert(process, cpu);
                assert!(
                    previous.is_none(),
                    "Process {process} dispatched twice (cpu {previous:?} then cpu {cpu})"
                );
                self.advance(cpu, at);
            }
            SchedEvent::Completed { cpu, process, at } => {
                debug_assert_eq!(
                    self.dispatched.get(&process),
                    Some(&cpu),
                    "Process {process} completed on cpu {cpu} without being dispatched there"
                );
                let first = self.completed.insert(process);
                debug_assert!(first, "Process {process} completed twice");
                self.advance(cpu, at);
            }
            SchedEvent::IdleAdvance { cpu, from, to } => {
                debug_assert!(from < to, "Idle advance on cpu {cpu} must move forward");
                self.advance(cpu, to);
            }
            SchedEvent::Stalled { cpu, at } => {
                self.advance(cpu, at);
                // One entry per streak; repeated polls add nothing new
                if self.stalled[cpu] {
                    return;
                }
            }
        }

        self.stalled[event.cpu()] = matches!(event, SchedEvent::Stalled { .. });
        self.events.push(event);
    }

    fn advance(&mut self, cpu: CpuId, at: Ticks) {
        debug_assert!(
            at >= self.horizon[cpu],
            "Time on cpu {cpu} went backwards ({} -> {at})",
            self.horizon[cpu]
        );
        self.horizon[cpu] = self.horizon[cpu].max(at);
    }

    pub fn events(&self) -> &[SchedEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SchedEvent> {
        self.events
    }

    pub fn dispatched_on(&self, process: ProcId) -> Option<CpuId> {
        self.dispatched.get(&process).copied()
    }
}
