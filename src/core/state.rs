use super::{event::SchedEvent, observer::Observer};
use crate::{error::SimError, scheduler::Policy};
use rustc_hash::FxHashSet;
use std::cmp;

// Index into the process table
pub type ProcId = usize;
pub type CpuId = usize;
pub type Ticks = u64;

/// Longest process name accepted, in bytes.
pub const MAX_NAME_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Ready,
    Running,
    Done,
}

#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pub name: String,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub waiting_time: Ticks,
    pub turnaround_time: Ticks,
    pub assigned_cpu: Option<CpuId>,
    pub state: ProcessState,
}

impl ProcessRecord {
    pub fn new(name: impl Into<String>, arrival_time: Ticks, burst_time: Ticks) -> Self {
        Self {
            name: name.into(),
            arrival_time,
            burst_time,
            waiting_time: 0,
            turnaround_time: 0,
            assigned_cpu: None,
            state: ProcessState::Ready,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == ProcessState::Done
    }
}

/// Values copied out of the table when a process is dispatched. Everything a
/// worker needs to simulate the run without holding the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub process: ProcId,
    pub cpu: CpuId,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub clock: Ticks,
}

impl Dispatch {
    pub fn execute(&self) -> Execution {
        let start = cmp::max(self.clock, self.arrival_time);
        let finish = start + self.burst_time;
        Execution {
            process: self.process,
            cpu: self.cpu,
            start,
            finish,
            waiting_time: start.saturating_sub(self.arrival_time),
            turnaround_time: finish - self.arrival_time,
        }
    }
}

/// Outcome of a simulated run, published back to the table on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    pub process: ProcId,
    pub cpu: CpuId,
    pub start: Ticks,
    pub finish: Ticks,
    pub waiting_time: Ticks,
    pub turnaround_time: Ticks,
}

/// What a processor should do after one pass over the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Exit,
    Dispatch(Dispatch),
    // Clock was moved forward to the next arrival; `delta` units were skipped
    Idle { until: Ticks, delta: Ticks },
    // Nothing left to arrive, remaining work is running elsewhere
    Stall,
}

#[derive(Debug)]
pub struct SchedulerState {
    pub processes: Vec<ProcessRecord>,
    pub clocks: Vec<Ticks>,
    pub completed: usize,
    // Set when a worker dies; everyone else exits on their next pass
    aborted: bool,
    observer: Observer,
}

impl SchedulerState {
    pub fn new(processes: Vec<ProcessRecord>, num_cpus: usize) -> Result<Self, SimError> {
        if num_cpus == 0 {
            return Err(SimError::NoProcessors);
        }
        if processes.is_empty() {
            return Err(SimError::EmptyTable);
        }

        let mut seen = FxHashSet::default();
        for process in &processes {
            if process.name.is_empty() {
                return Err(SimError::EmptyName);
            }
            if process.name.len() > MAX_NAME_LEN {
                return Err(SimError::NameTooLong {
                    name: process.name.clone(),
                    max: MAX_NAME_LEN,
                });
            }
            if process.burst_time == 0 {
                return Err(SimError::ZeroBurst {
                    name: process.name.clone(),
                });
            }
            if process.arrival_time.checked_add(process.burst_time).is_none() {
                return Err(SimError::TimeOverflow {
                    name: process.name.clone(),
                });
            }
            if process.state != ProcessState::Ready || process.assigned_cpu.is_some() {
                return Err(SimError::NotReady {
                    name: process.name.clone(),
                });
            }
            if !seen.insert(process.name.as_str()) {
                return Err(SimError::DuplicateName(process.name.clone()));
            }
        }

        let mut clocks = Vec::new();
        clocks
            .try_reserve_exact(num_cpus)
            .map_err(|source| SimError::Allocation {
                requested: num_cpus,
                source,
            })?;
        clocks.resize(num_cpus, 0);

        Ok(Self {
            processes,
            clocks,
            completed: 0,
            aborted: false,
            observer: Observer::new(num_cpus),
        })
    }

    pub fn num_cpus(&self) -> usize {
        self.clocks.len()
    }

    pub fn num_processes(&self) -> usize {
        self.processes.len()
    }

    pub fn all_done(&self) -> bool {
        self.completed >= self.processes.len()
    }

    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn process(&self, process: ProcId) -> &ProcessRecord {
        &self.processes[process]
    }

    pub fn clock(&self, cpu: CpuId) -> Ticks {
        self.clocks[cpu]
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// A processor never looks earlier than the slowest processor in the
    /// fleet, nor earlier than its own clock.
    pub fn reference_time(&self, cpu: CpuId) -> Ticks {
        let fleet_min = self.clocks.iter().copied().min().unwrap_or(0);
        cmp::max(self.clocks[cpu], fleet_min)
    }

    /// Earliest arrival strictly after `reference` among unfinished processes.
    pub fn next_arrival_after(&self, reference: Ticks) -> Option<Ticks> {
        self.processes
            .iter()
            .filter(|p| !p.is_done() && p.arrival_time > reference)
            .map(|p| p.arrival_time)
            .min()
    }

    /// One pass of the processor protocol. Must be called with the table lock
    /// held; the returned step tells the caller what to do once released.
    pub fn step<P: Policy + ?Sized>(&mut self, cpu: CpuId, policy: &P) -> Step {
        if self.all_done() || self.aborted {
            return Step::Exit;
        }

        let reference = self.reference_time(cpu);
        if let Some(process) = policy.select(&self.processes, reference) {
            return Step::Dispatch(self.mark_running(process, cpu));
        }

        match self.next_arrival_after(reference) {
            Some(until) => {
                let from = self.clocks[cpu];
                self.advance_clock(cpu, until);
                self.observer.observe(SchedEvent::IdleAdvance {
                    cpu,
                    from,
                    to: until,
                });
                Step::Idle {
                    until,
                    delta: until.saturating_sub(from),
                }
            }
            None => {
                self.observer.observe(SchedEvent::Stalled {
                    cpu,
                    at: self.clocks[cpu],
                });
                Step::Stall
            }
        }
    }

    pub fn mark_running(&mut self, process: ProcId, cpu: CpuId) -> Dispatch {
        let clock = self.clocks[cpu];
        let record = &mut self.processes[process];
        debug_assert_eq!(
            record.state,
            ProcessState::Ready,
            "Process {} must be Ready to dispatch",
            record.name
        );
        debug_assert!(
            record.assigned_cpu.is_none(),
            "Process {} already assigned a cpu",
            record.name
        );

        record.state = ProcessState::Running;
        record.assigned_cpu = Some(cpu);
        let dispatch = Dispatch {
            process,
            cpu,
            arrival_time: record.arrival_time,
            burst_time: record.burst_time,
            clock,
        };

        self.observer.observe(SchedEvent::Dispatched {
            cpu,
            process,
            at: cmp::max(clock, dispatch.arrival_time),
        });
        dispatch
    }

    pub fn commit(&mut self, execution: &Execution) {
        let record = &mut self.processes[execution.process];
        debug_assert_eq!(
            record.state,
            ProcessState::Running,
            "Process {} must be Running before completion",
            record.name
        );
        debug_assert_eq!(record.assigned_cpu, Some(execution.cpu));

        record.state = ProcessState::Done;
        record.waiting_time = execution.waiting_time;
        record.turnaround_time = execution.turnaround_time;
        self.completed += 1;

        self.advance_clock(execution.cpu, execution.finish);
        self.observer.observe(SchedEvent::Completed {
            cpu: execution.cpu,
            process: execution.process,
            at: execution.finish,
        });
    }

    fn advance_clock(&mut self, cpu: CpuId, to: Ticks) {
        debug_assert!(
            to >= self.clocks[cpu],
            "Clock of cpu {cpu} would move backwards ({} -> {to})",
            self.clocks[cpu]
        );
        self.clocks[cpu] = cmp::max(self.clocks[cpu], to);
    }

    pub fn into_parts(self) -> (Vec<ProcessRecord>, Vec<Ticks>, Observer) {
        (self.processes, self.clocks, self.observer)
    }
}
