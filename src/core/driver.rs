use super::state::{CpuId, Execution, SchedulerState, Step, Ticks};
use crate::{error::SimError, scheduler::Policy};
use parking_lot::{Condvar, Mutex};
use std::{sync::Arc, thread, time::Duration};
use tracing::{debug, error, info, trace};

/// Wall-clock scaling of simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub time_unit: Duration,
    pub idle_poll: Duration,
}

impl Pacing {
    /// Drive the clocks purely by arithmetic.
    pub fn instant() -> Self {
        Self {
            time_unit: Duration::ZERO,
            idle_poll: Duration::from_millis(1),
        }
    }

    pub fn scaled(&self, ticks: Ticks) -> Duration {
        self.time_unit
            .saturating_mul(u32::try_from(ticks).unwrap_or(u32::MAX))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub cpu: CpuId,
    pub dispatched: usize,
    pub idle_advances: usize,
    pub stalls: usize,
}

struct Shared<P> {
    state: Mutex<SchedulerState>,
    // Signalled on every completion so idle workers re-check early
    progress: Condvar,
    policy: P,
    pacing: Pacing,
}

/// Owns the process table while the processors run.
pub struct SchedCore<P: Policy + 'static> {
    shared: Arc<Shared<P>>,
}

pub struct Finished {
    pub state: SchedulerState,
    pub workers: Vec<WorkerStats>,
}

impl<P: Policy + 'static> SchedCore<P> {
    pub fn new(state: SchedulerState, policy: P, pacing: Pacing) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                progress: Condvar::new(),
                policy,
                pacing,
            }),
        }
    }

    /// Spawn one worker per processor and block until every process is done.
    pub fn run(self) -> Result<Finished, SimError> {
        let (num_cpus, total) = {
            let state = self.shared.state.lock();
            (state.num_cpus(), state.num_processes())
        };
        info!(
            cpus = num_cpus,
            processes = total,
            policy = self.shared.policy.name(),
            "starting processors"
        );

        let mut handles = Vec::with_capacity(num_cpus);
        for cpu in 0..num_cpus {
            let shared = Arc::clone(&self.shared);
            let handle = thread::Builder::new()
                .name(format!("cpu-{cpu}"))
                .spawn(move || Processor { cpu, shared }.run())
                .map_err(|source| SimError::Spawn { cpu, source })?;
            handles.push(handle);
        }

        // Join everyone before reporting a panic so no worker is left behind
        let mut workers = Vec::with_capacity(num_cpus);
        let mut panicked = None;
        for (cpu, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(stats) => workers.push(stats),
                Err(_) => {
                    panicked.get_or_insert(cpu);
                }
            }
        }
        if let Some(cpu) = panicked {
            return Err(SimError::WorkerPanicked { cpu });
        }

        let shared = Arc::try_unwrap(self.shared).map_err(|_| SimError::StateStillShared)?;
        let state = shared.state.into_inner();
        info!(completed = state.completed, clocks = ?state.clocks, "all processors exited");

        Ok(Finished { state, workers })
    }
}

struct Processor<P> {
    cpu: CpuId,
    shared: Arc<Shared<P>>,
}

/// Aborts the run if its worker unwinds, so the others stop waiting on
/// work that will never be committed.
struct AbortOnPanic<'a, P> {
    cpu: CpuId,
    shared: &'a Shared<P>,
}

impl<P> Drop for AbortOnPanic<'_, P> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!(cpu = self.cpu, "processor panicked, aborting run");
            self.shared.state.lock().abort();
            self.shared.progress.notify_all();
        }
    }
}

impl<P: Policy> Processor<P> {
    fn run(self) -> WorkerStats {
        let _guard = AbortOnPanic {
            cpu: self.cpu,
            shared: &self.shared,
        };
        let mut stats = WorkerStats {
            cpu: self.cpu,
            ..WorkerStats::default()
        };
        let pacing = self.shared.pacing;

        loop {
            let mut state = self.shared.state.lock();
            match state.step(self.cpu, &self.shared.policy) {
                Step::Exit => break,
                Step::Dispatch(dispatch) => {
                    debug!(
                        cpu = self.cpu,
                        process = %state.process(dispatch.process).name,
                        clock = dispatch.clock,
                        burst = dispatch.burst_time,
                        "dispatched"
                    );
                    drop(state);
                    stats.dispatched += 1;

                    let execution = dispatch.execute();
                    let busy = pacing.scaled(dispatch.burst_time);
                    if !busy.is_zero() {
                        thread::sleep(busy);
                    }
                    self.complete(&execution);
                }
                Step::Idle { until, delta } => {
                    debug!(cpu = self.cpu, until, delta, "idle until next arrival");
                    stats.idle_advances += 1;

                    let wait = pacing.scaled(delta);
                    if !wait.is_zero() {
                        // Releases the lock while waiting
                        self.shared.progress.wait_for(&mut state, wait);
                    }
                }
                Step::Stall => {
                    trace!(cpu = self.cpu, "stalled, waiting on running work");
                    stats.stalls += 1;
                    self.shared.progress.wait_for(&mut state, pacing.idle_poll);
                }
            }
        }

        debug!(cpu = self.cpu, dispatched = stats.dispatched, "processor exited");
        stats
    }

    fn complete(&self, execution: &Execution) {
        let mut state = self.shared.state.lock();
        state.commit(execution);
        debug!(
            cpu = self.cpu,
            process = %state.process(execution.process).name,
            start = execution.start,
            finish = execution.finish,
            waiting = execution.waiting_time,
            "completed"
        );
        drop(state);
        self.shared.progress.notify_all();
    }
}
