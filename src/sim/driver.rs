use super::{job::ProcessSpec, report::Report};
use crate::{
    config::{PolicyKind, SimConfig},
    core::{
        Finished, Pacing, SchedCore, SchedEvent, WorkerStats,
        state::{ProcessRecord, SchedulerState, Ticks},
    },
    error::SimError,
    scheduler::{FirstComeFirstServed, Policy, ShortestJobFirst},
};
use tracing::info;

/// Everything left behind once all processors have exited.
#[derive(Debug)]
pub struct Outcome {
    pub records: Vec<ProcessRecord>,
    pub clocks: Vec<Ticks>,
    pub events: Vec<SchedEvent>,
    pub workers: Vec<WorkerStats>,
    pub report: Report,
}

pub struct Sim {
    config: SimConfig,
}

impl Sim {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Build the table and validate it without starting any processor.
    pub fn prepare(&self) -> Result<SchedulerState, SimError> {
        let table = build_table(&self.config.processes)?;
        SchedulerState::new(table, self.config.num_cpus)
    }

    pub fn run(&self) -> Result<Outcome, SimError> {
        let state = self.prepare()?;
        let pacing = self.config.pacing();

        let finished = match self.config.policy {
            PolicyKind::Sjf => execute(state, ShortestJobFirst, pacing)?,
            PolicyKind::Fcfs => execute(state, FirstComeFirstServed, pacing)?,
        };

        let (records, clocks, observer) = finished.state.into_parts();
        let report = Report::from_records(&records);
        info!(
            avg_waiting = report.avg_waiting,
            avg_turnaround = report.avg_turnaround,
            "simulation finished"
        );

        Ok(Outcome {
            records,
            clocks,
            events: observer.into_events(),
            workers: finished.workers,
            report,
        })
    }
}

fn execute<P: Policy + 'static>(
    state: SchedulerState,
    policy: P,
    pacing: Pacing,
) -> Result<Finished, SimError> {
    SchedCore::new(state, policy, pacing).run()
}

fn build_table(specs: &[ProcessSpec]) -> Result<Vec<ProcessRecord>, SimError> {
    let mut table = Vec::new();
    table
        .try_reserve_exact(specs.len())
        .map_err(|source| SimError::Allocation {
            requested: specs.len(),
            source,
        })?;
    table.extend(specs.iter().map(ProcessSpec::to_record));
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(config: SimConfig) -> SimConfig {
        SimConfig {
            time_unit_ms: 0,
            ..config
        }
    }

    #[test]
    fn invalid_config_fails_before_running() {
        let sim = Sim::new(SimConfig {
            num_cpus: 0,
            ..Default::default()
        });
        let err = sim.run().unwrap_err();
        assert!(matches!(err, SimError::NoProcessors));
        assert!(err.is_init());

        let sim = Sim::new(SimConfig {
            processes: vec![ProcessSpec::new("X", 0, 1), ProcessSpec::new("X", 1, 1)],
            ..Default::default()
        });
        assert!(matches!(sim.prepare(), Err(SimError::DuplicateName(_))));
    }

    #[test]
    fn reference_run_completes() {
        let outcome = Sim::new(instant(SimConfig::default())).run().unwrap();
        assert_eq!(outcome.records.len(), 5);
        assert!(outcome.records.iter().all(ProcessRecord::is_done));
        assert_eq!(outcome.workers.len(), 2);
        assert_eq!(
            outcome.workers.iter().map(|w| w.dispatched).sum::<usize>(),
            5
        );

        let p1 = &outcome.records[0];
        assert_eq!(p1.name, "P1");
        assert_eq!(p1.waiting_time, 0);
        assert_eq!(p1.turnaround_time, 10);
    }

    #[test]
    fn fcfs_single_cpu_runs_in_arrival_order() {
        let outcome = Sim::new(instant(SimConfig {
            num_cpus: 1,
            policy: PolicyKind::Fcfs,
            ..Default::default()
        }))
        .run()
        .unwrap();

        let waits: Vec<_> = outcome.records.iter().map(|p| p.waiting_time).collect();
        // Finishes at 10, 15, 23, 29, 32
        assert_eq!(waits, vec![0, 9, 13, 20, 25]);
    }

    #[test]
    fn sjf_single_cpu_prefers_short_bursts() {
        let outcome = Sim::new(instant(SimConfig {
            num_cpus: 1,
            ..Default::default()
        }))
        .run()
        .unwrap();

        // P1 0-10, P5 10-13, P2 13-18, P4 18-24, P3 24-32
        let waits: Vec<_> = outcome.records.iter().map(|p| p.waiting_time).collect();
        assert_eq!(waits, vec![0, 12, 22, 15, 6]);
        assert_eq!(outcome.clocks, vec![32]);
        assert!((outcome.report.avg_waiting - 11.0).abs() < 1e-9);
    }
}
