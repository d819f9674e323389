//! Runs the threaded engine end to end and checks the per-record arithmetic
//! and protocol invariants, whatever interleaving the processors produced.

use rustc_hash::FxHashMap;
use sjf_model::{
    PolicyKind, ProcessState, SchedEvent, SimConfig,
    sim::{Outcome, ProcessSpec, Sim, bernoulli_workload},
};

fn run(config: SimConfig) -> Outcome {
    Sim::new(config).run().expect("simulation failed")
}

fn assert_invariants(outcome: &Outcome, num_cpus: usize) {
    for record in &outcome.records {
        assert_eq!(record.state, ProcessState::Done, "{}", record.name);
        let cpu = record.assigned_cpu.expect("every process is assigned a cpu");
        assert!(cpu < num_cpus);
        assert_eq!(
            record.turnaround_time,
            record.waiting_time + record.burst_time,
            "{}",
            record.name
        );
    }

    // Exactly one dispatch and one completion per process, on the assigned cpu
    let mut dispatches: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
    let mut completions: FxHashMap<usize, usize> = FxHashMap::default();
    for event in &outcome.events {
        match *event {
            SchedEvent::Dispatched { cpu, process, .. } => {
                dispatches.entry(process).or_default().push(cpu)
            }
            SchedEvent::Completed { process, .. } => *completions.entry(process).or_default() += 1,
            _ => {}
        }
    }
    for (id, record) in outcome.records.iter().enumerate() {
        assert_eq!(dispatches[&id], vec![record.assigned_cpu.unwrap()]);
        assert_eq!(completions[&id], 1);
    }

    // Per-cpu simulated time never goes backwards
    let mut horizon = vec![0u64; num_cpus];
    for event in &outcome.events {
        let at = match *event {
            SchedEvent::Dispatched { at, .. }
            | SchedEvent::Completed { at, .. }
            | SchedEvent::Stalled { at, .. } => at,
            SchedEvent::IdleAdvance { from, to, .. } => {
                assert!(from < to);
                to
            }
        };
        let cpu = event.cpu();
        assert!(at >= horizon[cpu], "cpu {cpu} went from {} to {at}", horizon[cpu]);
        horizon[cpu] = at;
    }

    // Start times implied by the records respect arrivals and the clocks
    for event in &outcome.events {
        if let SchedEvent::Dispatched { process, at, .. } = *event {
            let record = &outcome.records[process];
            assert!(at >= record.arrival_time);
            assert_eq!(at - record.arrival_time, record.waiting_time);
        }
    }
    for (cpu, clock) in outcome.clocks.iter().enumerate() {
        assert_eq!(*clock, horizon[cpu]);
    }

    // Averages match a direct recomputation
    let n = outcome.records.len() as f64;
    let waiting: f64 = outcome.records.iter().map(|r| r.waiting_time as f64).sum::<f64>() / n;
    let turnaround: f64 =
        outcome.records.iter().map(|r| r.turnaround_time as f64).sum::<f64>() / n;
    assert!(outcome.report.avg_waiting.is_finite() && outcome.report.avg_waiting >= 0.0);
    assert!((outcome.report.avg_waiting - waiting).abs() < 1e-9);
    assert!((outcome.report.avg_turnaround - turnaround).abs() < 1e-9);
}

#[test]
fn reference_workload_unpaced_many_times() {
    for _ in 0..50 {
        let outcome = run(SimConfig {
            time_unit_ms: 0,
            ..Default::default()
        });
        assert_invariants(&outcome, 2);

        let p1 = &outcome.records[0];
        assert_eq!((p1.waiting_time, p1.turnaround_time), (0, 10));
    }
}

#[test]
fn reference_workload_paced() {
    let outcome = run(SimConfig {
        time_unit_ms: 1,
        idle_poll_ms: 1,
        ..Default::default()
    });
    assert_invariants(&outcome, 2);
    assert_eq!(outcome.records[0].waiting_time, 0);
}

#[test]
fn random_workloads_on_several_fleet_sizes() {
    for (seed, cpus) in [(1, 1), (2, 2), (3, 3), (4, 8)] {
        let processes = bernoulli_workload(120, 0.3, 0.3, 2, 6, seed);
        let outcome = run(SimConfig {
            num_cpus: cpus,
            time_unit_ms: 0,
            processes,
            ..Default::default()
        });
        assert_invariants(&outcome, cpus);
        assert_eq!(outcome.workers.len(), cpus);
    }
}

#[test]
fn fcfs_policy_holds_same_invariants() {
    let outcome = run(SimConfig {
        policy: PolicyKind::Fcfs,
        time_unit_ms: 0,
        ..Default::default()
    });
    assert_invariants(&outcome, 2);
}

#[test]
fn late_arrivals_force_idle_advance() {
    let outcome = run(SimConfig {
        num_cpus: 2,
        time_unit_ms: 0,
        processes: vec![ProcessSpec::new("late", 40, 2), ProcessSpec::new("later", 90, 1)],
        ..Default::default()
    });
    assert_invariants(&outcome, 2);
    assert!(outcome.records.iter().all(|p| p.waiting_time == 0));
    assert!(outcome.workers.iter().any(|w| w.idle_advances > 0));
}
