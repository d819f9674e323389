use crate::core::state::{ProcessRecord, Ticks};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// One row of the input process table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub name: String,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
}

impl ProcessSpec {
    pub fn new(name: impl Into<String>, arrival_time: Ticks, burst_time: Ticks) -> Self {
        Self {
            name: name.into(),
            arrival_time,
            burst_time,
        }
    }

    pub fn to_record(&self) -> ProcessRecord {
        ProcessRecord::new(self.name.clone(), self.arrival_time, self.burst_time)
    }
}

/// Five processes arriving one unit apart: P1..P5, bursts 10, 5, 8, 6, 3.
pub fn reference_workload() -> Vec<ProcessSpec> {
    const ARRIVAL: [Ticks; 5] = [0, 1, 2, 3, 4];
    const BURST: [Ticks; 5] = [10, 5, 8, 6, 3];

    ARRIVAL
        .iter()
        .zip(BURST)
        .enumerate()
        .map(|(i, (&arrival, burst))| ProcessSpec::new(format!("P{}", i + 1), arrival, burst))
        .collect()
}

/// Each tick a process arrives with probability `p_arrival`; it is short with
/// probability `p_short`. Same seed, same table.
pub fn bernoulli_workload(
    ticks: Ticks,
    p_arrival: f64,
    p_short: f64,
    short_ticks: Ticks,
    long_ticks: Ticks,
    seed: u64,
) -> Vec<ProcessSpec> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut jobs = Vec::new();

    for t in 0..ticks {
        if rng.random::<f64>() < p_arrival {
            let burst = if rng.random::<f64>() < p_short {
                short_ticks
            } else {
                long_ticks
            };

            jobs.push(ProcessSpec::new(format!("P{}", jobs.len() + 1), t, burst));
        }
    }

    jobs
}
