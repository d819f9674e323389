//! Configuration for a simulation run

use crate::{
    DEFAULT_IDLE_POLL_MS, DEFAULT_NUM_CPUS, DEFAULT_TIME_UNIT_MS,
    core::Pacing,
    error::SimError,
    sim::job::{ProcessSpec, reference_workload},
};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Which ordering the selector applies to eligible processes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Shortest burst first
    #[default]
    Sjf,
    /// Earliest arrival first
    Fcfs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of virtual processors (one worker thread each)
    pub num_cpus: usize,

    pub policy: PolicyKind,

    /// Wall-clock milliseconds per simulated time unit; 0 disables pacing
    pub time_unit_ms: u64,

    /// How long a stalled processor waits before re-checking the table
    pub idle_poll_ms: u64,

    pub processes: Vec<ProcessSpec>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_cpus: DEFAULT_NUM_CPUS,
            policy: PolicyKind::default(),
            time_unit_ms: DEFAULT_TIME_UNIT_MS,
            idle_poll_ms: DEFAULT_IDLE_POLL_MS,
            processes: reference_workload(),
        }
    }
}

impl SimConfig {
    pub fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        // A zero poll would turn stalls into a spin
        Duration::from_millis(self.idle_poll_ms.max(1))
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            time_unit: self.time_unit(),
            idle_poll: self.idle_poll(),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SimError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, SimError> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| SimError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}
