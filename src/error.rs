//! Error types for the simulator

use std::{collections::TryReserveError, io, path::PathBuf};
use thiserror::Error;

/// Errors raised while building or running a simulation
#[derive(Error, Debug)]
pub enum SimError {
    #[error("process table is empty")]
    EmptyTable,

    #[error("at least one processor is required")]
    NoProcessors,

    #[error("process name must not be empty")]
    EmptyName,

    #[error("process name {name:?} is longer than {max} bytes")]
    NameTooLong { name: String, max: usize },

    #[error("duplicate process name {0:?}")]
    DuplicateName(String),

    #[error("process {name} has a zero burst time")]
    ZeroBurst { name: String },

    #[error("process {name} would finish past the end of simulated time")]
    TimeOverflow { name: String },

    #[error("process {name} must start Ready and unassigned")]
    NotReady { name: String },

    #[error("failed to allocate a table of {requested} entries")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("failed to read config {path:?}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("failed to write config {path:?}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn worker for cpu {cpu}")]
    Spawn {
        cpu: usize,
        #[source]
        source: io::Error,
    },

    #[error("worker for cpu {cpu} panicked")]
    WorkerPanicked { cpu: usize },

    #[error("scheduler state still shared after all workers joined")]
    StateStillShared,
}

impl SimError {
    /// True for failures detected before any worker was started.
    pub fn is_init(&self) -> bool {
        !matches!(
            self,
            Self::Spawn { .. } | Self::WorkerPanicked { .. } | Self::StateStillShared
        )
    }
}
