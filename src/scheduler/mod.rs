pub mod fcfs;
pub mod sjf;

use crate::core::{
    Ticks,
    state::{ProcId, ProcessRecord, ProcessState},
};
pub use fcfs::FirstComeFirstServed;
pub use sjf::{ShortestJobFirst, select_next};

/// Picks the next process for a processor whose reference time is
/// `reference`. Implementations are pure queries over the table and must
/// impose a strict order on any candidate set.
pub trait Policy: Send + Sync {
    fn name(&self) -> &'static str;

    fn select(&self, table: &[ProcessRecord], reference: Ticks) -> Option<ProcId>;
}

/// Ready processes that have arrived by `reference`.
pub fn eligible(
    table: &[ProcessRecord],
    reference: Ticks,
) -> impl Iterator<Item = (ProcId, &ProcessRecord)> {
    table
        .iter()
        .enumerate()
        .filter(move |(_, p)| p.state == ProcessState::Ready && p.arrival_time <= reference)
}
