use super::{Policy, eligible};
use crate::core::state::{ProcId, ProcessRecord, Ticks};

/// Shortest burst first; ties go to the earlier arrival, then to the
/// lexicographically smaller name.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShortestJobFirst;

impl Policy for ShortestJobFirst {
    fn name(&self) -> &'static str {
        "sjf"
    }

    fn select(&self, table: &[ProcessRecord], reference: Ticks) -> Option<ProcId> {
        select_next(table, reference)
    }
}

pub fn select_next(table: &[ProcessRecord], reference: Ticks) -> Option<ProcId> {
    eligible(table, reference)
        .min_by(|(a_id, a), (b_id, b)| {
            a.burst_time
                .cmp(&b.burst_time)
                .then_with(|| a.arrival_time.cmp(&b.arrival_time))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a_id.cmp(b_id))
        })
        .map(|(id, _)| id)
}
