use super::{Policy, eligible};
use crate::core::state::{ProcId, ProcessRecord, Ticks};

/// Earliest arrival first, name as tie-break. Used as a baseline against SJF.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstComeFirstServed;

impl Policy for FirstComeFirstServed {
    fn name(&self) -> &'static str {
        "fcfs"
    }

    fn select(&self, table: &[ProcessRecord], reference: Ticks) -> Option<ProcId> {
        eligible(table, reference)
            .min_by(|(a_id, a), (b_id, b)| {
                a.arrival_time
                    .cmp(&b.arrival_time)
                    .then_with(|| a.name.cmp(&b.name))
                    .then_with(|| a_id.cmp(b_id))
            })
            .map(|(id, _)| id)
    }
}
