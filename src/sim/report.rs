use crate::core::state::{CpuId, ProcessRecord, Ticks};
use average::{Estimate, Mean};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub name: String,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub cpu: Option<CpuId>,
    pub waiting_time: Ticks,
    pub turnaround_time: Ticks,
}

/// Per-process metrics and fleet-wide means, read from a finished table.
#[derive(Debug, Clone)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub avg_waiting: f64,
    pub avg_turnaround: f64,
}

impl Report {
    pub fn from_records(records: &[ProcessRecord]) -> Self {
        let rows: Vec<ReportRow> = records
            .iter()
            .map(|p| ReportRow {
                name: p.name.clone(),
                arrival_time: p.arrival_time,
                burst_time: p.burst_time,
                cpu: p.assigned_cpu,
                waiting_time: p.waiting_time,
                turnaround_time: p.turnaround_time,
            })
            .collect();

        Self {
            avg_waiting: avg(rows.iter().map(|r| r.waiting_time as f64)),
            avg_turnaround: avg(rows.iter().map(|r| r.turnaround_time as f64)),
            rows,
        }
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<Mean>().estimate()
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<10}{:>9}{:>7}{:>5}{:>9}{:>12}",
            "Process", "Arrival", "Burst", "CPU", "Waiting", "Turnaround"
        )?;
        for row in &self.rows {
            let cpu = row
                .cpu
                .map_or_else(|| "-".to_string(), |cpu| cpu.to_string());
            writeln!(
                f,
                "{:<10}{:>9}{:>7}{:>5}{:>9}{:>12}",
                row.name, row.arrival_time, row.burst_time, cpu, row.waiting_time, row.turnaround_time
            )?;
        }
        writeln!(f, "Average waiting time: {:.2}", self.avg_waiting)?;
        write!(f, "Average turnaround time: {:.2}", self.avg_turnaround)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::ProcessState;

    fn finished(name: &str, burst: Ticks, cpu: CpuId, waiting: Ticks) -> ProcessRecord {
        let mut record = ProcessRecord::new(name, 0, burst);
        record.state = ProcessState::Done;
        record.assigned_cpu = Some(cpu);
        record.waiting_time = waiting;
        record.turnaround_time = waiting + burst;
        record
    }

    #[test]
    fn averages_over_all_rows() {
        let records = vec![finished("A", 4, 0, 0), finished("B", 2, 1, 3)];
        let report = Report::from_records(&records);
        assert_eq!(report.rows.len(), 2);
        assert!((report.avg_waiting - 1.5).abs() < 1e-9);
        assert!((report.avg_turnaround - 4.5).abs() < 1e-9);
    }

    #[test]
    fn display_lists_every_process() {
        let records = vec![finished("P1", 10, 0, 0), finished("P2", 5, 1, 0)];
        let text = Report::from_records(&records).to_string();
        assert!(text.starts_with("Process"));
        assert!(text.contains("P1"));
        assert!(text.contains("P2"));
        assert!(text.contains("Average waiting time: 0.00"));
        assert!(text.ends_with("Average turnaround time: 7.50"));
    }
}
