pub mod driver;
pub mod job;
pub mod report;

pub use driver::{Outcome, Sim};
pub use job::{ProcessSpec, bernoulli_workload, reference_workload};
pub use report::{Report, ReportRow};
