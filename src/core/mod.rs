pub mod driver;
pub mod event;
pub mod observer;
pub mod state;

pub use driver::{Finished, Pacing, SchedCore, WorkerStats};
pub use event::SchedEvent;
pub use observer::Observer;
pub use state::{
    CpuId, Dispatch, Execution, ProcId, ProcessRecord, ProcessState, SchedulerState, Step, Ticks,
};
