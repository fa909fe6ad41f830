pub mod client;
pub mod job;
pub mod registry;
pub mod state;

pub use client::{CommandOutput, SchedulerClient, SqueueClient};
pub use job::{JobRecord, WorkloadId, WorkloadSpec};
pub use registry::JobRegistry;
pub use state::{classify, extract_state, JobPhase, SlurmState};
