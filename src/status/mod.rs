//! Status reconciliation against the batch scheduler.
//!
//! [`StatusReconciler`] queries `squeue`, maps the job state of every
//! registered workload onto container states and records first-observed
//! transition times in the registry and in marker files.

pub mod reconciler;
pub mod types;

pub use reconciler::StatusReconciler;
pub use types::{ContainerState, ContainerStatus, PodStatusSnapshot};
