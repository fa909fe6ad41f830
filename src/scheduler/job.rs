use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SidecarError};

/// Reject a request-supplied name that would not stay a single path
/// component once joined under the data root.
pub fn check_path_component(field: &str, value: &str) -> Result<()> {
    if value.contains(|c: char| matches!(c, '/' | '\\' | '\0')) || value.contains("..") {
        return Err(SidecarError::Transport(format!(
            "{} {:?} is not a valid name",
            field, value
        )));
    }
    Ok(())
}

/// Identity of a workload as seen by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkloadId {
    pub namespace: String,
    pub uid: String,
}

impl WorkloadId {
    pub fn new(namespace: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            uid: uid.into(),
        }
    }

    /// Name of the per-workload directory under the data root.
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.namespace, self.uid)
    }

    pub fn validate(&self) -> Result<()> {
        check_path_component("namespace", &self.namespace)?;
        check_path_component("uid", &self.uid)
    }
}

impl std::fmt::Display for WorkloadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.uid)
    }
}

/// A workload descriptor handed in by a status request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadSpec {
    pub name: String,
    pub id: WorkloadId,
    /// Declared container names, in declaration order.
    pub containers: Vec<String>,
}

impl WorkloadSpec {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        uid: impl Into<String>,
        containers: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id: WorkloadId::new(namespace, uid),
            containers,
        }
    }

    /// Check the identity and container names used to build marker paths.
    pub fn validate(&self) -> Result<()> {
        self.id.validate()?;
        for container in &self.containers {
            check_path_component("container", container)?;
        }
        Ok(())
    }
}

/// Scheduler job backing a workload.
///
/// `start_time` and `end_time` are set at most once, the first time the
/// reconciler observes the job running or finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl JobRecord {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            start_time: None,
            end_time: None,
        }
    }

    /// Record the start time unless one is already set. Returns whether it was set.
    pub fn mark_started(&mut self, at: DateTime<Utc>) -> bool {
        if self.start_time.is_some() {
            return false;
        }
        self.start_time = Some(at);
        true
    }

    /// Record the end time unless one is already set. Returns whether it was set.
    pub fn mark_finished(&mut self, at: DateTime<Utc>) -> bool {
        if self.end_time.is_some() {
            return false;
        }
        self.end_time = Some(at);
        true
    }
}
