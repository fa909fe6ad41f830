use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer};

use crate::error;
use crate::scheduler::job::check_path_component;
use crate::scheduler::WorkloadId;

/// A log request for one container of one workload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogQuery {
    pub namespace: String,
    #[serde(rename = "PodUID")]
    pub pod_uid: String,
    #[serde(default)]
    pub pod_name: String,
    pub container_name: String,
    #[serde(default)]
    pub opts: LogOptions,
}

impl LogQuery {
    pub fn new(
        namespace: impl Into<String>,
        pod_uid: impl Into<String>,
        container_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            pod_uid: pod_uid.into(),
            pod_name: String::new(),
            container_name: container_name.into(),
            opts: LogOptions::default(),
        }
    }

    pub fn with_opts(mut self, opts: LogOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn workload_id(&self) -> WorkloadId {
        WorkloadId::new(&self.namespace, &self.pod_uid)
    }

    /// Check the names that end up in the log file paths.
    pub fn validate(&self) -> error::Result<()> {
        self.workload_id().validate()?;
        check_path_component("container", &self.container_name)
    }
}

/// Filtering options. Zero means "not set" for every numeric option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LogOptions {
    pub tail: usize,
    pub limit_bytes: usize,
    pub timestamps: bool,
    pub follow: bool,
    pub previous: bool,
    pub since_seconds: u64,
    #[serde(deserialize_with = "zero_time_as_none")]
    pub since_time: Option<DateTime<Utc>>,
}

impl LogOptions {
    /// Whether the timestamp window applies to this request.
    pub fn windowed(&self) -> bool {
        self.timestamps && (self.since_seconds != 0 || self.since_time.is_some())
    }
}

/// Clients send the zero instant (`0001-01-01T00:00:00Z`) for an unset time.
fn zero_time_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let time = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(time.filter(|t| t.year() > 1))
}
