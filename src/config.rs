use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::scheduler::WorkloadId;

/// Default refresh window for the status cache.
pub const DEFAULT_STATUS_REFRESH: Duration = Duration::from_secs(10);

/// Default deadline for a single scheduler invocation.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SidecarConfig {
    pub listen_addr: SocketAddr,
    /// Root holding one `<namespace>-<uid>` directory per workload.
    pub data_root: PathBuf,
    /// Path to the `squeue` binary.
    pub squeue_path: PathBuf,
    /// Minimum interval between two reconciliations against the scheduler.
    pub status_refresh: Duration,
    pub command_timeout: Duration,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 4000)),
            data_root: PathBuf::from(".local/interlink/jobs"),
            squeue_path: PathBuf::from("/usr/bin/squeue"),
            status_refresh: DEFAULT_STATUS_REFRESH,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

impl SidecarConfig {
    pub fn new(listen_addr: SocketAddr, data_root: impl Into<PathBuf>) -> Self {
        Self {
            listen_addr,
            data_root: data_root.into(),
            ..Default::default()
        }
    }

    pub fn with_squeue_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.squeue_path = path.into();
        self
    }

    pub fn with_status_refresh(mut self, refresh: Duration) -> Self {
        self.status_refresh = refresh;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Directory holding the output and marker files of one workload.
    pub fn job_dir(&self, id: &WorkloadId) -> PathBuf {
        self.data_root.join(id.dir_name())
    }
}
