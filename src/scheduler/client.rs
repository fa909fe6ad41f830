use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Result, SidecarError};

/// Captured output of one scheduler command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Anything on stderr counts as failure, whatever the exit status was.
    pub fn failed(&self) -> bool {
        !self.stderr.is_empty()
    }
}

/// Runs scheduler query commands.
#[async_trait]
pub trait SchedulerClient: Send + Sync {
    async fn invoke(&self, args: &[String]) -> Result<CommandOutput>;
}

/// Arguments for the aggregate "my jobs" listing.
pub fn list_mine_args() -> Vec<String> {
    vec!["--me".to_string()]
}

/// Arguments for the detail listing of one job, all states, no header.
///
/// Only the compact state column (`%t`) is printed, so job, partition and
/// user names never reach the state decoder.
pub fn job_detail_args(job_id: &str) -> Vec<String> {
    vec![
        "--noheader".to_string(),
        "-a".to_string(),
        "-o".to_string(),
        "%t".to_string(),
        "-j".to_string(),
        job_id.to_string(),
    ]
}

/// [`SchedulerClient`] that runs the `squeue` binary.
///
/// Each invocation is bounded by `timeout`; the child is killed if the call
/// times out or its future is dropped.
#[derive(Debug, Clone)]
pub struct SqueueClient {
    squeue_path: PathBuf,
    timeout: Duration,
}

impl SqueueClient {
    pub fn new(squeue_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            squeue_path: squeue_path.into(),
            timeout,
        }
    }

    fn process_output(
        &self,
        result: std::result::Result<std::process::Output, std::io::Error>,
    ) -> Result<CommandOutput> {
        match result {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();

                tracing::debug!(
                    command = %self.squeue_path.display(),
                    exit_code = ?output.status.code(),
                    stderr_len = stderr.len(),
                    "Scheduler command finished"
                );

                Ok(CommandOutput { stdout, stderr })
            }
            Err(e) => {
                tracing::error!(command = %self.squeue_path.display(), error = %e, "Failed to run scheduler command");
                Err(SidecarError::ExternalTool(format!(
                    "failed to run {}: {}",
                    self.squeue_path.display(),
                    e
                )))
            }
        }
    }
}

#[async_trait]
impl SchedulerClient for SqueueClient {
    async fn invoke(&self, args: &[String]) -> Result<CommandOutput> {
        tracing::debug!(command = %self.squeue_path.display(), ?args, "Invoking scheduler");

        let output = Command::new(&self.squeue_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, output).await {
            Ok(result) => self.process_output(result),
            Err(_) => {
                tracing::error!(
                    command = %self.squeue_path.display(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Scheduler command timed out"
                );
                Err(SidecarError::ExternalTool(format!(
                    "{} timed out after {:?}",
                    self.squeue_path.display(),
                    self.timeout
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_marks_failure() {
        let ok = CommandOutput {
            stdout: "JOBID".into(),
            stderr: String::new(),
        };
        let bad = CommandOutput {
            stdout: String::new(),
            stderr: "slurm_load_jobs error: Invalid job id specified".into(),
        };
        assert!(!ok.failed());
        assert!(bad.failed());
    }

    #[test]
    fn detail_args_target_one_job() {
        assert_eq!(list_mine_args(), vec!["--me"]);
        assert_eq!(
            job_detail_args("77"),
            vec!["--noheader", "-a", "-o", "%t", "-j", "77"]
        );
    }
}
