use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::SidecarConfig;
use crate::error::{Result, SidecarError};
use crate::scheduler::client::{job_detail_args, list_mine_args};
use crate::scheduler::{
    classify, extract_state, JobPhase, JobRecord, JobRegistry, SchedulerClient, WorkloadId,
    WorkloadSpec,
};
use crate::status::types::{ContainerStatus, PodStatusSnapshot};
use crate::store::{read_exit_code, time_marker, TimeMarker};

/// Result of the last successful reconciliation.
#[derive(Debug, Default)]
struct ReconciliationCache {
    snapshots: Vec<PodStatusSnapshot>,
    last_refresh: Option<Instant>,
}

impl ReconciliationCache {
    fn is_fresh(&self, window: Duration) -> bool {
        self.last_refresh.is_some_and(|at| at.elapsed() < window)
    }

    fn replace(&mut self, snapshots: Vec<PodStatusSnapshot>) {
        self.snapshots = snapshots;
        self.last_refresh = Some(Instant::now());
    }
}

/// Turns scheduler job state into per-container status.
///
/// At most one reconciliation runs at a time. The cache lock is held from the
/// freshness check until the new result is stored, so callers that find the
/// cache stale while a cycle is running wait for it and receive its result.
pub struct StatusReconciler {
    config: SidecarConfig,
    scheduler: Arc<dyn SchedulerClient>,
    registry: Arc<RwLock<JobRegistry>>,
    cache: Mutex<ReconciliationCache>,
}

impl StatusReconciler {
    pub fn new(
        config: SidecarConfig,
        scheduler: Arc<dyn SchedulerClient>,
        registry: Arc<RwLock<JobRegistry>>,
    ) -> Self {
        Self {
            config,
            scheduler,
            registry,
            cache: Mutex::new(ReconciliationCache::default()),
        }
    }

    /// Status of `workloads`, in input order.
    ///
    /// Inside the refresh window the previous result set is returned as is,
    /// whatever workloads were asked for.
    ///
    /// # Errors
    ///
    /// - [`SidecarError::Transport`] if a workload name is not a plain path
    ///   component
    /// - [`SidecarError::ExternalTool`] if the aggregate scheduler query fails
    /// - [`SidecarError::Persist`] if a transition marker cannot be written, or
    ///   a job the scheduler no longer lists is missing an exit code
    /// - [`SidecarError::Cancelled`] if `cancel` fires first
    ///
    /// The cache is left untouched on error.
    pub async fn reconcile(
        &self,
        workloads: &[WorkloadSpec],
        cancel: &CancellationToken,
    ) -> Result<Vec<PodStatusSnapshot>> {
        for workload in workloads {
            workload.validate()?;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!("Status reconciliation cancelled");
                Err(SidecarError::Cancelled)
            }
            result = self.reconcile_cached(workloads) => result,
        }
    }

    /// Snapshots currently held in the cache.
    pub async fn cached(&self) -> Vec<PodStatusSnapshot> {
        self.cache.lock().await.snapshots.clone()
    }

    async fn reconcile_cached(&self, workloads: &[WorkloadSpec]) -> Result<Vec<PodStatusSnapshot>> {
        let mut cache = self.cache.lock().await;
        if cache.is_fresh(self.config.status_refresh) {
            tracing::debug!(pods = cache.snapshots.len(), "Returning cached status");
            return Ok(cache.snapshots.clone());
        }

        let snapshots = match self.run_cycle(workloads).await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                tracing::error!(error = %e, "Status reconciliation aborted");
                return Err(e);
            }
        };
        cache.replace(snapshots.clone());
        Ok(snapshots)
    }

    async fn run_cycle(&self, workloads: &[WorkloadSpec]) -> Result<Vec<PodStatusSnapshot>> {
        let listing = self.scheduler.invoke(&list_mine_args()).await?;
        if listing.failed() {
            return Err(SidecarError::ExternalTool(format!(
                "unable to retrieve job status: {}",
                listing.stderr.trim()
            )));
        }

        let mut snapshots = Vec::with_capacity(workloads.len());
        for workload in workloads {
            snapshots.push(self.workload_status(workload).await?);
        }
        Ok(snapshots)
    }

    async fn workload_status(&self, workload: &WorkloadSpec) -> Result<PodStatusSnapshot> {
        let record = self.registry.read().await.get(&workload.id).cloned();
        let Some(record) = record else {
            tracing::debug!(pod = %workload.name, uid = %workload.id.uid, "No job registered for pod");
            let containers = workload
                .containers
                .iter()
                .map(ContainerStatus::waiting)
                .collect();
            return Ok(PodStatusSnapshot::for_workload(workload, containers));
        };

        let job_dir = self.config.job_dir(&workload.id);
        let detail = match self.scheduler.invoke(&job_detail_args(&record.job_id)).await {
            Ok(output) if !output.failed() => output,
            Ok(output) => {
                tracing::warn!(
                    job_id = %record.job_id,
                    stderr = %output.stderr.trim(),
                    "Job not listed by scheduler, reading exit codes from disk"
                );
                return self.status_from_disk(workload, &job_dir).await;
            }
            Err(e) => {
                tracing::warn!(
                    job_id = %record.job_id,
                    error = %e,
                    "Job detail query failed, reading exit codes from disk"
                );
                return self.status_from_disk(workload, &job_dir).await;
            }
        };

        let now = Utc::now();
        let state = extract_state(&detail.stdout);
        let phase = classify(state);
        tracing::info!(
            job_id = %record.job_id,
            state = state.map(|s| s.code()).unwrap_or("unknown"),
            phase = %phase,
            pod = %workload.name,
            uid = %workload.id.uid,
            "Job state"
        );

        let containers = match phase {
            JobPhase::Waiting => workload
                .containers
                .iter()
                .map(ContainerStatus::waiting)
                .collect(),
            JobPhase::Running => {
                let record = self
                    .record_transition(&workload.id, &job_dir, TimeMarker::StartedAt, now, record)
                    .await?;
                workload
                    .containers
                    .iter()
                    .map(|name| ContainerStatus::running(name, record.start_time))
                    .collect()
            }
            JobPhase::Terminated => {
                let record = self
                    .record_transition(&workload.id, &job_dir, TimeMarker::FinishedAt, now, record)
                    .await?;
                let mut containers = Vec::with_capacity(workload.containers.len());
                for name in &workload.containers {
                    match read_exit_code(&job_dir, name).await {
                        Ok(code) => containers.push(ContainerStatus::terminated(
                            name,
                            record.start_time,
                            record.end_time,
                            code,
                        )),
                        Err(e) => {
                            tracing::warn!(container = %name, error = %e, "Skipping container without exit code");
                        }
                    }
                }
                containers
            }
        };

        Ok(PodStatusSnapshot::for_workload(workload, containers))
    }

    /// Every container of a job the scheduler no longer knows about must have
    /// left an exit code; a single missing one fails the whole cycle.
    async fn status_from_disk(
        &self,
        workload: &WorkloadSpec,
        job_dir: &Path,
    ) -> Result<PodStatusSnapshot> {
        let mut containers = Vec::with_capacity(workload.containers.len());
        for name in &workload.containers {
            let code = read_exit_code(job_dir, name).await?;
            containers.push(ContainerStatus::terminated(name, None, None, code));
        }
        Ok(PodStatusSnapshot::for_workload(workload, containers))
    }

    /// Set the transition time on first observation and persist its marker.
    ///
    /// The registry write lock is held across the marker write so the field
    /// and the file are set together or not at all.
    async fn record_transition(
        &self,
        id: &WorkloadId,
        job_dir: &Path,
        marker: TimeMarker,
        now: DateTime<Utc>,
        seen: JobRecord,
    ) -> Result<JobRecord> {
        let mut registry = self.registry.write().await;
        let Some(record) = registry.get_mut(id) else {
            return Ok(seen);
        };

        let unset = match marker {
            TimeMarker::StartedAt => record.start_time.is_none(),
            TimeMarker::FinishedAt => record.end_time.is_none(),
        };
        if unset {
            time_marker::write_once(job_dir, marker, now).await?;
            match marker {
                TimeMarker::StartedAt => record.mark_started(now),
                TimeMarker::FinishedAt => record.mark_finished(now),
            };
            tracing::info!(job_id = %record.job_id, marker = marker.file_name(), at = %now, "Recorded job transition");
        }

        Ok(record.clone())
    }
}
