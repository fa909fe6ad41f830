use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::api::{self, ApiState};
use crate::config::SidecarConfig;
use crate::logs::{FileLogSource, LogAssembler, LogSource};
use crate::scheduler::{JobRegistry, SchedulerClient, SqueueClient};
use crate::status::StatusReconciler;

/// Wires the registry, reconciler and log assembler behind the HTTP API.
pub struct Sidecar {
    pub config: SidecarConfig,
    /// Shared with the submission path, which registers new jobs.
    pub registry: Arc<RwLock<JobRegistry>>,
    pub reconciler: Arc<StatusReconciler>,
    pub assembler: Arc<LogAssembler>,
}

impl Sidecar {
    /// Sidecar backed by the `squeue` binary and the job output files.
    pub fn new(config: SidecarConfig) -> Self {
        let scheduler = Arc::new(SqueueClient::new(
            config.squeue_path.clone(),
            config.command_timeout,
        ));
        Self::with_collaborators(config, scheduler, Arc::new(FileLogSource))
    }

    pub fn with_collaborators(
        config: SidecarConfig,
        scheduler: Arc<dyn SchedulerClient>,
        log_source: Arc<dyn LogSource>,
    ) -> Self {
        let registry = Arc::new(RwLock::new(JobRegistry::new()));
        let reconciler = Arc::new(StatusReconciler::new(
            config.clone(),
            scheduler,
            registry.clone(),
        ));
        let assembler = Arc::new(LogAssembler::new(config.data_root.clone(), log_source));

        Self {
            config,
            registry,
            reconciler,
            assembler,
        }
    }

    pub fn api_state(&self, shutdown: CancellationToken) -> ApiState {
        ApiState {
            reconciler: self.reconciler.clone(),
            assembler: self.assembler.clone(),
            shutdown,
        }
    }

    /// Serve the API until `shutdown` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the listen address cannot be bound or the server
    /// fails.
    pub async fn run(self, shutdown: CancellationToken) -> std::io::Result<()> {
        tracing::info!(
            data_root = %self.config.data_root.display(),
            squeue = %self.config.squeue_path.display(),
            refresh_secs = self.config.status_refresh.as_secs(),
            "Starting Slurm sidecar"
        );

        let state = self.api_state(shutdown.clone());
        api::serve(self.config.listen_addr, state, shutdown).await?;

        tracing::info!("Sidecar stopped");
        Ok(())
    }
}
