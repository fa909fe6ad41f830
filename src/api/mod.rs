use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::error::SidecarError;
use crate::logs::{LogAssembler, LogQuery};
use crate::scheduler::WorkloadSpec;
use crate::status::{PodStatusSnapshot, StatusReconciler};

#[derive(Clone)]
pub struct ApiState {
    pub reconciler: Arc<StatusReconciler>,
    pub assembler: Arc<LogAssembler>,
    /// Cancels in-flight reconciliations on shutdown.
    pub shutdown: CancellationToken,
}

/// Subset of a Kubernetes pod the status endpoint needs.
#[derive(Debug, Deserialize)]
pub struct PodRequest {
    pub metadata: PodMetadata,
    #[serde(default)]
    pub spec: PodSpecRequest,
}

#[derive(Debug, Deserialize)]
pub struct PodMetadata {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    pub uid: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PodSpecRequest {
    #[serde(default)]
    pub containers: Vec<ContainerRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ContainerRequest {
    pub name: String,
}

impl From<PodRequest> for WorkloadSpec {
    fn from(pod: PodRequest) -> Self {
        WorkloadSpec::new(
            pod.metadata.name,
            pod.metadata.namespace,
            pod.metadata.uid,
            pod.spec.containers.into_iter().map(|c| c.name).collect(),
        )
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/status", get(status_handler).post(status_handler))
        .route("/getLogs", get(logs_handler).post(logs_handler))
        .route("/healthz", get(healthz_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until `shutdown` is cancelled.
pub async fn serve(
    addr: SocketAddr,
    state: ApiState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Starting sidecar API server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

async fn status_handler(
    State(state): State<ApiState>,
    body: Result<Json<Vec<PodRequest>>, JsonRejection>,
) -> Result<Json<Vec<PodStatusSnapshot>>, SidecarError> {
    let Json(pods) = body.map_err(|e| SidecarError::Transport(e.body_text()))?;
    tracing::info!(pods = pods.len(), "Received status request");

    let workloads: Vec<WorkloadSpec> = pods.into_iter().map(WorkloadSpec::from).collect();
    let snapshots = state
        .reconciler
        .reconcile(&workloads, &state.shutdown)
        .await?;
    Ok(Json(snapshots))
}

async fn logs_handler(
    State(state): State<ApiState>,
    body: Result<Json<LogQuery>, JsonRejection>,
) -> Result<Vec<u8>, SidecarError> {
    let Json(query) = body.map_err(|e| SidecarError::Transport(e.body_text()))?;
    state.assembler.assemble(&query).await
}

async fn healthz_handler() -> &'static str {
    "ok"
}
