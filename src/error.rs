use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while reading or writing marker files in a job directory.
#[derive(Error, Debug)]
pub enum MarkerError {
    #[error("marker not found: {0}")]
    NotFound(PathBuf),

    #[error("marker {path} holds {content:?}, expected a decimal integer")]
    Parse { path: PathBuf, content: String },

    #[error("marker {path} holds {content:?}, expected a timestamp")]
    Timestamp { path: PathBuf, content: String },

    #[error("marker already exists with different content: {0}")]
    AlreadyExists(PathBuf),

    #[error("failed to access marker {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MarkerError {
    pub(crate) fn io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}

#[derive(Error, Debug)]
pub enum SidecarError {
    #[error("malformed request: {0}")]
    Transport(String),

    #[error("scheduler query failed: {0}")]
    ExternalTool(String),

    #[error("persist error: {0}")]
    Persist(#[from] MarkerError),

    #[error("no log output found for {0}")]
    LogsNotFound(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, SidecarError>;

/// Every failure maps to a generic body; the detail only goes to the log.
impl IntoResponse for SidecarError {
    fn into_response(self) -> Response {
        let status = match self {
            SidecarError::Transport(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(error = %self, status = %status, "Request failed");
        (
            status,
            "Some errors occurred while serving the request. Check the sidecar logs",
        )
            .into_response()
    }
}
