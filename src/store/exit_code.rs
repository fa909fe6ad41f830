use std::path::Path;

use tokio::fs;

use crate::error::MarkerError;

/// Read the exit code a container left in `<job_dir>/<container>.status`.
pub async fn read_exit_code(job_dir: &Path, container: &str) -> Result<i32, MarkerError> {
    let path = job_dir.join(format!("{}.status", container));
    tracing::debug!(path = %path.display(), "Reading container exit code");

    let content = fs::read_to_string(&path)
        .await
        .map_err(|e| MarkerError::io(path.clone(), e))?;

    content
        .trim()
        .parse::<i32>()
        .map_err(|_| MarkerError::Parse { path, content })
}
