use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use tokio::fs;

use crate::error::MarkerError;

/// Layout of timestamps in marker files. Always written in UTC.
const WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %z %Z";
/// `WRITE_FORMAT` without the trailing zone name, which is stripped before parsing.
const PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %z";

/// Transition markers recorded in a job directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeMarker {
    StartedAt,
    FinishedAt,
}

impl TimeMarker {
    pub fn file_name(&self) -> &'static str {
        match self {
            TimeMarker::StartedAt => "StartedAt.time",
            TimeMarker::FinishedAt => "FinishedAt.time",
        }
    }
}

pub fn format_marker_time(at: DateTime<Utc>) -> String {
    at.format(WRITE_FORMAT).to_string()
}

pub fn parse_marker_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    let (stamp, _zone) = text.rsplit_once(' ')?;
    DateTime::parse_from_str(stamp, PARSE_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Create `marker` in `job_dir` holding `at`.
///
/// The timestamp is written to a staging file first and then hard linked
/// into place, so the marker either holds a complete timestamp or does not
/// exist. An existing marker with the same content is accepted; one holding a
/// different timestamp is an error. An existing marker that does not hold a
/// timestamp at all is left over from an interrupted write and is replaced.
pub async fn write_once(
    job_dir: &Path,
    marker: TimeMarker,
    at: DateTime<Utc>,
) -> Result<(), MarkerError> {
    let path = job_dir.join(marker.file_name());
    let staging = job_dir.join(format!(".{}.tmp", marker.file_name()));
    let content = format_marker_time(at);

    fs::write(&staging, &content)
        .await
        .map_err(|e| MarkerError::io(staging.clone(), e))?;
    let published = publish(&staging, &path, &content).await;
    if let Err(e) = fs::remove_file(&staging).await {
        tracing::warn!(path = %staging.display(), error = %e, "Failed to remove staging marker");
    }

    if published? {
        tracing::info!(path = %path.display(), at = %content, "Wrote transition marker");
    }
    Ok(())
}

/// Link `staging` to `path`. Returns false when `path` already held `content`.
async fn publish(staging: &Path, path: &Path, content: &str) -> Result<bool, MarkerError> {
    match fs::hard_link(staging, path).await {
        Ok(()) => return Ok(true),
        Err(e) if e.kind() != ErrorKind::AlreadyExists => {
            return Err(MarkerError::io(path.to_path_buf(), e))
        }
        Err(_) => {}
    }

    let existing = fs::read(path)
        .await
        .map_err(|e| MarkerError::io(path.to_path_buf(), e))?;
    let existing = String::from_utf8_lossy(&existing);
    if existing == content {
        return Ok(false);
    }
    if parse_marker_time(&existing).is_some() {
        return Err(MarkerError::AlreadyExists(path.to_path_buf()));
    }

    tracing::warn!(
        path = %path.display(),
        content = ?existing,
        "Replacing incomplete transition marker"
    );
    fs::remove_file(path)
        .await
        .map_err(|e| MarkerError::io(path.to_path_buf(), e))?;
    fs::hard_link(staging, path)
        .await
        .map_err(|e| MarkerError::io(path.to_path_buf(), e))?;
    Ok(true)
}

pub async fn read(job_dir: &Path, marker: TimeMarker) -> Result<DateTime<Utc>, MarkerError> {
    let path = job_dir.join(marker.file_name());
    let content = fs::read_to_string(&path)
        .await
        .map_err(|e| MarkerError::io(path.clone(), e))?;
    parse_marker_time(&content).ok_or(MarkerError::Timestamp { path, content })
}
