use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use crate::error::{Result, SidecarError};
use crate::logs::filter;
use crate::logs::query::LogQuery;
use crate::logs::source::{LogSource, LogStream, SourceError};

/// Builds the log output returned for a container.
///
/// Read-only over the job directory; calls need no coordination with each
/// other or with status reconciliation.
pub struct LogAssembler {
    data_root: PathBuf,
    source: Arc<dyn LogSource>,
}

impl LogAssembler {
    pub fn new(data_root: impl Into<PathBuf>, source: Arc<dyn LogSource>) -> Self {
        Self {
            data_root: data_root.into(),
            source,
        }
    }

    /// Job output followed by container output, filtered by the query options.
    ///
    /// # Errors
    ///
    /// - [`SidecarError::Unsupported`] if timestamps are requested and the
    ///   source cannot produce them
    /// - [`SidecarError::Transport`] if a name in the query is not a plain
    ///   path component
    /// - [`SidecarError::LogsNotFound`] if neither output can be read
    pub async fn assemble(&self, query: &LogQuery) -> Result<Vec<u8>> {
        query.validate()?;
        let opts = &query.opts;
        let id = query.workload_id();
        tracing::info!(
            pod = %query.pod_name,
            uid = %id.uid,
            container = %query.container_name,
            tail = opts.tail,
            limit_bytes = opts.limit_bytes,
            since_seconds = opts.since_seconds,
            timestamps = opts.timestamps,
            "Assembling logs"
        );
        if opts.follow || opts.previous {
            tracing::debug!(
                follow = opts.follow,
                previous = opts.previous,
                "Ignoring unsupported log options"
            );
        }

        let job_dir = self.data_root.join(id.dir_name());
        let (job, container) = tokio::join!(
            self.source.read(&job_dir, LogStream::Job, opts.timestamps),
            self.source.read(
                &job_dir,
                LogStream::Container(&query.container_name),
                opts.timestamps
            ),
        );

        let output = combine(job, container, &query.container_name)?;
        let output = filter::truncate(output, opts);

        if opts.windowed() {
            return Ok(filter::window(&output, opts, Utc::now()));
        }
        Ok(output)
    }
}

/// Concatenate job and container output, tolerating one missing side.
fn combine(
    job: std::result::Result<Vec<u8>, SourceError>,
    container: std::result::Result<Vec<u8>, SourceError>,
    container_name: &str,
) -> Result<Vec<u8>> {
    if matches!(job, Err(SourceError::TimestampsUnavailable))
        || matches!(container, Err(SourceError::TimestampsUnavailable))
    {
        return Err(SidecarError::Unsupported(
            "timestamped log output is not available".to_string(),
        ));
    }

    match (job, container) {
        (Err(job_err), Err(container_err)) => {
            tracing::error!(
                job_error = %job_err,
                container_error = %container_err,
                "Failed to read job and container logs"
            );
            Err(SidecarError::LogsNotFound(container_name.to_string()))
        }
        (Ok(mut job), Ok(container)) => {
            job.extend_from_slice(&container);
            Ok(job)
        }
        (Ok(job), Err(e)) => {
            tracing::warn!(error = %e, container = container_name, "Failed to read container logs");
            Ok(job)
        }
        (Err(e), Ok(container)) => {
            tracing::warn!(error = %e, "Failed to read job logs");
            Ok(container)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing() -> std::result::Result<Vec<u8>, SourceError> {
        Err(SourceError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        )))
    }

    #[test]
    fn job_output_comes_first() {
        let out = combine(Ok(b"J\n".to_vec()), Ok(b"C\n".to_vec()), "app").unwrap();
        assert_eq!(out, b"J\nC\n");
    }

    #[test]
    fn one_side_is_enough() {
        assert_eq!(combine(Ok(b"J\n".to_vec()), missing(), "app").unwrap(), b"J\n");
        assert_eq!(combine(missing(), Ok(b"C\n".to_vec()), "app").unwrap(), b"C\n");
    }

    #[test]
    fn both_missing_is_not_found() {
        let err = combine(missing(), missing(), "app").unwrap_err();
        assert!(matches!(err, SidecarError::LogsNotFound(name) if name == "app"));
    }

    #[test]
    fn timestamps_unavailable_wins() {
        let err = combine(
            Err(SourceError::TimestampsUnavailable),
            Ok(b"C\n".to_vec()),
            "app",
        )
        .unwrap_err();
        assert!(matches!(err, SidecarError::Unsupported(_)));
    }
}
