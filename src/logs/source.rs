use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;

/// Which output file of a job to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream<'a> {
    /// `job.out`, written by the batch job itself.
    Job,
    /// `<container>.out`, written by one container of the job.
    Container(&'a str),
}

impl LogStream<'_> {
    pub fn file_name(&self) -> String {
        match self {
            LogStream::Job => "job.out".to_string(),
            LogStream::Container(name) => format!("{}.out", name),
        }
    }
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("timestamped output is not available")]
    TimestampsUnavailable,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supplies raw job and container output.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Read one output stream of the job in `job_dir`. With `timestamps`, every
    /// line must carry a leading timestamp; a source that cannot do that
    /// returns [`SourceError::TimestampsUnavailable`].
    async fn read(
        &self,
        job_dir: &Path,
        stream: LogStream<'_>,
        timestamps: bool,
    ) -> Result<Vec<u8>, SourceError>;
}

/// Reads output files as the job wrote them. Has no timestamped form.
#[derive(Debug, Clone, Default)]
pub struct FileLogSource;

#[async_trait]
impl LogSource for FileLogSource {
    async fn read(
        &self,
        job_dir: &Path,
        stream: LogStream<'_>,
        timestamps: bool,
    ) -> Result<Vec<u8>, SourceError> {
        if timestamps {
            return Err(SourceError::TimestampsUnavailable);
        }
        let path = job_dir.join(stream.file_name());
        tracing::debug!(path = %path.display(), "Reading job output");
        Ok(fs::read(&path).await?)
    }
}
