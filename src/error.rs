use std::path::PathBuf;
use thiserror::Error;

type Source = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure classes of one pipeline invocation.
///
/// Every variant carries the target it was acting on so a failed deploy can
/// be diagnosed from the error alone.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("invalid deploy configuration: {0}")]
    Config(String),

    #[error("failed to bundle {}: {source}", .path.display())]
    Bundle { path: PathBuf, source: Source },

    #[error("metadata probe of s3://{bucket}/{key} failed: {source}")]
    Probe {
        bucket: String,
        key: String,
        source: Source,
    },

    #[error("upload to s3://{bucket}/{key} failed: {source}")]
    Upload {
        bucket: String,
        key: String,
        source: Source,
    },

    /// The bundle is in the store but no version record points at it. The
    /// operator can retry registration without re-uploading.
    #[error(
        "failed to register version {version_label} of {application_name} \
         (bundle at s3://{bucket}/{key}, uploaded this run: {uploaded}): {source}"
    )]
    Registration {
        application_name: String,
        version_label: String,
        bucket: String,
        key: String,
        uploaded: bool,
        source: Source,
    },
}
