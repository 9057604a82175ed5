//! GCP provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcpError {
    #[error("gcloud not found; install it from https://cloud.google.com/sdk/docs/install")]
    GcloudNotFound,

    #[error("gcloud has no active account. Run: gcloud auth login")]
    NotAuthenticated,

    #[error("gcloud command failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GcpError>;

impl From<GcpError> for tpufleet_cloud::CloudError {
    fn from(err: GcpError) -> Self {
        match err {
            GcpError::GcloudNotFound | GcpError::NotAuthenticated => {
                tpufleet_cloud::CloudError::AuthenticationFailed(err.to_string())
            }
            GcpError::CommandFailed(stderr) => tpufleet_cloud::CloudError::CommandFailed(stderr),
            GcpError::IoError(e) => tpufleet_cloud::CloudError::Io(e),
        }
    }
}
