//! Host synchronization error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostsError {
    #[error("{program} failed: {stderr}")]
    CommandFailed { program: String, stderr: String },

    #[error("Privilege escalation failed: {0}")]
    PrivilegeDenied(String),

    #[error("Password prompt cancelled")]
    PromptCancelled,

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HostsError>;

impl From<HostsError> for tpufleet_cloud::CloudError {
    fn from(err: HostsError) -> Self {
        match err {
            HostsError::Io(e) => tpufleet_cloud::CloudError::Io(e),
            other => tpufleet_cloud::CloudError::Sync(other.to_string()),
        }
    }
}
