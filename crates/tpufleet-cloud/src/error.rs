//! Cloud provider error types

use thiserror::Error;

/// Cloud provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Inventory error: {0}")]
    Inventory(#[from] tpufleet_core::FleetError),

    #[error("Creation of {name} gave up after {attempts} attempts: {last_error}")]
    CreationExhausted {
        name: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Host synchronization failed: {0}")]
    Sync(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
