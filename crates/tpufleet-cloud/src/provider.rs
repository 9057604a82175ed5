//! TPU provider trait definition

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tpufleet_core::DesiredFleetSpec;

/// TPU provider abstraction trait
///
/// Every call blocks the reconciliation pass until it returns; providers are
/// never driven concurrently.
#[async_trait]
pub trait TpuProvider: Send + Sync {
    /// Returns the provider name (e.g., "gcp")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Check if the provider is properly configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Tabular listing of every node in `zone`, header row first
    async fn list_nodes(&self, zone: &str) -> Result<String>;

    /// Structured listing of every node in `zone` as a `---` separated YAML stream
    async fn describe_nodes(&self, zone: &str) -> Result<String>;

    /// Create a single node. Success is the exit status of the create call only.
    async fn create_node(&self, request: &CreateNodeRequest) -> Result<()>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

/// Parameters of a single create call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateNodeRequest {
    /// Node name (`v{generation}-{index}`)
    pub name: String,

    pub zone: String,

    /// Accelerator type (`v{generation}-{cores}`)
    pub accelerator_type: String,

    /// Generation dependent runtime version (e.g., "tpu-vm-pt-1.13")
    pub runtime_version: String,
}

impl CreateNodeRequest {
    /// Build the request for the member at `index` of `spec`
    pub fn for_index(spec: &DesiredFleetSpec, index: u32) -> Self {
        Self {
            name: spec.member_name(index),
            zone: spec.zone.clone(),
            accelerator_type: spec.accelerator_type(),
            runtime_version: spec.runtime_version_tag(),
        }
    }
}
