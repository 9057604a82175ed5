//! Google Cloud TPU provider implementation

use crate::error::GcpError;
use crate::gcloud::{CreateTpuArgs, Gcloud};
use async_trait::async_trait;
use tpufleet_cloud::{AuthStatus, CreateNodeRequest, TpuProvider};

/// Google Cloud TPU provider
pub struct GcpTpuProvider {
    gcloud: Gcloud,
}

impl GcpTpuProvider {
    /// `project` is passed to every gcloud call when set; otherwise the
    /// gcloud default project applies.
    pub fn new(project: Option<String>) -> Self {
        Self {
            gcloud: Gcloud::new(project),
        }
    }

    pub fn with_gcloud(gcloud: Gcloud) -> Self {
        Self { gcloud }
    }
}

#[async_trait]
impl TpuProvider for GcpTpuProvider {
    fn name(&self) -> &str {
        "gcp"
    }

    fn display_name(&self) -> &str {
        "Google Cloud TPU"
    }

    async fn check_auth(&self) -> tpufleet_cloud::Result<AuthStatus> {
        match self.gcloud.check_auth().await {
            Ok(account) => Ok(AuthStatus::ok(account)),
            Err(GcpError::GcloudNotFound) => {
                Ok(AuthStatus::failed("gcloud is not installed"))
            }
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    async fn list_nodes(&self, zone: &str) -> tpufleet_cloud::Result<String> {
        Ok(self.gcloud.list_tpus(zone).await?)
    }

    async fn describe_nodes(&self, zone: &str) -> tpufleet_cloud::Result<String> {
        Ok(self.gcloud.describe_tpus(zone).await?)
    }

    async fn create_node(&self, request: &CreateNodeRequest) -> tpufleet_cloud::Result<()> {
        let args = CreateTpuArgs {
            name: &request.name,
            zone: &request.zone,
            accelerator_type: &request.accelerator_type,
            version: &request.runtime_version,
        };
        Ok(self.gcloud.create_tpu(&args).await?)
    }
}
