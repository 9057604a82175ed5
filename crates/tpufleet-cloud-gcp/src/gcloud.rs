//! gcloud CLI wrapper
//!
//! Wraps the `gcloud compute tpus tpu-vm` commands.

use crate::error::{GcpError, Result};
use std::process::Stdio;
use tokio::process::Command;

/// gcloud CLI wrapper
pub struct Gcloud {
    program: String,
    project: Option<String>,
}

impl Gcloud {
    pub fn new(project: Option<String>) -> Self {
        Self {
            program: "gcloud".to_string(),
            project,
        }
    }

    /// Use a different executable (a wrapper script, or a stub in tests)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Check that gcloud is installed and has an active account.
    ///
    /// Returns the active account.
    pub async fn check_auth(&self) -> Result<String> {
        let which = Command::new("which").arg(&self.program).output().await?;
        if !which.status.success() {
            return Err(GcpError::GcloudNotFound);
        }

        let output = self
            .run_command(&[
                "auth".to_string(),
                "list".to_string(),
                "--filter=status:ACTIVE".to_string(),
                "--format=value(account)".to_string(),
            ])
            .await?;

        output
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
            .ok_or(GcpError::NotAuthenticated)
    }

    /// Run a gcloud command and return stdout
    async fn run_command(&self, args: &[String]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        if let Some(project) = &self.project {
            cmd.arg(format!("--project={}", project));
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: {} {}", self.program, args.join(" "));

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GcpError::GcloudNotFound
            } else {
                GcpError::IoError(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GcpError::CommandFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Tabular listing of the TPU VMs in `zone`
    pub async fn list_tpus(&self, zone: &str) -> Result<String> {
        self.run_command(&list_args(zone)).await
    }

    /// YAML stream describing the TPU VMs in `zone`
    pub async fn describe_tpus(&self, zone: &str) -> Result<String> {
        self.run_command(&describe_args(zone)).await
    }

    /// Create one TPU VM. Blocks until gcloud returns.
    pub async fn create_tpu(&self, spec: &CreateTpuArgs<'_>) -> Result<()> {
        self.run_command(&create_args(spec)).await?;
        Ok(())
    }
}

/// Arguments for `tpu-vm create`
#[derive(Debug, Clone, Copy)]
pub struct CreateTpuArgs<'a> {
    pub name: &'a str,
    pub zone: &'a str,
    pub accelerator_type: &'a str,
    pub version: &'a str,
}

fn tpu_vm(sub: &str) -> Vec<String> {
    ["compute", "tpus", "tpu-vm", sub]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn list_args(zone: &str) -> Vec<String> {
    let mut args = tpu_vm("list");
    args.push(format!("--zone={}", zone));
    args
}

fn describe_args(zone: &str) -> Vec<String> {
    let mut args = list_args(zone);
    args.push("--format=yaml".to_string());
    args
}

fn create_args(spec: &CreateTpuArgs<'_>) -> Vec<String> {
    let mut args = tpu_vm("create");
    args.push(spec.name.to_string());
    args.push(format!("--zone={}", spec.zone));
    args.push(format!("--accelerator-type={}", spec.accelerator_type));
    args.push(format!("--version={}", spec.version));
    args
}
