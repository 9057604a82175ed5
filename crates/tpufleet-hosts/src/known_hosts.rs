//! SSH known-hosts refresh
//!
//! Runs as the invoking user: the file lives in their home directory.

use crate::error::{HostsError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[async_trait]
pub trait KnownHosts: Send + Sync {
    /// Drop every stored key for `host`
    async fn forget(&self, host: &str) -> Result<()>;

    /// Scan `host` and append its hashed key
    async fn learn(&self, host: &str) -> Result<()>;
}

/// `ssh-keygen` / `ssh-keyscan` backed known-hosts file
pub struct SshKnownHosts {
    path: PathBuf,
    keygen: String,
    keyscan: String,
}

impl SshKnownHosts {
    /// `path` defaults to `~/.ssh/known_hosts`
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => dirs::home_dir()
                .ok_or(HostsError::HomeDirNotFound)?
                .join(".ssh")
                .join("known_hosts"),
        };
        Ok(Self {
            path,
            keygen: "ssh-keygen".to_string(),
            keyscan: "ssh-keyscan".to_string(),
        })
    }

    pub fn with_programs(mut self, keygen: impl Into<String>, keyscan: impl Into<String>) -> Self {
        self.keygen = keygen.into();
        self.keyscan = keyscan.into();
        self
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        tracing::debug!("Running: {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(HostsError::CommandFailed {
                program: program.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl KnownHosts for SshKnownHosts {
    async fn forget(&self, host: &str) -> Result<()> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(());
        }
        let path = self.path.to_string_lossy();
        self.run(&self.keygen, &["-R", host, "-f", path.as_ref()])
            .await?;
        Ok(())
    }

    async fn learn(&self, host: &str) -> Result<()> {
        let keys = self
            .run(&self.keyscan, &["-H", "-t", "rsa", host])
            .await?;
        if keys.trim().is_empty() {
            return Err(HostsError::CommandFailed {
                program: self.keyscan.clone(),
                stderr: format!("no key returned for {}", host),
            });
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(keys.as_bytes()).await?;
        if !keys.ends_with('\n') {
            file.write_all(b"\n").await?;
        }
        file.flush().await?;
        Ok(())
    }
}
