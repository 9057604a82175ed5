//! Host table storage

use crate::error::Result;
use crate::privilege::PrivilegeContext;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOSTS_FILE: &str = "/etc/hosts";

#[async_trait]
pub trait HostsStore: Send + Sync {
    fn location(&self) -> &Path;

    /// Current content; a missing file reads as empty.
    async fn read(&self) -> Result<String>;

    async fn write(&self, content: &str) -> Result<()>;
}

/// Hosts file read as the user and written through the privilege context
pub struct HostsFile<'a> {
    path: PathBuf,
    privilege: &'a PrivilegeContext,
}

impl<'a> HostsFile<'a> {
    pub fn new(path: Option<PathBuf>, privilege: &'a PrivilegeContext) -> Self {
        Self {
            path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_HOSTS_FILE)),
            privilege,
        }
    }
}

#[async_trait]
impl HostsStore for HostsFile<'_> {
    fn location(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, content: &str) -> Result<()> {
        let path = self.path.to_string_lossy();
        self.privilege
            .run("tee", &[path.as_ref()], Some(content.as_bytes()))
            .await?;
        tracing::info!("Updated {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = PrivilegeContext::unprivileged();
        let store = HostsFile::new(Some(dir.path().join("hosts")), &ctx);
        assert_eq!(store.read().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "old\nlonger content\n").unwrap();
        let ctx = PrivilegeContext::unprivileged();
        let store = HostsFile::new(Some(path.clone()), &ctx);

        store.write("127.0.0.1 localhost\n").await.unwrap();

        assert_eq!(store.read().await.unwrap(), "127.0.0.1 localhost\n");
    }

    #[test]
    fn test_default_location() {
        let ctx = PrivilegeContext::unprivileged();
        let store = HostsFile::new(None, &ctx);
        assert_eq!(store.location(), Path::new("/etc/hosts"));
    }
}
