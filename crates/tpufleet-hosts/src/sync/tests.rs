use super::*;
use crate::error::{HostsError, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tpufleet_cloud::{AuthStatus, CreateNodeRequest};
use tpufleet_core::{FleetSection, GeneralSettings, Generation};

struct DescribeOnly(String);

#[async_trait]
impl TpuProvider for DescribeOnly {
    fn name(&self) -> &str {
        "describe-only"
    }

    fn display_name(&self) -> &str {
        "Describe only"
    }

    async fn check_auth(&self) -> tpufleet_cloud::Result<AuthStatus> {
        Ok(AuthStatus::ok("tester"))
    }

    async fn list_nodes(&self, _zone: &str) -> tpufleet_cloud::Result<String> {
        Ok(String::new())
    }

    async fn describe_nodes(&self, _zone: &str) -> tpufleet_cloud::Result<String> {
        Ok(self.0.clone())
    }

    async fn create_node(&self, _request: &CreateNodeRequest) -> tpufleet_cloud::Result<()> {
        unreachable!("sync never creates")
    }
}

struct MemoryHosts {
    path: PathBuf,
    content: Mutex<String>,
    writes: Mutex<u32>,
    read_only: bool,
}

impl MemoryHosts {
    fn new(content: &str) -> Self {
        Self {
            path: PathBuf::from("/etc/hosts"),
            content: Mutex::new(content.to_string()),
            writes: Mutex::new(0),
            read_only: false,
        }
    }

    fn content(&self) -> String {
        self.content.lock().unwrap().clone()
    }

    fn writes(&self) -> u32 {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl HostsStore for MemoryHosts {
    fn location(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<String> {
        Ok(self.content())
    }

    async fn write(&self, content: &str) -> Result<()> {
        if self.read_only {
            return Err(HostsError::PrivilegeDenied("incorrect password".to_string()));
        }
        *self.writes.lock().unwrap() += 1;
        *self.content.lock().unwrap() = content.to_string();
        Ok(())
    }
}

#[derive(Default)]
struct RecordingKnownHosts {
    calls: Mutex<Vec<String>>,
    unreachable: Vec<String>,
}

#[async_trait]
impl KnownHosts for RecordingKnownHosts {
    async fn forget(&self, host: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("forget {}", host));
        Ok(())
    }

    async fn learn(&self, host: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("learn {}", host));
        if self.unreachable.iter().any(|h| h == host) {
            return Err(HostsError::CommandFailed {
                program: "ssh-keyscan".to_string(),
                stderr: "timeout".to_string(),
            });
        }
        Ok(())
    }
}

const DESCRIBED: &str = r#"name: projects/demo/locations/us-central1-f/nodes/v2-1
networkEndpoints:
- accessConfig:
    externalIp: 34.10.0.1
---
name: projects/demo/locations/us-central1-f/nodes/v2-2
networkEndpoints:
- accessConfig:
    externalIp: 34.10.0.2
---
name: projects/demo/locations/us-central1-f/nodes/v2-3
networkEndpoints:
- ipAddress: 10.128.0.4
"#;

fn spec(extension: &str) -> DesiredFleetSpec {
    let general = GeneralSettings {
        extension: extension.to_string(),
        ..Default::default()
    };
    DesiredFleetSpec::from_section(
        Generation::V2,
        &FleetSection {
            zone: "us-central1-f".to_string(),
            num_vms: 3,
            cores_per_vm: 8,
        },
        &general,
    )
}

fn members(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_sync_writes_block_and_drops_stale_lines() {
    let provider = DescribeOnly(DESCRIBED.to_string());
    let hosts = MemoryHosts::new("127.0.0.1 localhost\n10.9.9.9 v2-1.tpu\n10.0.0.10 v2-10.tpu\n");
    let sync = HostSynchronizer::new(&provider, &hosts);

    let report = sync
        .sync(&spec("tpu"), &members(&["v2-1", "v2-2"]))
        .await
        .unwrap();

    assert_eq!(report.entries.len(), 2);
    assert!(report.is_clean());
    assert_eq!(
        hosts.content(),
        "127.0.0.1 localhost\n10.0.0.10 v2-10.tpu\n\n\
         # >>> tpufleet v2 us-central1-f >>>\n\
         34.10.0.1 v2-1.tpu\n\
         34.10.0.2 v2-2.tpu\n\
         # <<< tpufleet v2 us-central1-f <<<\n"
    );
}

#[tokio::test]
async fn test_zone_change_replaces_old_zone_block() {
    let provider = DescribeOnly(DESCRIBED.to_string());
    let hosts = MemoryHosts::new(
        "127.0.0.1 localhost\n\n\
         # >>> tpufleet v2 europe-west4-a >>>\n\
         1.2.3.4 v2-1.tpu\n\
         # <<< tpufleet v2 europe-west4-a <<<\n",
    );
    let sync = HostSynchronizer::new(&provider, &hosts);

    sync.sync(&spec("tpu"), &members(&["v2-1", "v2-2"]))
        .await
        .unwrap();

    let content = hosts.content();
    assert_eq!(content.matches("v2-1.tpu").count(), 1);
    assert!(!content.contains("europe-west4-a"));
    assert_eq!(
        content,
        "127.0.0.1 localhost\n\n\
         # >>> tpufleet v2 us-central1-f >>>\n\
         34.10.0.1 v2-1.tpu\n\
         34.10.0.2 v2-2.tpu\n\
         # <<< tpufleet v2 us-central1-f <<<\n"
    );
}

#[tokio::test]
async fn test_second_sync_does_not_rewrite() {
    let provider = DescribeOnly(DESCRIBED.to_string());
    let hosts = MemoryHosts::new("127.0.0.1 localhost\n");
    let sync = HostSynchronizer::new(&provider, &hosts);
    let members = members(&["v2-1", "v2-2"]);

    sync.sync(&spec("tpu"), &members).await.unwrap();
    let first = hosts.content();
    sync.sync(&spec("tpu"), &members).await.unwrap();

    assert_eq!(hosts.content(), first);
    assert_eq!(hosts.writes(), 1);
}

#[tokio::test]
async fn test_member_without_ip_is_unresolved() {
    let provider = DescribeOnly(DESCRIBED.to_string());
    let hosts = MemoryHosts::new("");
    let sync = HostSynchronizer::new(&provider, &hosts);

    let report = sync
        .sync(&spec(""), &members(&["v2-1", "v2-3"]))
        .await
        .unwrap();

    assert_eq!(report.entries, vec![HostEntry::new("v2-1", "34.10.0.1")]);
    assert_eq!(report.unresolved, vec!["v2-3"]);
    assert!(hosts.content().contains("34.10.0.1 v2-1\n"));
}

#[tokio::test]
async fn test_known_hosts_refreshed_per_member() {
    let provider = DescribeOnly(DESCRIBED.to_string());
    let hosts = MemoryHosts::new("");
    let known = RecordingKnownHosts {
        unreachable: vec!["v2-1.tpu".to_string()],
        ..Default::default()
    };
    let sync = HostSynchronizer::new(&provider, &hosts).with_known_hosts(&known);

    let report = sync
        .sync(&spec("tpu"), &members(&["v2-1", "v2-2"]))
        .await
        .unwrap();

    assert_eq!(
        known.calls.lock().unwrap().clone(),
        vec![
            "forget 34.10.0.1",
            "forget v2-1.tpu",
            "learn v2-1.tpu",
            "forget 34.10.0.2",
            "forget v2-2.tpu",
            "learn v2-2.tpu",
        ]
    );
    // the failure on v2-1 does not stop v2-2
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].contains("v2-1.tpu"));
}

#[tokio::test]
async fn test_write_failure_is_recorded_and_known_hosts_still_run() {
    let provider = DescribeOnly(DESCRIBED.to_string());
    let mut hosts = MemoryHosts::new("");
    hosts.read_only = true;
    let known = RecordingKnownHosts::default();
    let sync = HostSynchronizer::new(&provider, &hosts).with_known_hosts(&known);

    let report = sync
        .sync(&spec("tpu"), &members(&["v2-1"]))
        .await
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].contains("/etc/hosts"));
    assert_eq!(known.calls.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_malformed_description_is_an_error() {
    let provider = DescribeOnly("name: [unterminated".to_string());
    let hosts = MemoryHosts::new("");
    let sync = HostSynchronizer::new(&provider, &hosts);

    assert!(sync.sync(&spec(""), &members(&["v2-1"])).await.is_err());
    assert_eq!(hosts.writes(), 0);
}
