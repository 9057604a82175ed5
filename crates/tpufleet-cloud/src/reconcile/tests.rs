use super::*;
use crate::error::CloudError;
use crate::provider::{AuthStatus, CreateNodeRequest};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tpufleet_core::{FleetSection, GeneralSettings};

/// Zone inventory that grows a READY node for every successful create
#[derive(Default)]
struct FakeZone {
    nodes: Mutex<Vec<(String, String, String)>>,
    failures: Mutex<HashMap<String, u32>>,
    creates: Mutex<Vec<String>>,
}

impl FakeZone {
    fn with_nodes(nodes: &[(&str, &str, &str)]) -> Self {
        let zone = Self::default();
        *zone.nodes.lock().unwrap() = nodes
            .iter()
            .map(|(n, t, s)| (n.to_string(), t.to_string(), s.to_string()))
            .collect();
        zone
    }

    fn failing(self, name: &str, times: u32) -> Self {
        self.failures.lock().unwrap().insert(name.to_string(), times);
        self
    }

    fn creates(&self) -> Vec<String> {
        self.creates.lock().unwrap().clone()
    }
}

#[async_trait]
impl TpuProvider for FakeZone {
    fn name(&self) -> &str {
        "fake"
    }

    fn display_name(&self) -> &str {
        "Fake"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        Ok(AuthStatus::ok("tester@example.com"))
    }

    async fn list_nodes(&self, zone: &str) -> Result<String> {
        let mut out = String::from("NAME  ZONE  ACCELERATOR_TYPE  NETWORK  RANGE  STATUS\n");
        for (name, accel, status) in self.nodes.lock().unwrap().iter() {
            out.push_str(&format!(
                "{}  {}  {}  default  10.0.0.0/29  {}\n",
                name, zone, accel, status
            ));
        }
        Ok(out)
    }

    async fn describe_nodes(&self, _zone: &str) -> Result<String> {
        Ok(String::new())
    }

    async fn create_node(&self, request: &CreateNodeRequest) -> Result<()> {
        self.creates.lock().unwrap().push(request.name.clone());

        let mut failures = self.failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(&request.name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CloudError::CommandFailed(
                    "There is no more capacity in the zone".to_string(),
                ));
            }
        }

        self.nodes.lock().unwrap().push((
            request.name.clone(),
            request.accelerator_type.clone(),
            "READY".to_string(),
        ));
        Ok(())
    }
}

/// Records the member list it was asked to publish
#[derive(Default)]
struct RecordingSync {
    calls: Mutex<Vec<Vec<String>>>,
    fail: bool,
}

#[async_trait]
impl ReachabilitySync for RecordingSync {
    async fn sync(&self, _spec: &DesiredFleetSpec, members: &[String]) -> Result<SyncReport> {
        self.calls.lock().unwrap().push(members.to_vec());
        if self.fail {
            return Err(CloudError::Sync("sudo: a password is required".to_string()));
        }
        Ok(SyncReport {
            entries: members
                .iter()
                .map(|m| HostEntry::new(m.clone(), "203.0.113.10"))
                .collect(),
            ..Default::default()
        })
    }
}

fn spec(target: u32, auto_create: bool) -> DesiredFleetSpec {
    let general = GeneralSettings {
        create_missing: auto_create,
        ..Default::default()
    };
    DesiredFleetSpec::from_section(
        Generation::V2,
        &FleetSection {
            zone: "us-central1-f".to_string(),
            num_vms: target,
            cores_per_vm: 8,
        },
        &general,
    )
}

fn policy() -> RetryPolicy {
    RetryPolicy::new(20, Duration::from_secs(1))
}

fn ready(name: &str) -> (&str, &str, &str) {
    (name, "v2-8", "READY")
}

#[tokio::test]
async fn test_satisfied_fleet_creates_nothing() {
    let zone = FakeZone::with_nodes(&[ready("v2-1"), ready("v2-2")]);
    let sync = RecordingSync::default();
    let reconciler = Reconciler::new(&zone, policy()).with_sync(&sync);

    let report = reconciler
        .reconcile(&spec(2, true), ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(report.phase, FleetPhase::Done);
    assert!(zone.creates().is_empty());
    assert!(report.plan.is_none());
    assert_eq!(
        sync.calls.lock().unwrap().clone(),
        vec![vec!["v2-1".to_string(), "v2-2".to_string()]]
    );
}

#[tokio::test]
async fn test_second_pass_is_idempotent() {
    let zone = FakeZone::with_nodes(&[ready("v2-1")]);
    let reconciler = Reconciler::new(&zone, policy());
    let spec = spec(3, true);

    let first = reconciler
        .reconcile(&spec, ReconcileOptions::default())
        .await
        .unwrap();
    assert_eq!(first.created(), vec!["v2-2", "v2-3"]);

    let second = reconciler
        .reconcile(&spec, ReconcileOptions::default())
        .await
        .unwrap();
    assert!(second.created().is_empty());
    assert!(second.missing.is_empty());
    assert_eq!(zone.creates(), vec!["v2-2", "v2-3"]);
}

#[tokio::test]
async fn test_gap_before_existing_member() {
    // v2-3 is missing; v2-4 exists and is ready
    let zone = FakeZone::with_nodes(&[ready("v2-1"), ready("v2-2"), ready("v2-4")]);
    let sync = RecordingSync::default();
    let reconciler = Reconciler::new(&zone, policy()).with_sync(&sync);

    let assessment = reconciler.assess(&spec(4, true)).await.unwrap();
    assert_eq!(assessment.phase, FleetPhase::Deficient);
    assert_eq!(assessment.missing, vec![3, 4]);
    assert_eq!(assessment.compliant_names(), vec!["v2-1", "v2-2"]);

    let report = reconciler
        .reconcile(&spec(4, true), ReconcileOptions::default())
        .await
        .unwrap();

    // v2-4 already exists and is never created again
    assert_eq!(zone.creates(), vec!["v2-3"]);
    assert_eq!(report.phase, FleetPhase::Done);
    assert!(report.missing.is_empty());
    assert_eq!(report.compliant, vec!["v2-1", "v2-2", "v2-3", "v2-4"]);
    assert_eq!(
        sync.calls.lock().unwrap().last().cloned().unwrap(),
        vec!["v2-1", "v2-2", "v2-3", "v2-4"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_retried() {
    let zone = FakeZone::with_nodes(&[ready("v2-1"), ready("v2-2")]).failing("v2-3", 2);
    let reconciler = Reconciler::new(&zone, policy());

    let report = reconciler
        .reconcile(&spec(3, true), ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(zone.creates(), vec!["v2-3", "v2-3", "v2-3"]);
    let creation = report.creation.unwrap();
    assert_eq!(creation.succeeded[0].attempts, 3);
    assert_eq!(report.phase, FleetPhase::Done);
}

#[tokio::test]
async fn test_deficient_without_auto_create_is_reported() {
    let zone = FakeZone::with_nodes(&[ready("v2-1")]);
    let sync = RecordingSync::default();
    let reconciler = Reconciler::new(&zone, policy()).with_sync(&sync);

    let report = reconciler
        .reconcile(&spec(3, false), ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(report.phase, FleetPhase::Reported);
    assert_eq!(report.missing, vec![2, 3]);
    assert_eq!(report.plan.as_ref().unwrap().summary().create, 2);
    assert!(zone.creates().is_empty());
    assert!(sync.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_option_overrides_config() {
    let zone = FakeZone::with_nodes(&[ready("v2-1")]);
    let reconciler = Reconciler::new(&zone, policy());
    let options = ReconcileOptions {
        create_missing: Some(true),
        ..Default::default()
    };

    let report = reconciler.reconcile(&spec(2, false), options).await.unwrap();

    assert_eq!(zone.creates(), vec!["v2-2"]);
    assert_eq!(report.phase, FleetPhase::Done);
}

#[tokio::test]
async fn test_dry_run_plans_only() {
    let zone = FakeZone::with_nodes(&[ready("v2-1")]);
    let reconciler = Reconciler::new(&zone, policy());
    let options = ReconcileOptions {
        dry_run: true,
        ..Default::default()
    };

    let report = reconciler.reconcile(&spec(2, true), options).await.unwrap();

    assert_eq!(report.phase, FleetPhase::Reported);
    assert!(report.plan.is_some());
    assert!(zone.creates().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_creation_escalates() {
    let zone = FakeZone::with_nodes(&[ready("v2-1")]).failing("v2-2", 100);
    let sync = RecordingSync::default();
    let reconciler =
        Reconciler::new(&zone, RetryPolicy::new(3, Duration::from_secs(1))).with_sync(&sync);

    let report = reconciler
        .reconcile(&spec(3, true), ReconcileOptions::default())
        .await
        .unwrap();

    assert!(report.is_escalated());
    // stops at the first exhausted member
    assert_eq!(zone.creates(), vec!["v2-2", "v2-2", "v2-2"]);
    let creation = report.creation.unwrap();
    assert_eq!(creation.failed.len(), 1);
    assert_eq!(creation.failed[0].attempts, 3);
    assert!(sync.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_compliant_members_are_reported_not_touched() {
    let zone = FakeZone::with_nodes(&[
        ready("v2-1"),
        ("v2-2", "v2-32", "READY"),
        ("v2-3", "v2-8", "CREATING"),
    ]);
    let reconciler = Reconciler::new(&zone, policy());

    let report = reconciler
        .reconcile(&spec(3, true), ReconcileOptions::default())
        .await
        .unwrap();

    assert!(zone.creates().is_empty());
    let plan = report.plan.unwrap();
    assert_eq!(plan.summary().blocked, 2);
    assert_eq!(report.compliant, vec!["v2-1"]);
    assert_eq!(report.violations.len(), 2);
}

#[tokio::test]
async fn test_other_generations_are_ignored() {
    let zone = FakeZone::with_nodes(&[ready("v2-1"), ("v3-1", "v3-8", "READY")]);
    let reconciler = Reconciler::new(&zone, policy());

    let assessment = reconciler.assess(&spec(1, false)).await.unwrap();

    assert!(assessment.is_satisfied());
    assert_eq!(assessment.foreign, vec!["v3-1"]);
    assert!(assessment.existing_names().contains("v3-1"));
}

#[tokio::test]
async fn test_sync_failure_is_not_fatal() {
    let zone = FakeZone::with_nodes(&[ready("v2-1")]);
    let sync = RecordingSync {
        fail: true,
        ..Default::default()
    };
    let reconciler = Reconciler::new(&zone, policy()).with_sync(&sync);

    let report = reconciler
        .reconcile(&spec(1, false), ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(report.phase, FleetPhase::Done);
    assert!(report.sync.is_none());
    assert!(report.sync_error.unwrap().contains("password"));
}

#[tokio::test]
async fn test_skip_hosts() {
    let zone = FakeZone::with_nodes(&[ready("v2-1")]);
    let sync = RecordingSync::default();
    let reconciler = Reconciler::new(&zone, policy()).with_sync(&sync);
    let options = ReconcileOptions {
        sync_hosts: false,
        ..Default::default()
    };

    reconciler.reconcile(&spec(1, false), options).await.unwrap();

    assert!(sync.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_sync_compliant_never_creates() {
    let zone = FakeZone::with_nodes(&[ready("v2-1")]);
    let sync = RecordingSync::default();
    let reconciler = Reconciler::new(&zone, policy()).with_sync(&sync);

    let report = reconciler.sync_compliant(&spec(3, true)).await.unwrap();

    assert!(zone.creates().is_empty());
    assert_eq!(report.sync.unwrap().entries.len(), 1);
}

#[test]
fn test_merge_members_orders_by_index() {
    let merged = merge_members(
        vec!["v2-1".to_string(), "v2-10".to_string()],
        vec!["v2-2".to_string(), "v2-1".to_string()],
    );
    assert_eq!(merged, vec!["v2-1", "v2-2", "v2-10"]);
}
