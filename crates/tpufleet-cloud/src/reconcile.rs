//! Fleet reconciliation
//!
//! One pass per generation:
//!
//! ```text
//! NOT_CHECKED → CHECKING → SATISFIED ─────────────────────────→ SYNCING_HOSTS → DONE
//!                        └→ DEFICIENT ─(auto-create)→ CREATING → CHECKING ─┘
//!                                     └─(no auto-create)→ REPORTED
//!                                     CREATING ─(retries exhausted)→ ESCALATED
//! ```
//!
//! The phases are only logged and reported; nothing is persisted between passes.

use crate::action::{ApplyResult, Plan};
use crate::creator::CreationDriver;
use crate::error::Result;
use crate::provider::TpuProvider;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use tpufleet_core::{
    DesiredFleetSpec, Generation, HostEntry, InvariantReport, MemberRecord, Violation,
};

/// Conceptual state of one generation during a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetPhase {
    NotChecked,
    Checking,
    Satisfied,
    Deficient,
    Creating,
    SyncingHosts,
    Done,
    Reported,
    Escalated,
}

impl std::fmt::Display for FleetPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FleetPhase::NotChecked => "not-checked",
            FleetPhase::Checking => "checking",
            FleetPhase::Satisfied => "satisfied",
            FleetPhase::Deficient => "deficient",
            FleetPhase::Creating => "creating",
            FleetPhase::SyncingHosts => "syncing-hosts",
            FleetPhase::Done => "done",
            FleetPhase::Reported => "reported",
            FleetPhase::Escalated => "escalated",
        };
        f.write_str(s)
    }
}

/// Outcome of a reachability sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Entries written to the host table
    pub entries: Vec<HostEntry>,

    /// Members without a resolvable external IP
    pub unresolved: Vec<String>,

    /// Best-effort steps that failed (logged, not fatal)
    pub failures: Vec<String>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty() && self.failures.is_empty()
    }
}

/// Publishes reachability metadata for a fleet's members
#[async_trait]
pub trait ReachabilitySync: Send + Sync {
    /// Sync host table and known hosts for `members` (short names)
    async fn sync(&self, spec: &DesiredFleetSpec, members: &[String]) -> Result<SyncReport>;
}

/// Result of inventory → invariant check → deficit
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub generation: Generation,
    pub zone: String,

    /// Records of this generation, sorted by index
    pub records: Vec<MemberRecord>,

    /// Nodes in the same zone that belong to another generation
    pub foreign: Vec<String>,

    pub invariants: InvariantReport,

    /// Indices in `1..=target` without a compliant member
    pub missing: Vec<u32>,

    /// `Satisfied` or `Deficient`
    pub phase: FleetPhase,
}

impl Assessment {
    pub fn compliant_names(&self) -> Vec<String> {
        self.invariants.compliant_names()
    }

    /// Every node name present in the zone
    pub fn existing_names(&self) -> HashSet<String> {
        self.records
            .iter()
            .map(|r| r.name.clone())
            .chain(self.foreign.iter().cloned())
            .collect()
    }

    pub fn is_satisfied(&self) -> bool {
        self.phase == FleetPhase::Satisfied
    }
}

/// Per-invocation overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Overrides the config's `create_missing` when set
    pub create_missing: Option<bool>,

    pub sync_hosts: bool,

    /// Assess and plan only
    pub dry_run: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            create_missing: None,
            sync_hosts: true,
            dry_run: false,
        }
    }
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub generation: Generation,
    pub zone: String,
    pub phase: FleetPhase,
    pub compliant: Vec<String>,
    pub violations: Vec<Violation>,
    pub missing: Vec<u32>,
    pub plan: Option<Plan>,
    pub creation: Option<ApplyResult>,
    pub sync: Option<SyncReport>,
    pub sync_error: Option<String>,
}

impl ReconcileReport {
    fn new(assessment: &Assessment) -> Self {
        Self {
            generation: assessment.generation,
            zone: assessment.zone.clone(),
            phase: assessment.phase,
            compliant: assessment.compliant_names(),
            violations: assessment.invariants.violations.clone(),
            missing: assessment.missing.clone(),
            plan: None,
            creation: None,
            sync: None,
            sync_error: None,
        }
    }

    fn refresh(&mut self, assessment: &Assessment) {
        self.compliant = assessment.compliant_names();
        self.violations = assessment.invariants.violations.clone();
        self.missing = assessment.missing.clone();
    }

    /// Names created during this pass
    pub fn created(&self) -> Vec<String> {
        self.creation
            .as_ref()
            .map(|c| c.created_names())
            .unwrap_or_default()
    }

    pub fn is_escalated(&self) -> bool {
        self.phase == FleetPhase::Escalated
    }
}

/// Drives one generation through a reconciliation pass
pub struct Reconciler<'a> {
    provider: &'a dyn TpuProvider,
    sync: Option<&'a dyn ReachabilitySync>,
    policy: RetryPolicy,
}

impl<'a> Reconciler<'a> {
    pub fn new(provider: &'a dyn TpuProvider, policy: RetryPolicy) -> Self {
        Self {
            provider,
            sync: None,
            policy,
        }
    }

    pub fn with_sync(mut self, sync: &'a dyn ReachabilitySync) -> Self {
        self.sync = Some(sync);
        self
    }

    fn transition(&self, spec: &DesiredFleetSpec, from: FleetPhase, to: FleetPhase) {
        tracing::info!(
            generation = %spec.generation,
            zone = %spec.zone,
            "{} -> {}",
            from,
            to
        );
    }

    /// Inventory, invariant check and deficit. No side effects.
    pub async fn assess(&self, spec: &DesiredFleetSpec) -> Result<Assessment> {
        self.transition(spec, FleetPhase::NotChecked, FleetPhase::Checking);

        let listing = self.provider.list_nodes(&spec.zone).await?;
        let records = tpufleet_core::parse_listing(&listing, &spec.zone)?;

        let (records, foreign): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|r| spec.generation.owns(&r.name));
        let foreign: Vec<String> = foreign.into_iter().map(|r| r.name).collect();
        if !foreign.is_empty() {
            tracing::debug!("Ignoring nodes of other generations: {:?}", foreign);
        }

        let invariants = tpufleet_core::check(&records, spec);
        for violation in &invariants.violations {
            tracing::warn!(generation = %spec.generation, "{}", violation);
        }

        let missing = tpufleet_core::missing_indices(&invariants.compliant, spec.target_count);
        let phase = if missing.is_empty() {
            FleetPhase::Satisfied
        } else {
            FleetPhase::Deficient
        };
        self.transition(spec, FleetPhase::Checking, phase);

        Ok(Assessment {
            generation: spec.generation,
            zone: spec.zone.clone(),
            records,
            foreign,
            invariants,
            missing,
            phase,
        })
    }

    /// Full pass: assess, create what is missing (if allowed), re-check, sync hosts.
    pub async fn reconcile(
        &self,
        spec: &DesiredFleetSpec,
        options: ReconcileOptions,
    ) -> Result<ReconcileReport> {
        let auto_create = options.create_missing.unwrap_or(spec.auto_create_missing);
        let mut assessment = self.assess(spec).await?;
        let mut report = ReconcileReport::new(&assessment);

        if assessment.phase == FleetPhase::Deficient {
            let plan = Plan::for_missing(spec, &assessment.missing, &assessment.existing_names());
            report.plan = Some(plan.clone());

            if !auto_create || options.dry_run {
                self.transition(spec, FleetPhase::Deficient, FleetPhase::Reported);
                report.phase = FleetPhase::Reported;
                return Ok(report);
            }

            self.transition(spec, FleetPhase::Deficient, FleetPhase::Creating);
            let driver = CreationDriver::new(self.provider, self.policy);
            let result = driver.apply(&plan).await;
            let escalated = !result.is_success();
            report.creation = Some(result);

            if escalated {
                self.transition(spec, FleetPhase::Creating, FleetPhase::Escalated);
                report.phase = FleetPhase::Escalated;
                return Ok(report);
            }

            if plan.has_changes {
                assessment = self.assess(spec).await?;
                report.refresh(&assessment);
            }
            report.phase = assessment.phase;
        } else if options.dry_run {
            return Ok(report);
        }

        let members = merge_members(assessment.compliant_names(), report.created());
        if options.sync_hosts {
            self.sync_members(spec, &members, &mut report).await;
        }

        self.transition(spec, report.phase, FleetPhase::Done);
        report.phase = FleetPhase::Done;
        Ok(report)
    }

    /// Assess and sync the compliant members only; never creates anything.
    pub async fn sync_compliant(&self, spec: &DesiredFleetSpec) -> Result<ReconcileReport> {
        let assessment = self.assess(spec).await?;
        let mut report = ReconcileReport::new(&assessment);

        self.sync_members(spec, &assessment.compliant_names(), &mut report)
            .await;

        self.transition(spec, report.phase, FleetPhase::Done);
        report.phase = FleetPhase::Done;
        Ok(report)
    }

    async fn sync_members(
        &self,
        spec: &DesiredFleetSpec,
        members: &[String],
        report: &mut ReconcileReport,
    ) {
        let Some(sync) = self.sync else {
            tracing::debug!("No reachability synchronizer configured");
            return;
        };

        self.transition(spec, report.phase, FleetPhase::SyncingHosts);
        match sync.sync(spec, members).await {
            Ok(sync_report) => {
                for failure in &sync_report.failures {
                    tracing::warn!(generation = %spec.generation, "{}", failure);
                }
                report.sync = Some(sync_report);
            }
            Err(e) => {
                tracing::warn!(generation = %spec.generation, "Host sync failed: {}", e);
                report.sync_error = Some(e.to_string());
            }
        }
    }
}

/// Compliant ∪ newly created, ordered by index
fn merge_members(compliant: Vec<String>, created: Vec<String>) -> Vec<String> {
    let mut members = compliant;
    for name in created {
        if !members.contains(&name) {
            members.push(name);
        }
    }
    members.sort_by_key(|name| tpufleet_core::name_index(name).unwrap_or(u32::MAX));
    members
}

#[cfg(test)]
mod tests;
