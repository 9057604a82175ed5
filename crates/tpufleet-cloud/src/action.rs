//! Creation plan for missing fleet members

use crate::provider::CreateNodeRequest;
use serde::Serialize;
use std::collections::HashSet;
use tpufleet_core::DesiredFleetSpec;

/// Represents a planned action for one missing member
#[derive(Debug, Clone, Serialize)]
pub struct Action {
    /// Unique identifier for the action
    pub id: String,

    /// Type of action to perform
    pub action_type: ActionType,

    /// Member index the action fills
    pub index: u32,

    /// Create call to issue
    pub request: CreateNodeRequest,

    /// Description of the action
    pub description: String,
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new node
    Create,
    /// A node with this name exists but is not compliant; creating it would collide
    Blocked,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Blocked => write!(f, "blocked"),
        }
    }
}

/// Plan containing all actions for one generation
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// List of actions in ascending index order
    pub actions: Vec<Action>,

    /// Whether the plan issues any create call
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type == ActionType::Create);
        Self {
            actions,
            has_changes,
        }
    }

    /// Build the plan for `missing` indices.
    ///
    /// `existing` holds every node name currently present in the zone, compliant
    /// or not.
    pub fn for_missing(
        spec: &DesiredFleetSpec,
        missing: &[u32],
        existing: &HashSet<String>,
    ) -> Self {
        let actions = missing
            .iter()
            .map(|&index| {
                let request = CreateNodeRequest::for_index(spec, index);
                if existing.contains(&request.name) {
                    Action {
                        id: format!("blocked-{}", request.name),
                        action_type: ActionType::Blocked,
                        index,
                        description: format!(
                            "{} already exists but is not compliant; fix or delete it by hand",
                            request.name
                        ),
                        request,
                    }
                } else {
                    Action {
                        id: format!("create-{}", request.name),
                        action_type: ActionType::Create,
                        index,
                        description: format!(
                            "create {} ({}, {}) in {}",
                            request.name, request.accelerator_type, request.runtime_version,
                            request.zone
                        ),
                        request,
                    }
                }
            })
            .collect();

        Self::new(actions)
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            blocked: self.actions_by_type(ActionType::Blocked).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub blocked: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to create, {} blocked", self.create, self.blocked)
    }
}

/// Result of applying a plan
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyResult {
    /// Successfully created nodes
    pub succeeded: Vec<ActionResult>,

    /// Actions that gave up (at most one; the driver stops there)
    pub failed: Vec<ActionResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, action: &Action, attempts: u32) {
        self.succeeded.push(ActionResult {
            action_id: action.id.clone(),
            node_name: action.request.name.clone(),
            attempts,
            error: None,
        });
    }

    pub fn add_failure(&mut self, action: &Action, attempts: u32, error: String) {
        self.failed.push(ActionResult {
            action_id: action.id.clone(),
            node_name: action.request.name.clone(),
            attempts,
            error: Some(error),
        });
    }

    /// Names of nodes whose create call succeeded
    pub fn created_names(&self) -> Vec<String> {
        self.succeeded.iter().map(|r| r.node_name.clone()).collect()
    }
}

/// Result of a single action
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    /// ID of the action
    pub action_id: String,

    pub node_name: String,

    /// Number of create calls issued
    pub attempts: u32,

    /// Error message if failed
    pub error: Option<String>,
}
