//! tpufleet cloud layer
//!
//! Provider abstraction plus the reconciliation machinery that drives a
//! generation from "what exists" to "what was asked for".
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  tpufleet CLI                    │
//! │            (tpufleet up / status / hosts)        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                tpufleet-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │ Reconciler: assess → plan → create → sync│   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────────────┐    │
//! │  │ TpuProvider  │  │  ReachabilitySync    │    │
//! │  └──────────────┘  └──────────────────────┘    │
//! └───────┬─────────────────────┬───────────────────┘
//!         │                     │
//! ┌───────▼───────┐     ┌───────▼───────┐
//! │  gcloud (GCP) │     │ hosts / ssh   │
//! └───────────────┘     └───────────────┘
//! ```

pub mod action;
pub mod creator;
pub mod error;
pub mod provider;
pub mod reconcile;
pub mod retry;

// Re-exports
pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use creator::CreationDriver;
pub use error::{CloudError, Result};
pub use provider::{AuthStatus, CreateNodeRequest, TpuProvider};
pub use reconcile::{
    Assessment, FleetPhase, ReachabilitySync, ReconcileOptions, ReconcileReport, Reconciler,
    SyncReport,
};
pub use retry::RetryPolicy;
