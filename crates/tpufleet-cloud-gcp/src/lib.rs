//! Google Cloud TPU provider for tpufleet
//!
//! Implements [`TpuProvider`](tpufleet_cloud::TpuProvider) on top of the
//! `gcloud compute tpus tpu-vm` commands.
//!
//! # Requirements
//!
//! - `gcloud` CLI must be installed
//! - Authentication is managed through `gcloud auth login`
//!
//! # Example
//!
//! ```ignore
//! use tpufleet_cloud::TpuProvider;
//! use tpufleet_cloud_gcp::GcpTpuProvider;
//!
//! let provider = GcpTpuProvider::new(None);
//!
//! let auth = provider.check_auth().await?;
//! if !auth.authenticated {
//!     panic!("Not authenticated: {:?}", auth.error);
//! }
//!
//! let listing = provider.list_nodes("us-central1-f").await?;
//! ```

pub mod error;
pub mod gcloud;
pub mod provider;

pub use error::{GcpError, Result};
pub use gcloud::{CreateTpuArgs, Gcloud};
pub use provider::GcpTpuProvider;
