//! tpufleet host synchronization
//!
//! Makes fleet members reachable by name: rewrites this generation's block in
//! the hosts file (through sudo when needed) and refreshes SSH known hosts.

pub mod error;
pub mod known_hosts;
pub mod privilege;
pub mod store;
pub mod sync;
pub mod table;

pub use error::{HostsError, Result};
pub use known_hosts::{KnownHosts, SshKnownHosts};
pub use privilege::{CredentialPrompt, Elevation, PrivilegeContext, TerminalPrompt};
pub use store::{DEFAULT_HOSTS_FILE, HostsFile, HostsStore};
pub use sync::HostSynchronizer;
pub use table::{BlockMarker, HostTable};
