//! Reachability synchronizer
//!
//! Publishes `{ip} {name.extension}` for every member into the host table,
//! then refreshes the user's known hosts for each one.

use crate::known_hosts::KnownHosts;
use crate::store::HostsStore;
use crate::table::{BlockMarker, HostTable};
use async_trait::async_trait;
use std::collections::HashSet;
use tpufleet_cloud::{ReachabilitySync, SyncReport, TpuProvider};
use tpufleet_core::{DesiredFleetSpec, HostEntry};

pub struct HostSynchronizer<'a> {
    provider: &'a dyn TpuProvider,
    hosts: &'a dyn HostsStore,
    known_hosts: Option<&'a dyn KnownHosts>,
}

impl<'a> HostSynchronizer<'a> {
    pub fn new(provider: &'a dyn TpuProvider, hosts: &'a dyn HostsStore) -> Self {
        Self {
            provider,
            hosts,
            known_hosts: None,
        }
    }

    pub fn with_known_hosts(mut self, known_hosts: &'a dyn KnownHosts) -> Self {
        self.known_hosts = Some(known_hosts);
        self
    }

    /// Resolve external IPs for `members`, in member order.
    async fn resolve(
        &self,
        spec: &DesiredFleetSpec,
        members: &[String],
    ) -> tpufleet_cloud::Result<(Vec<HostEntry>, Vec<String>)> {
        let described = self.provider.describe_nodes(&spec.zone).await?;
        let endpoints = tpufleet_core::parse_endpoints(&described)?;

        let mut entries = Vec::new();
        let mut unresolved = Vec::new();
        for member in members {
            let ip = endpoints
                .iter()
                .find(|ep| &ep.name == member)
                .and_then(|ep| ep.external_ip.clone());
            match ip {
                Some(ip) => entries.push(HostEntry::new(member.clone(), ip)),
                None => {
                    tracing::warn!(node = %member, "No external IP; skipping");
                    unresolved.push(member.clone());
                }
            }
        }
        Ok((entries, unresolved))
    }

    async fn refresh_known_hosts(
        &self,
        known_hosts: &dyn KnownHosts,
        spec: &DesiredFleetSpec,
        entries: &[HostEntry],
        failures: &mut Vec<String>,
    ) {
        for entry in entries {
            let fqdn = spec.qualified_name(&entry.short_name);
            let ip = entry.external_ip.as_str();
            let outcomes = [
                ("forget", ip, known_hosts.forget(ip).await),
                ("forget", fqdn.as_str(), known_hosts.forget(&fqdn).await),
                ("learn", fqdn.as_str(), known_hosts.learn(&fqdn).await),
            ];
            for (step, host, result) in outcomes {
                if let Err(e) = result {
                    let message = format!("known_hosts {} {}: {}", step, host, e);
                    tracing::warn!(node = %entry.short_name, "{}", message);
                    failures.push(message);
                }
            }
        }
    }
}

#[async_trait]
impl ReachabilitySync for HostSynchronizer<'_> {
    async fn sync(
        &self,
        spec: &DesiredFleetSpec,
        members: &[String],
    ) -> tpufleet_cloud::Result<SyncReport> {
        let (entries, unresolved) = self.resolve(spec, members).await?;
        let mut failures = Vec::new();

        let current = self.hosts.read().await?;
        let mut table = HostTable::parse(&current);

        let names: HashSet<String> = members
            .iter()
            .flat_map(|m| [m.clone(), spec.qualified_name(m)])
            .collect();
        let location = self.hosts.location().display();
        let removed = table.remove_names(&names);
        if removed > 0 {
            tracing::info!("Removed {} stale line(s) from {}", removed, location);
        }

        let marker = BlockMarker::new(spec.generation, spec.zone.clone());
        let dropped = table.remove_sibling_blocks(&marker);
        if dropped > 0 {
            tracing::info!(
                generation = %spec.generation,
                "Dropped {} block(s) from other zones",
                dropped
            );
        }

        let lines: Vec<String> = entries
            .iter()
            .map(|e| e.line(&spec.qualified_name(&e.short_name)))
            .collect();
        table.replace_block(&marker, &lines);

        let rendered = table.render();
        if rendered == current {
            tracing::debug!("{} already up to date", location);
        } else if let Err(e) = self.hosts.write(&rendered).await {
            tracing::warn!("Failed to write {}: {}", location, e);
            failures.push(format!("write {}: {}", location, e));
        }

        if let Some(known_hosts) = self.known_hosts {
            self.refresh_known_hosts(known_hosts, spec, &entries, &mut failures)
                .await;
        }

        Ok(SyncReport {
            entries,
            unresolved,
            failures,
        })
    }
}

#[cfg(test)]
mod tests;
