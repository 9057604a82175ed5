use super::report;
use crate::utils;
use colored::Colorize;
use tpufleet_cloud::{Reconciler, RetryPolicy};
use tpufleet_core::{DesiredFleet, Generation};
use tpufleet_hosts::{HostSynchronizer, HostsFile, HostsStore, SshKnownHosts};

/// 準拠ノードだけをhostsに反映する（ノードは作成しない）
pub async fn handle(
    fleet: &DesiredFleet,
    generation: Option<Generation>,
    no_sudo: bool,
) -> anyhow::Result<bool> {
    let specs = utils::select_specs(fleet, generation)?;
    if specs.is_empty() {
        return Ok(true);
    }

    let provider = utils::connect_provider(fleet).await?;
    let privilege = utils::privilege_context(no_sudo);
    let hosts = HostsFile::new(fleet.general.hosts_file.clone(), &privilege);
    let known_hosts = SshKnownHosts::new(fleet.general.known_hosts_file.clone())?;
    let sync = HostSynchronizer::new(&provider, &hosts).with_known_hosts(&known_hosts);
    let reconciler =
        Reconciler::new(&provider, RetryPolicy::from_settings(&fleet.general)).with_sync(&sync);

    println!(
        "hostsファイル: {}",
        hosts.location().display().to_string().cyan()
    );

    let mut ok = true;
    for spec in &specs {
        report::print_header(spec);
        match reconciler.sync_compliant(spec).await {
            Ok(result) => {
                for violation in &result.violations {
                    println!("  {} {}", "⚠".yellow(), violation);
                }
                match (&result.sync, &result.sync_error) {
                    (Some(sync), _) => report::print_sync(sync),
                    (None, Some(error)) => {
                        println!("  {} hosts同期に失敗しました: {}", "⚠".yellow(), error);
                        ok = false;
                    }
                    (None, None) => {}
                }
            }
            Err(e) => {
                report::print_error(spec, &e);
                ok = false;
            }
        }
    }

    Ok(ok)
}
