use super::report;
use crate::utils;
use colored::Colorize;
use tpufleet_cloud::{ReconcileOptions, Reconciler, RetryPolicy};
use tpufleet_core::{DesiredFleet, Generation};
use tpufleet_hosts::{HostSynchronizer, HostsFile, SshKnownHosts};

/// 世代ごとに調整パスを実行する
///
/// 1世代の失敗で止めず、残りの世代も処理してから結果を返す。
pub async fn handle(
    fleet: &DesiredFleet,
    generation: Option<Generation>,
    options: ReconcileOptions,
    no_sudo: bool,
) -> anyhow::Result<bool> {
    let specs = utils::select_specs(fleet, generation)?;
    if specs.is_empty() {
        return Ok(true);
    }

    if options.dry_run {
        println!("{}", "ドライラン: 何も変更しません".yellow());
    }

    let provider = utils::connect_provider(fleet).await?;
    let privilege = utils::privilege_context(no_sudo);
    let hosts = HostsFile::new(fleet.general.hosts_file.clone(), &privilege);
    let known_hosts = SshKnownHosts::new(fleet.general.known_hosts_file.clone())?;
    let sync = HostSynchronizer::new(&provider, &hosts).with_known_hosts(&known_hosts);
    let reconciler =
        Reconciler::new(&provider, RetryPolicy::from_settings(&fleet.general)).with_sync(&sync);

    let mut ok = true;
    for spec in &specs {
        report::print_header(spec);

        match reconciler.reconcile(spec, options).await {
            Ok(result) => {
                report::print_report(&result);
                if result.is_escalated() {
                    ok = false;
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
