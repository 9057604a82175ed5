use colored::Colorize;
use std::path::{Path, PathBuf};
use tpufleet_cloud::TpuProvider;
use tpufleet_cloud_gcp::GcpTpuProvider;
use tpufleet_core::{DesiredFleet, DesiredFleetSpec, Generation};
use tpufleet_hosts::{PrivilegeContext, TerminalPrompt};
use tracing_subscriber::EnvFilter;

/// stderrにログを出す（RUST_LOG があればそちらを優先）
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn parse_generation(value: &str) -> Result<Generation, String> {
    value
        .parse()
        .map_err(|_| format!("未知の世代です: {} (v2, v3, v4 のいずれか)", value))
}

/// `--create-missing` / `--no-create` を設定の上書きに変換
pub fn create_override(create_missing: bool, no_create: bool) -> Option<bool> {
    match (create_missing, no_create) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// 設定ファイルを探して読み込む
pub fn load_fleet(explicit: Option<&Path>) -> anyhow::Result<(PathBuf, DesiredFleet)> {
    let path = tpufleet_config::find_config_file(explicit)?;
    let fleet = tpufleet_core::parse_config_file(&path)
        .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
    Ok((path, fleet))
}

/// 対象の世代を決める
///
/// 世代が指定された場合、その世代は設定で要求されていなければならない。
pub fn select_specs(
    fleet: &DesiredFleet,
    generation: Option<Generation>,
) -> anyhow::Result<Vec<DesiredFleetSpec>> {
    match generation {
        Some(generation) => fleet.spec(generation).cloned().map(|s| vec![s]).ok_or_else(|| {
            anyhow::anyhow!(
                "{} は設定で要求されていません。要求中: {}",
                generation,
                requested_list(fleet)
            )
        }),
        None => {
            let specs: Vec<_> = fleet.requested().cloned().collect();
            if specs.is_empty() {
                println!("{}", "要求された世代がありません。何もしません。".yellow());
            }
            Ok(specs)
        }
    }
}

fn requested_list(fleet: &DesiredFleet) -> String {
    let names: Vec<String> = fleet.requested().map(|s| s.generation.to_string()).collect();
    if names.is_empty() {
        "(なし)".to_string()
    } else {
        names.join(", ")
    }
}

/// gcloudプロバイダを作り、認証を確認する
pub async fn connect_provider(fleet: &DesiredFleet) -> anyhow::Result<GcpTpuProvider> {
    let provider = GcpTpuProvider::new(fleet.general.project.clone());

    let auth = provider.check_auth().await?;
    if !auth.authenticated {
        return Err(anyhow::anyhow!(
            "{} の認証を確認できません: {}\nヒント: gcloud auth login を実行してください",
            provider.display_name(),
            auth.error.unwrap_or_default()
        ));
    }
    if let Some(account) = &auth.account_info {
        tracing::info!("gcloud account: {}", account);
    }

    Ok(provider)
}

pub fn privilege_context(no_sudo: bool) -> PrivilegeContext {
    if no_sudo {
        PrivilegeContext::unprivileged()
    } else {
        PrivilegeContext::new(Box::new(TerminalPrompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_override() {
        assert_eq!(create_override(false, false), None);
        assert_eq!(create_override(true, false), Some(true));
        assert_eq!(create_override(false, true), Some(false));
    }

    #[test]
    fn test_parse_generation() {
        assert_eq!(parse_generation("v3"), Ok(Generation::V3));
        assert_eq!(parse_generation("4"), Ok(Generation::V4));
        assert!(parse_generation("v5").is_err());
    }

    #[test]
    fn test_select_specs() {
        let fleet = tpufleet_core::parse_kdl_string(
            r#"
            v4 { zone "us-central2-b"; num_vms 1; cores_per_vm 8; }
            v2 { zone "us-central1-f"; num_vms 2; cores_per_vm 8; }
            "#,
        )
        .unwrap();

        let all = select_specs(&fleet, None).unwrap();
        let generations: Vec<_> = all.iter().map(|s| s.generation).collect();
        assert_eq!(generations, vec![Generation::V2, Generation::V4]);

        assert_eq!(select_specs(&fleet, Some(Generation::V4)).unwrap().len(), 1);
        let err = select_specs(&fleet, Some(Generation::V3)).unwrap_err();
        assert!(err.to_string().contains("v2, v4"));
    }
}
