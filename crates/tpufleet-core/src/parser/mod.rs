//! 設定ファイルパーサー
//!
//! KDL（tpufleet.kdl）と YAML（tpus.yaml）の両方から `DesiredFleet` を組み立てます。

mod kdl_format;
mod yaml_format;

pub use kdl_format::parse_kdl_string;
pub use yaml_format::parse_yaml_string;

use crate::error::{FleetError, Result};
use crate::model::{DesiredFleet, FleetSection, GeneralSettings, Generation};
use std::fs;
use std::path::Path;

/// 設定ファイルをパース（拡張子 .yaml/.yml は YAML、それ以外は KDL）
pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<DesiredFleet> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    tracing::debug!("Loading desired fleet from {}", path.display());

    if is_yaml {
        parse_yaml_string(&content)
    } else {
        parse_kdl_string(&content)
    }
}

/// `v2` のような世代セクション名か
fn is_generation_key(key: &str) -> bool {
    key.strip_prefix('v')
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

/// パース途中の世代セクション（未指定の項目は None）
#[derive(Debug, Default)]
struct PartialSection {
    zone: Option<String>,
    num_vms: Option<u32>,
    cores_per_vm: Option<u32>,
}

impl PartialSection {
    fn finish(self, generation: Generation) -> Result<FleetSection> {
        let missing = |field: &str| {
            FleetError::InvalidConfig(format!("{} セクションに {} がありません", generation, field))
        };

        let zone = self.zone.ok_or_else(|| missing("zone"))?;
        if zone.trim().is_empty() {
            return Err(FleetError::InvalidConfig(format!(
                "{} の zone が空です",
                generation
            )));
        }

        let cores_per_vm = self.cores_per_vm.ok_or_else(|| missing("cores_per_vm"))?;
        if cores_per_vm == 0 {
            return Err(FleetError::InvalidConfig(format!(
                "{} の cores_per_vm は 1 以上を指定してください",
                generation
            )));
        }

        Ok(FleetSection {
            zone,
            num_vms: self.num_vms.ok_or_else(|| missing("num_vms"))?,
            cores_per_vm,
        })
    }
}

/// general と世代セクションから DesiredFleet を組み立てる
fn assemble(
    general: GeneralSettings,
    sections: Vec<(Generation, PartialSection)>,
) -> Result<DesiredFleet> {
    if general.create_max_attempts == 0 {
        return Err(FleetError::InvalidConfig(
            "create_max_attempts は 1 以上を指定してください".to_string(),
        ));
    }

    let mut fleet = DesiredFleet::new(general);
    for (generation, partial) in sections {
        let section = partial.finish(generation)?;
        fleet.request(generation, &section);
    }
    Ok(fleet)
}

fn to_u32(key: &str, value: i128) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| FleetError::InvalidConfig(format!("{} の値が範囲外です: {}", key, value)))
}
