//! YAML形式の設定（hydra の tpus.yaml と同じ構造）
//!
//! ```yaml
//! general:
//!   create_missing: true
//!   pt_version: "1.13"
//!   extension: tpu
//! v2:
//!   zone: us-central1-f
//!   num_vms: 4
//!   cores_per_vm: 8
//! ```

use super::{PartialSection, assemble, is_generation_key};
use crate::error::{FleetError, Result};
use crate::model::{DesiredFleet, GeneralSettings, Generation};
use serde::Deserialize;
use serde_yaml::Value;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGeneral {
    create_missing: Option<bool>,
    pt_version: Option<Value>,
    extension: Option<String>,
    project: Option<String>,
    create_max_attempts: Option<u32>,
    create_retry_delay_ms: Option<u64>,
    hosts_file: Option<PathBuf>,
    known_hosts_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSection {
    zone: Option<String>,
    num_vms: Option<u32>,
    cores_per_vm: Option<u32>,
}

/// YAML文字列をパース
pub fn parse_yaml_string(content: &str) -> Result<DesiredFleet> {
    let root: Value = serde_yaml::from_str(content)?;
    let mapping = match root {
        Value::Mapping(mapping) => mapping,
        Value::Null => Default::default(),
        _ => {
            return Err(FleetError::InvalidConfig(
                "設定のトップレベルはマッピングである必要があります".to_string(),
            ));
        }
    };

    let mut general = GeneralSettings::default();
    let mut sections = Vec::new();

    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            continue;
        };
        match key {
            "general" => {
                let raw: RawGeneral = serde_yaml::from_value(value)?;
                apply_general(raw, &mut general)?;
            }
            key if is_generation_key(key) => {
                let generation: Generation = key.parse()?;
                let raw: RawSection = serde_yaml::from_value(value)?;
                sections.push((
                    generation,
                    PartialSection {
                        zone: raw.zone,
                        num_vms: raw.num_vms,
                        cores_per_vm: raw.cores_per_vm,
                    },
                ));
            }
            other => {
                tracing::debug!("Skipping unknown section: {}", other);
            }
        }
    }

    // v2 → v3 → v4 の順に揃える（YAMLのキー順に依存しない）
    sections.sort_by_key(|(generation, _)| *generation);
    assemble(general, sections)
}

fn apply_general(raw: RawGeneral, general: &mut GeneralSettings) -> Result<()> {
    if let Some(create_missing) = raw.create_missing {
        general.create_missing = create_missing;
    }
    if let Some(pt_version) = raw.pt_version {
        general.pt_version = match pt_version {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            other => {
                return Err(FleetError::InvalidConfig(format!(
                    "pt_version には文字列または数値を指定してください: {:?}",
                    other
                )));
            }
        };
    }
    if let Some(extension) = raw.extension {
        general.extension = extension;
    }
    general.project = raw.project;
    if let Some(attempts) = raw.create_max_attempts {
        general.create_max_attempts = attempts;
    }
    if let Some(delay) = raw.create_retry_delay_ms {
        general.create_retry_delay_ms = delay;
    }
    general.hosts_file = raw.hosts_file;
    general.known_hosts_file = raw.known_hosts_file;
    Ok(())
}
