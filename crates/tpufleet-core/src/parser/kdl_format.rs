//! KDL形式の設定
//!
//! ```kdl
//! general {
//!     create_missing #true
//!     pt_version "1.13"
//!     extension "tpu"
//! }
//! v2 {
//!     zone "us-central1-f"
//!     num_vms 4
//!     cores_per_vm 8
//! }
//! ```

use super::{PartialSection, assemble, is_generation_key, to_u32};
use crate::error::{FleetError, Result};
use crate::model::{DesiredFleet, GeneralSettings, Generation};
use kdl::{KdlDocument, KdlNode};
use std::path::PathBuf;

/// KDL文字列をパース
pub fn parse_kdl_string(content: &str) -> Result<DesiredFleet> {
    let doc: KdlDocument = content.parse()?;

    let mut general = GeneralSettings::default();
    let mut sections = Vec::new();

    for node in doc.nodes() {
        match node.name().value() {
            "general" => parse_general(node, &mut general)?,
            key if is_generation_key(key) => {
                let generation: Generation = key.parse()?;
                sections.push((generation, parse_section(node)?));
            }
            other => {
                tracing::debug!("Skipping unknown node: {}", other);
            }
        }
    }

    assemble(general, sections)
}

fn parse_general(node: &KdlNode, general: &mut GeneralSettings) -> Result<()> {
    let Some(children) = node.children() else {
        return Ok(());
    };

    for child in children.nodes() {
        let key = child.name().value();
        match key {
            "create_missing" | "create-missing" => {
                general.create_missing = first_bool(child)
                    .ok_or_else(|| expected(key, "真偽値 (#true / #false)"))?;
            }
            "pt_version" | "pt-version" => {
                general.pt_version =
                    first_scalar(child).ok_or_else(|| expected(key, "文字列または数値"))?;
            }
            "extension" => {
                general.extension = first_string(child).ok_or_else(|| expected(key, "文字列"))?;
            }
            "project" => {
                general.project = first_string(child);
            }
            "create_max_attempts" | "create-max-attempts" => {
                let value = first_integer(child).ok_or_else(|| expected(key, "整数"))?;
                general.create_max_attempts = to_u32(key, value)?;
            }
            "create_retry_delay_ms" | "create-retry-delay-ms" => {
                let value = first_integer(child).ok_or_else(|| expected(key, "整数"))?;
                general.create_retry_delay_ms = u64::try_from(value).map_err(|_| {
                    FleetError::InvalidConfig(format!("{} の値が範囲外です: {}", key, value))
                })?;
            }
            "hosts_file" | "hosts-file" => {
                general.hosts_file = first_string(child).map(PathBuf::from);
            }
            "known_hosts_file" | "known-hosts-file" => {
                general.known_hosts_file = first_string(child).map(PathBuf::from);
            }
            other => {
                tracing::debug!("Skipping unknown general setting: {}", other);
            }
        }
    }

    Ok(())
}

fn parse_section(node: &KdlNode) -> Result<PartialSection> {
    let mut section = PartialSection::default();
    let Some(children) = node.children() else {
        return Ok(section);
    };

    for child in children.nodes() {
        let key = child.name().value();
        match key {
            "zone" => {
                section.zone = Some(first_string(child).ok_or_else(|| expected(key, "文字列"))?);
            }
            "num_vms" | "num-vms" => {
                let value = first_integer(child).ok_or_else(|| expected(key, "整数"))?;
                section.num_vms = Some(to_u32(key, value)?);
            }
            "cores_per_vm" | "cores-per-vm" => {
                let value = first_integer(child).ok_or_else(|| expected(key, "整数"))?;
                section.cores_per_vm = Some(to_u32(key, value)?);
            }
            other => {
                tracing::debug!("Skipping unknown fleet setting: {}", other);
            }
        }
    }

    Ok(section)
}

fn expected(key: &str, kind: &str) -> FleetError {
    FleetError::InvalidConfig(format!("{} には{}を指定してください", key, kind))
}

fn first_string(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn first_integer(node: &KdlNode) -> Option<i128> {
    node.entries().first().and_then(|e| e.value().as_integer())
}

fn first_bool(node: &KdlNode) -> Option<bool> {
    node.entries().first().and_then(|e| e.value().as_bool())
}

/// 文字列・整数・小数のいずれかを文字列として取り出す
///
/// 数値は書かれたままの表記を使う（`2.0` は `2.0` のまま）。
fn first_scalar(node: &KdlNode) -> Option<String> {
    let entry = node.entries().first()?;
    let value = entry.value();
    if let Some(s) = value.as_string() {
        return Some(s.to_string());
    }
    if value.as_integer().is_none() && value.as_float().is_none() {
        return None;
    }

    let written = entry
        .format()
        .map(|f| f.value_repr.trim())
        .filter(|repr| !repr.is_empty());
    if let Some(repr) = written {
        return Some(repr.to_string());
    }
    match (value.as_integer(), value.as_float()) {
        (Some(i), _) => Some(i.to_string()),
        (_, Some(f)) => Some(format!("{:?}", f)),
        _ => None,
    }
}
