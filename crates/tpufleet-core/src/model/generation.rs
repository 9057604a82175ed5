//! TPU世代
//!
//! 世代ごとに命名規則・アクセラレータタイプ・ランタイムバージョンの書式が決まる。

use crate::error::{FleetError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// TPUのハードウェア世代
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    V2,
    V3,
    V4,
}

impl Generation {
    /// 処理順（v2 → v3 → v4）
    pub const ALL: [Generation; 3] = [Generation::V2, Generation::V3, Generation::V4];

    pub fn number(self) -> u32 {
        match self {
            Generation::V2 => 2,
            Generation::V3 => 3,
            Generation::V4 => 4,
        }
    }

    /// 設定ファイル上のセクション名（"v2" など）
    pub fn key(self) -> &'static str {
        match self {
            Generation::V2 => "v2",
            Generation::V3 => "v3",
            Generation::V4 => "v4",
        }
    }

    /// `v{世代}-{番号}` 形式のノード名
    pub fn node_name(self, index: u32) -> String {
        format!("{}-{}", self.key(), index)
    }

    /// `v{世代}-{コア数}` 形式のアクセラレータタイプ
    pub fn accelerator_type(self, cores: u32) -> String {
        format!("{}-{}", self.key(), cores)
    }

    /// gcloud の `--version` に渡すランタイムバージョン
    ///
    /// v4 だけ `tpu-vm-v4-pt-` という別プレフィックスを使う。
    pub fn runtime_version(self, pt_version: &str) -> String {
        match self {
            Generation::V4 => format!("tpu-vm-v4-pt-{}", pt_version),
            Generation::V2 | Generation::V3 => format!("tpu-vm-pt-{}", pt_version),
        }
    }

    /// このノード名がこの世代の命名空間 (`v{世代}-`) に属するか
    pub fn owns(self, name: &str) -> bool {
        name.strip_prefix(self.key())
            .is_some_and(|rest| rest.starts_with('-'))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Generation {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let digits = normalized.strip_prefix('v').unwrap_or(&normalized);
        match digits {
            "2" => Ok(Generation::V2),
            "3" => Ok(Generation::V3),
            "4" => Ok(Generation::V4),
            _ => Err(FleetError::UnknownGeneration(s.to_string())),
        }
    }
}
