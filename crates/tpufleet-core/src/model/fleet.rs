//! 望ましいフリート状態の定義
//!
//! 設定ファイルの `general` セクションと世代ごとのセクションから組み立てる。

use super::Generation;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const DEFAULT_PT_VERSION: &str = "1.13";
pub const DEFAULT_CREATE_MAX_ATTEMPTS: u32 = 20;
pub const DEFAULT_CREATE_RETRY_DELAY_MS: u64 = 1000;

/// 全世代で共有する設定（`general` セクション）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralSettings {
    /// 足りないノードを自動作成するか
    pub create_missing: bool,

    /// PyTorchランタイムのバージョンタグ（例: "1.13"）
    pub pt_version: String,

    /// hostsエントリに付けるドメイン拡張（例: "tpu" -> v2-1.tpu）
    pub extension: String,

    /// gcloud に渡すプロジェクト（省略時は gcloud の既定値）
    pub project: Option<String>,

    /// ノード作成の最大試行回数
    pub create_max_attempts: u32,

    /// ノード作成リトライの間隔（ミリ秒）
    pub create_retry_delay_ms: u64,

    /// hostsファイルのパス（省略時は /etc/hosts）
    pub hosts_file: Option<PathBuf>,

    /// known_hostsファイルのパス（省略時は ~/.ssh/known_hosts）
    pub known_hosts_file: Option<PathBuf>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            create_missing: false,
            pt_version: DEFAULT_PT_VERSION.to_string(),
            extension: String::new(),
            project: None,
            create_max_attempts: DEFAULT_CREATE_MAX_ATTEMPTS,
            create_retry_delay_ms: DEFAULT_CREATE_RETRY_DELAY_MS,
            hosts_file: None,
            known_hosts_file: None,
        }
    }
}

/// 世代ごとのセクション（`v2 { ... }` など）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetSection {
    pub zone: String,
    pub num_vms: u32,
    pub cores_per_vm: u32,
}

/// 1世代分の望ましいフリート
///
/// 1回の調整パスの間は不変。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredFleetSpec {
    pub generation: Generation,
    pub zone: String,
    pub target_count: u32,
    pub cores_per_member: u32,
    pub runtime_version: String,
    pub auto_create_missing: bool,
    pub name_extension: String,
}

impl DesiredFleetSpec {
    pub fn from_section(
        generation: Generation,
        section: &FleetSection,
        general: &GeneralSettings,
    ) -> Self {
        Self {
            generation,
            zone: section.zone.clone(),
            target_count: section.num_vms,
            cores_per_member: section.cores_per_vm,
            runtime_version: general.pt_version.clone(),
            auto_create_missing: general.create_missing,
            name_extension: general.extension.clone(),
        }
    }

    pub fn member_name(&self, index: u32) -> String {
        self.generation.node_name(index)
    }

    pub fn accelerator_type(&self) -> String {
        self.generation.accelerator_type(self.cores_per_member)
    }

    /// 世代に応じた `--version` 文字列
    pub fn runtime_version_tag(&self) -> String {
        self.generation.runtime_version(&self.runtime_version)
    }

    /// hostsに書く完全修飾名
    pub fn qualified_name(&self, short_name: &str) -> String {
        if self.name_extension.is_empty() {
            short_name.to_string()
        } else {
            format!("{}.{}", short_name, self.name_extension)
        }
    }
}

/// 世代ごとの要求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FleetRequest {
    /// 設定にセクションが存在しない
    NotRequested,
    Requested(DesiredFleetSpec),
}

impl FleetRequest {
    pub fn spec(&self) -> Option<&DesiredFleetSpec> {
        match self {
            FleetRequest::NotRequested => None,
            FleetRequest::Requested(spec) => Some(spec),
        }
    }
}

/// 設定ファイル全体から得られる望ましい状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredFleet {
    pub general: GeneralSettings,
    requests: BTreeMap<Generation, FleetRequest>,
}

impl DesiredFleet {
    pub fn new(general: GeneralSettings) -> Self {
        let requests = Generation::ALL
            .iter()
            .map(|g| (*g, FleetRequest::NotRequested))
            .collect();
        Self { general, requests }
    }

    /// 世代のセクションを登録（同じ世代は後勝ち）
    pub fn request(&mut self, generation: Generation, section: &FleetSection) {
        let spec = DesiredFleetSpec::from_section(generation, section, &self.general);
        self.requests.insert(generation, FleetRequest::Requested(spec));
    }

    pub fn get(&self, generation: Generation) -> &FleetRequest {
        self.requests
            .get(&generation)
            .unwrap_or(&FleetRequest::NotRequested)
    }

    pub fn spec(&self, generation: Generation) -> Option<&DesiredFleetSpec> {
        self.get(generation).spec()
    }

    /// 要求された世代を v2 → v3 → v4 の順で返す
    pub fn requested(&self) -> impl Iterator<Item = &DesiredFleetSpec> {
        Generation::ALL
            .into_iter()
            .filter_map(|g| self.spec(g))
    }

    pub fn is_empty(&self) -> bool {
        self.requested().next().is_none()
    }
}
