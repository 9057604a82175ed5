//! 観測されたノードのモデル
//!
//! 一覧取得のたびに新しく作られ、永続化はしない。

use serde::Serialize;
use std::fmt;

/// ノードの状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MemberState {
    Ready,
    Creating,
    /// READY/CREATING 以外（gcloud の表記をそのまま保持）
    Other(String),
}

impl MemberState {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "READY" => MemberState::Ready,
            "CREATING" => MemberState::Creating,
            other => MemberState::Other(other.to_string()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, MemberState::Ready)
    }
}

impl fmt::Display for MemberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberState::Ready => write!(f, "READY"),
            MemberState::Creating => write!(f, "CREATING"),
            MemberState::Other(s) => write!(f, "{}", s),
        }
    }
}

/// 1台のノード
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRecord {
    pub name: String,
    pub accelerator_type: String,
    pub state: MemberState,
    pub zone: String,
}

impl MemberRecord {
    pub fn new(
        name: impl Into<String>,
        accelerator_type: impl Into<String>,
        state: MemberState,
        zone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            accelerator_type: accelerator_type.into(),
            state,
            zone: zone.into(),
        }
    }
}

/// 構造化一覧から得たノードの到達先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEndpoint {
    pub name: String,
    pub external_ip: Option<String>,
}

/// hostsファイルの1エントリ（短縮名 → 外部IP）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostEntry {
    pub short_name: String,
    pub external_ip: String,
}

impl HostEntry {
    pub fn new(short_name: impl Into<String>, external_ip: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            external_ip: external_ip.into(),
        }
    }

    /// `{ip} {qualified_name}` 形式の行
    pub fn line(&self, qualified_name: &str) -> String {
        format!("{} {}", self.external_ip, qualified_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parse() {
        assert_eq!(MemberState::parse("READY"), MemberState::Ready);
        assert_eq!(MemberState::parse("CREATING"), MemberState::Creating);
        assert_eq!(
            MemberState::parse("PREEMPTED"),
            MemberState::Other("PREEMPTED".to_string())
        );
        assert!(!MemberState::parse("ready").is_ready());
    }

    #[test]
    fn test_host_entry_line() {
        let entry = HostEntry::new("v2-1", "34.1.2.3");
        assert_eq!(entry.line("v2-1.tpu"), "34.1.2.3 v2-1.tpu");
    }
}
