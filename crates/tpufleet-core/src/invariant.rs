//! フリートの不変条件チェック
//!
//! ソート済みの i 番目（0始まり）のノードは `v{世代}-{i+1}` という名前で、
//! アクセラレータタイプが一致し、READY でなければならない。
//! 条件を満たさないノードは準拠集合から外して報告するだけで、削除や修復はしない。

use crate::model::{DesiredFleetSpec, MemberRecord};
use serde::Serialize;
use std::fmt;

/// 違反の種類
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    WrongAcceleratorType { expected: String, actual: String },
    NotReady { state: String },
    Misnamed { expected: String },
}

/// 1件の違反
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub name: String,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::WrongAcceleratorType { expected, actual } => write!(
                f,
                "{} のアクセラレータタイプが違います: {} (期待値 {})",
                self.name, actual, expected
            ),
            ViolationKind::NotReady { state } => {
                write!(f, "{} は READY ではありません: {}", self.name, state)
            }
            ViolationKind::Misnamed { expected } => write!(
                f,
                "{} の名前が正しくありません (この位置では {} のはず)",
                self.name, expected
            ),
        }
    }
}

/// チェック結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvariantReport {
    pub compliant: Vec<MemberRecord>,
    pub violations: Vec<Violation>,
}

impl InvariantReport {
    pub fn compliant_names(&self) -> Vec<String> {
        self.compliant.iter().map(|r| r.name.clone()).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// ソート済みのノード列を検査する
///
/// 最初の違反で止めず、全ノードの全違反を集める。
pub fn check(records: &[MemberRecord], spec: &DesiredFleetSpec) -> InvariantReport {
    let expected_type = spec.accelerator_type();
    let mut report = InvariantReport::default();

    for (position, record) in records.iter().enumerate() {
        let mut compliant = true;

        if record.accelerator_type != expected_type {
            report.violations.push(Violation {
                name: record.name.clone(),
                kind: ViolationKind::WrongAcceleratorType {
                    expected: expected_type.clone(),
                    actual: record.accelerator_type.clone(),
                },
            });
            compliant = false;
        }

        if !record.state.is_ready() {
            report.violations.push(Violation {
                name: record.name.clone(),
                kind: ViolationKind::NotReady {
                    state: record.state.to_string(),
                },
            });
            compliant = false;
        }

        let expected_name = spec.member_name(position as u32 + 1);
        if record.name != expected_name {
            report.violations.push(Violation {
                name: record.name.clone(),
                kind: ViolationKind::Misnamed {
                    expected: expected_name,
                },
            });
            compliant = false;
        }

        if compliant {
            report.compliant.push(record.clone());
        }
    }

    report
}
