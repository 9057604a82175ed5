//! tpufleet core
//!
//! 世代ごとの望ましいフリート定義、ノード一覧のパース、不変条件チェック、
//! 不足番号の計算を提供します。I/O を伴う処理は持ちません（設定ファイル読み込みを除く）。

pub mod deficit;
pub mod error;
pub mod inventory;
pub mod invariant;
pub mod model;
pub mod parser;

pub use deficit::missing_indices;
pub use error::{FleetError, Result};
pub use inventory::{name_index, parse_endpoints, parse_listing, sort_by_index};
pub use invariant::{InvariantReport, Violation, ViolationKind, check};
pub use model::*;
pub use parser::{parse_config_file, parse_kdl_string, parse_yaml_string};
