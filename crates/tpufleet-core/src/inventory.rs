//! ノード一覧のパース
//!
//! gcloud の表形式出力を `MemberRecord` に変換し、名前末尾の番号順に並べる。
//! YAML形式の出力からは外部IPを取り出す。

use crate::error::{FleetError, Result};
use crate::model::{MemberRecord, MemberState, NodeEndpoint};
use serde::Deserialize;

/// ヘッダー行の先頭カラム名
const HEADER_SENTINEL: &str = "NAME";

/// 表形式出力のカラム位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    name: usize,
    accelerator_type: usize,
    state: usize,
}

impl Columns {
    /// ヘッダーが無い場合の位置（NAME ZONE ACCELERATOR_TYPE NETWORK RANGE STATUS）
    const POSITIONAL: Columns = Columns {
        name: 0,
        accelerator_type: 2,
        state: 5,
    };

    fn from_header(header: &[&str]) -> Result<Self> {
        let find = |candidates: &[&str]| {
            header
                .iter()
                .position(|col| candidates.contains(col))
                .ok_or_else(|| {
                    FleetError::MalformedListing(format!(
                        "ヘッダーに {} がありません: {}",
                        candidates.join("/"),
                        header.join(" ")
                    ))
                })
        };

        Ok(Self {
            name: find(&[HEADER_SENTINEL])?,
            accelerator_type: find(&["ACCELERATOR_TYPE"])?,
            state: find(&["STATUS", "STATE"])?,
        })
    }

    fn width(&self) -> usize {
        self.name.max(self.accelerator_type).max(self.state) + 1
    }
}

/// 表形式の一覧をパースして番号順に並べる
///
/// 名前の末尾が整数でないノードが1つでもあればエラー（番号計算ができないため）。
pub fn parse_listing(output: &str, zone: &str) -> Result<Vec<MemberRecord>> {
    let mut columns = Columns::POSITIONAL;
    let mut records = Vec::new();

    for line in output.lines() {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.is_empty() {
            continue;
        }
        if cols[0] == HEADER_SENTINEL {
            columns = Columns::from_header(&cols)?;
            continue;
        }
        if cols.len() < columns.width() {
            return Err(FleetError::MalformedListing(format!(
                "カラムが足りません: {}",
                line.trim()
            )));
        }

        records.push(MemberRecord::new(
            cols[columns.name],
            cols[columns.accelerator_type],
            MemberState::parse(cols[columns.state]),
            zone,
        ));
    }

    tracing::debug!("Parsed {} nodes in {}", records.len(), zone);
    sort_by_index(records)
}

/// ノード名の最後の `-` 以降を番号として取り出す
pub fn name_index(name: &str) -> Result<u32> {
    name.rsplit_once('-')
        .and_then(|(_, suffix)| suffix.parse::<u32>().ok())
        .ok_or_else(|| FleetError::MalformedName(name.to_string()))
}

/// 名前末尾の番号で昇順ソート
pub fn sort_by_index(records: Vec<MemberRecord>) -> Result<Vec<MemberRecord>> {
    let mut keyed = records
        .into_iter()
        .map(|record| Ok((name_index(&record.name)?, record)))
        .collect::<Result<Vec<_>>>()?;

    keyed.sort_by_key(|(index, _)| *index);
    Ok(keyed.into_iter().map(|(_, record)| record).collect())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeDescription {
    name: String,
    #[serde(default)]
    network_endpoints: Vec<NetworkEndpoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkEndpoint {
    #[serde(default)]
    access_config: Option<AccessConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessConfig {
    #[serde(default)]
    external_ip: Option<String>,
}

/// `--format=yaml` の出力（`---` 区切りのドキュメント列）から外部IPを取り出す
///
/// `name` はリソースパス（`projects/.../nodes/v2-1`）の場合があるので末尾だけ使う。
pub fn parse_endpoints(output: &str) -> Result<Vec<NodeEndpoint>> {
    let mut endpoints = Vec::new();

    for document in serde_yaml::Deserializer::from_str(output) {
        // 空のドキュメント（末尾の `---` など）は読み飛ばす
        let Some(node) = Option::<NodeDescription>::deserialize(document)? else {
            continue;
        };
        let name = node
            .name
            .rsplit('/')
            .next()
            .unwrap_or(node.name.as_str())
            .to_string();
        let external_ip = node
            .network_endpoints
            .first()
            .and_then(|ep| ep.access_config.as_ref())
            .and_then(|ac| ac.external_ip.clone());

        endpoints.push(NodeEndpoint { name, external_ip });
    }

    Ok(endpoints)
}
