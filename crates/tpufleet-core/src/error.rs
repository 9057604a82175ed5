use thiserror::Error;

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("YAMLパースエラー: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("未知の世代です: {0} (v2, v3, v4 のいずれかを指定してください)")]
    UnknownGeneration(String),

    #[error("ノード名が v<世代>-<番号> 形式ではありません: {0}")]
    MalformedName(String),

    #[error("一覧の形式が不正です: {0}")]
    MalformedListing(String),
}

pub type Result<T> = std::result::Result<T, FleetError>;
