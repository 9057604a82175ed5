use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: tpufleet.local.kdl, tpufleet.kdl, tpus.yaml, tpus.yml\n\
        - ./config/ ディレクトリ\n\
        - ~/.config/tpufleet/tpufleet.kdl\n\
        または TPUFLEET_CONFIG 環境変数か --config で直接指定できます"
    )]
    ConfigFileNotFound,

    #[error("指定された設定ファイルが存在しません: {0}")]
    ExplicitPathNotFound(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
