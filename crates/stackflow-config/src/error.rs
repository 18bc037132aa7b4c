use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: stackflow.local.yml, .stackflow.local.yml, stackflow.yml, .stackflow.yml\n\
        - ./.stackflow/ ディレクトリ\n\
        - ~/.config/stackflow/stackflow.yml\n\
        または STACKFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    SettingsFileNotFound,

    #[error("設定ファイルの形式が正しくありません: {path}\n理由: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("YAMLパースエラー: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("設定値 '{0}' が指定されていません")]
    MissingValue(&'static str),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
