use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("YAMLパースエラー: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("サービス名が重複しています: {0}")]
    DuplicateService(String),

    #[error("サービス '{name}' は '{existing}' と同じ識別子 '{identifier}' に正規化されます")]
    IdentifierCollision {
        name: String,
        existing: String,
        identifier: String,
    },

    #[error("サービス名 '{0}' を識別子に変換できません（英数字を含めてください）")]
    InvalidServiceName(String),

    #[error("サービス '{service}' に必須フィールド '{field}' がありません")]
    MissingField { service: String, field: &'static str },

    #[error(
        "プロジェクトルートが見つかりません\n探索開始位置: {0}\nヒント: stackflow.yml または config/ ディレクトリを含むディレクトリで実行してください"
    )]
    ProjectRootNotFound(PathBuf),

    #[error("環境が見つかりません: {name}\n探したファイル: {path}")]
    EnvironmentNotFound { name: String, path: PathBuf },
}

impl FlowError {
    /// 設定内容そのものの誤り（重複・不正な名前・不正な値）かどうか
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            FlowError::DuplicateService(_)
                | FlowError::IdentifierCollision { .. }
                | FlowError::InvalidServiceName(_)
                | FlowError::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
