//! StackFlow Core
//!
//! 環境ごとのサービス定義を読み込み、latest に追従してパイプラインから
//! 自動デプロイされるサービスと、バージョン固定されたサービスに分割します。

pub mod discovery;
pub mod error;
pub mod loader;
pub mod model;
pub mod naming;
pub mod resolver;

pub use discovery::{
    environment_file, find_project_root, find_project_root_from, list_environments,
};
pub use error::{FlowError, Result};
pub use loader::{EnvironmentDocument, load_environment, parse_environment_str};
pub use model::*;
pub use resolver::{resolve, resolve_one};
