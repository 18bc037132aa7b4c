//! プロジェクト・環境ファイルの発見
//!
//! 規約ベースのディレクトリ構造から環境設定ファイルを探します。
//!
//! ```text
//! project/
//! ├── stackflow.yml        # アプリケーション設定（任意）
//! └── config/
//!     ├── test.yml         # 環境ごとのサービス定義
//!     └── prod.yml
//! ```

use crate::error::{FlowError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 環境設定ファイルを置くディレクトリ
pub const CONFIG_DIR: &str = "config";

const ROOT_MARKERS: [&str; 2] = ["stackflow.yml", ".stackflow/stackflow.yml"];
const ENVIRONMENT_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

fn is_project_root(dir: &Path) -> bool {
    ROOT_MARKERS.iter().any(|marker| dir.join(marker).exists()) || dir.join(CONFIG_DIR).is_dir()
}

/// プロジェクトルートを検出
///
/// 以下の優先順位で検索:
/// 1. 環境変数 STACKFLOW_PROJECT_ROOT
/// 2. カレントディレクトリから上に向かって以下を探す:
///    - stackflow.yml
///    - .stackflow/stackflow.yml
///    - config/ ディレクトリ
#[tracing::instrument]
pub fn find_project_root() -> Result<PathBuf> {
    // 1. 環境変数
    if let Ok(root) = std::env::var("STACKFLOW_PROJECT_ROOT") {
        let path = PathBuf::from(&root);
        debug!(env_root = %root, "Checking STACKFLOW_PROJECT_ROOT");
        if is_project_root(&path) {
            info!(project_root = %path.display(), "Found project root from environment variable");
            return Ok(path);
        }
    }

    // 2. カレントディレクトリから上に向かって探す
    let start_dir = std::env::current_dir()?;
    find_project_root_from(&start_dir)
}

/// 指定ディレクトリから上に向かってプロジェクトルートを探す
pub fn find_project_root_from(start_dir: &Path) -> Result<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        debug!(checking = %current.display(), "Looking for project root");
        if is_project_root(&current) {
            info!(project_root = %current.display(), "Found project root");
            return Ok(current);
        }

        if !current.pop() {
            break;
        }
    }

    warn!(start_dir = %start_dir.display(), "Project root not found");
    Err(FlowError::ProjectRootNotFound(start_dir.to_path_buf()))
}

/// 指定環境の設定ファイル（`config/{environment}.yml` または `.yaml`）
pub fn environment_file(project_root: &Path, environment: &str) -> Option<PathBuf> {
    let config_dir = project_root.join(CONFIG_DIR);
    ENVIRONMENT_EXTENSIONS
        .iter()
        .map(|ext| config_dir.join(format!("{}.{}", environment, ext)))
        .find(|path| path.is_file())
}

/// 定義されている環境名の一覧（名前順）
pub fn list_environments(project_root: &Path) -> Result<Vec<String>> {
    let config_dir = project_root.join(CONFIG_DIR);
    if !config_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut environments = Vec::new();
    for entry in std::fs::read_dir(&config_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ENVIRONMENT_EXTENSIONS.contains(&ext));
        if let (true, Some(stem)) = (is_yaml, path.file_stem().and_then(|s| s.to_str())) {
            environments.push(stem.to_string());
        }
    }

    environments.sort();
    environments.dedup();
    debug!(count = environments.len(), "Discovered environments");
    Ok(environments)
}
