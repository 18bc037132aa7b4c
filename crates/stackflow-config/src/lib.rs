pub mod error;
pub mod settings;

pub use error::*;
pub use settings::Settings;

use std::path::{Path, PathBuf};

const SETTINGS_CANDIDATES: [&str; 4] = [
    "stackflow.local.yml",
    ".stackflow.local.yml",
    "stackflow.yml",
    ".stackflow.yml",
];

/// StackFlowの設定ディレクトリ（~/.config/stackflow）
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("stackflow"))
}

/// ディレクトリ直下と `.stackflow/` 内から設定ファイルを探す
fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    let stackflow_dir = dir.join(".stackflow");
    SETTINGS_CANDIDATES
        .iter()
        .map(|filename| dir.join(filename))
        .chain(
            SETTINGS_CANDIDATES
                .iter()
                .map(|filename| stackflow_dir.join(filename)),
        )
        .find(|path| path.is_file())
}

fn search_settings_file(project_root: Option<&Path>) -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var("STACKFLOW_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    // 2. カレントディレクトリ（./.stackflow/ を含む）
    let current_dir = std::env::current_dir()?;
    if let Some(path) = find_in_dir(&current_dir) {
        return Ok(path);
    }

    // 3. プロジェクトルート（.stackflow/ を含む）
    if let Some(root) = project_root.filter(|root| *root != current_dir) {
        if let Some(path) = find_in_dir(root) {
            return Ok(path);
        }
    }

    // 4. グローバル設定ファイル
    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("stackflow.yml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::SettingsFileNotFound)
}

/// 設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 STACKFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: stackflow.local.yml, .stackflow.local.yml, stackflow.yml, .stackflow.yml
/// 3. ./.stackflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/stackflow/stackflow.yml (グローバル設定)
pub fn find_settings_file() -> Result<PathBuf> {
    search_settings_file(None)
}

/// プロジェクトの設定ファイルを探す
///
/// [`find_settings_file`] の順序に加え、グローバル設定より前に
/// プロジェクトルートとその `.stackflow/` を検索します。
/// サブディレクトリから実行してもルートの stackflow.yml が使われます。
pub fn find_project_settings_file(project_root: &Path) -> Result<PathBuf> {
    search_settings_file(Some(project_root))
}

fn load_found(found: Result<PathBuf>) -> Result<Settings> {
    match found {
        Ok(path) => Settings::load(&path),
        Err(ConfigError::SettingsFileNotFound) => {
            tracing::debug!("No settings file found, using defaults");
            Ok(Settings::default())
        }
        Err(e) => Err(e),
    }
}

/// 設定ファイルを読み込む（見つからなければデフォルト値）
pub fn load_settings() -> Result<Settings> {
    load_found(find_settings_file())
}

/// プロジェクトの設定ファイルを読み込む（見つからなければデフォルト値）
pub fn load_project_settings(project_root: &Path) -> Result<Settings> {
    load_found(find_project_settings_file(project_root))
}
