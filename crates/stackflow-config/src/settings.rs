//! アプリケーション設定
//!
//! アカウント・リージョン・リポジトリ名など、スタック全体で共有する値。
//! プロセスの環境変数は読まず、呼び出し側から明示的に渡します。

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// スタック全体で共有する設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// デプロイ先AWSアカウント
    pub account: Option<String>,
    /// デプロイ先リージョン
    pub region: Option<String>,
    /// アーティファクト用S3バケット（省略時は `artifacts-{account}-{region}`）
    pub artifact_bucket: Option<String>,
    /// Dockerイメージのソースリポジトリ
    pub docker_repository: String,
    /// インフラ定義のソースリポジトリ
    pub cdk_repository: String,
    /// GitHubのオーナー
    pub owner: String,
    /// GitHubトークンを保持するシークレット名
    pub github_token_parameter: String,
    pub docker_branch: String,
    pub cdk_branch: String,
    /// 全スタック共通のタグ
    pub tags: BTreeMap<String, String>,
    /// 既存VPCのID
    pub vpc: Option<String>,
    pub subnets: Vec<String>,
    pub availability_zones: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut tags = BTreeMap::new();
        tags.insert("Owner".to_string(), "antoine".to_string());
        tags.insert("Project".to_string(), "CICD".to_string());

        Self {
            account: None,
            region: None,
            artifact_bucket: None,
            docker_repository: "aws-cicd-docker".to_string(),
            cdk_repository: "aws-cicd-cdk".to_string(),
            owner: "avanderm".to_string(),
            github_token_parameter: "dud".to_string(),
            docker_branch: "master".to_string(),
            cdk_branch: "master".to_string(),
            tags,
            vpc: None,
            subnets: Vec::new(),
            availability_zones: Vec::new(),
        }
    }
}

impl Settings {
    /// YAMLファイルから読み込む
    pub fn load(path: &Path) -> Result<Self> {
        debug!(file = %path.display(), "Loading settings");
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// コマンドラインで指定された値で上書き
    pub fn with_overrides(mut self, account: Option<String>, region: Option<String>) -> Self {
        if account.is_some() {
            self.account = account;
        }
        if region.is_some() {
            self.region = region;
        }
        self
    }

    /// アーティファクトバケット名
    pub fn artifact_bucket_name(&self) -> Result<String> {
        if let Some(bucket) = &self.artifact_bucket {
            return Ok(bucket.clone());
        }
        let account = self
            .account
            .as_deref()
            .ok_or(ConfigError::MissingValue("account"))?;
        let region = self
            .region
            .as_deref()
            .ok_or(ConfigError::MissingValue("region"))?;
        Ok(format!("artifacts-{}-{}", account, region))
    }

    /// 環境名を加えたタグ
    pub fn tags_for(&self, environment: &str) -> BTreeMap<String, String> {
        let mut tags = self.tags.clone();
        tags.insert("Environment".to_string(), environment.to_string());
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.docker_repository, "aws-cicd-docker");
        assert_eq!(settings.cdk_repository, "aws-cicd-cdk");
        assert_eq!(settings.docker_branch, "master");
        assert_eq!(settings.tags.get("Project").map(String::as_str), Some("CICD"));
    }

    #[test]
    fn test_from_yaml_partial() {
        let yaml = r#"
account: "123456789012"
region: eu-west-1
dockerRepository: queue-workers
subnets:
  - subnet-a
  - subnet-b
"#;
        let settings = Settings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.account.as_deref(), Some("123456789012"));
        assert_eq!(settings.docker_repository, "queue-workers");
        // 未指定の値はデフォルト
        assert_eq!(settings.cdk_repository, "aws-cicd-cdk");
        assert_eq!(settings.subnets, vec!["subnet-a", "subnet-b"]);
    }

    #[test]
    fn test_from_yaml_empty() {
        assert_eq!(Settings::from_yaml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn test_artifact_bucket_default_name() {
        let settings = Settings::default()
            .with_overrides(Some("123".to_string()), Some("eu-west-1".to_string()));
        assert_eq!(settings.artifact_bucket_name().unwrap(), "artifacts-123-eu-west-1");
    }

    #[test]
    fn test_artifact_bucket_explicit() {
        let settings = Settings {
            artifact_bucket: Some("my-bucket".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.artifact_bucket_name().unwrap(), "my-bucket");
    }

    #[test]
    fn test_artifact_bucket_missing_region() {
        let settings = Settings::default().with_overrides(Some("123".to_string()), None);
        assert!(matches!(
            settings.artifact_bucket_name(),
            Err(ConfigError::MissingValue("region"))
        ));
    }

    #[test]
    fn test_overrides_keep_existing_when_none() {
        let settings = Settings {
            region: Some("us-east-1".to_string()),
            ..Default::default()
        }
        .with_overrides(None, None);
        assert_eq!(settings.region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn test_tags_for_environment() {
        let tags = Settings::default().tags_for("prod");
        assert_eq!(tags.get("Environment").map(String::as_str), Some("prod"));
        assert_eq!(tags.get("Owner").map(String::as_str), Some("antoine"));
    }

    #[test]
    fn test_load_invalid_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("stackflow.yml");
        std::fs::write(&path, "tags: [not, a, map]\n").unwrap();

        assert!(matches!(Settings::load(&path), Err(ConfigError::Parse { .. })));
    }
}
