//! 環境設定ローダー
//!
//! `config/{environment}.yml` を読み込み、サービス定義の列を生成します。

use crate::discovery::environment_file;
use crate::error::{FlowError, Result};
use crate::model::{Resolution, ServiceParams};
use crate::resolver::resolve;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// 環境設定ドキュメント
///
/// YAMLのキー順を保持し、重複キーも上書きせずそのまま残します。
/// 重複の検出は [`resolve`] が行います。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentDocument {
    pub entries: Vec<(String, ServiceParams)>,
}

impl EnvironmentDocument {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// デプロイ対象を解決
    pub fn resolve(&self) -> Result<Resolution> {
        resolve(self.entries.iter().cloned())
    }
}

impl<'de> Deserialize<'de> for EnvironmentDocument {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = EnvironmentDocument;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of service name to service parameters")
            }

            fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(EnvironmentDocument::default())
            }

            fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(EnvironmentDocument::default())
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, params)) = map.next_entry::<String, Option<ServiceParams>>()? {
                    entries.push((name, params.unwrap_or_default()));
                }
                Ok(EnvironmentDocument { entries })
            }
        }

        deserializer.deserialize_any(EntriesVisitor)
    }
}

/// YAML文字列から環境設定をパース
pub fn parse_environment_str(content: &str) -> Result<EnvironmentDocument> {
    if content.trim().is_empty() {
        return Ok(EnvironmentDocument::default());
    }

    let document: EnvironmentDocument = serde_yaml::from_str(content)?;
    for (name, params) in &document.entries {
        for key in params.unknown.keys() {
            warn!(service = %name, key = %key, "Ignoring unknown service parameter");
        }
    }
    Ok(document)
}

/// プロジェクトルートから指定環境の設定を読み込む
#[instrument(skip(project_root), fields(project_root = %project_root.display()))]
pub fn load_environment(project_root: &Path, environment: &str) -> Result<EnvironmentDocument> {
    let path = environment_file(project_root, environment).ok_or_else(|| {
        FlowError::EnvironmentNotFound {
            name: environment.to_string(),
            path: project_root.join("config").join(format!("{}.yml", environment)),
        }
    })?;

    debug!(file = %path.display(), "Reading environment file");
    let content = std::fs::read_to_string(&path).map_err(|e| FlowError::IoError {
        path: path.clone(),
        message: e.to_string(),
    })?;

    let document = parse_environment_str(&content)?;
    info!(services = document.len(), "Environment loaded");
    Ok(document)
}
