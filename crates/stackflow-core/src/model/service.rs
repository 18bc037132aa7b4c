//! サービス定義

use crate::error::{FlowError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// 環境設定ファイルに書かれたサービスパラメータ（未検証）
///
/// YAML形式：
/// ```yaml
/// orders:
///   ageRestriction: 28
///   version: v2
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceParams {
    /// メッセージの保持日数制限
    #[serde(default)]
    pub age_restriction: Option<i64>,
    /// 固定するイメージタグ（未指定なら latest に追従）
    #[serde(default, deserialize_with = "deserialize_scalar_string")]
    pub version: Option<String>,
    /// 未知のキー（読み込み時に警告）
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_yaml::Value>,
}

impl ServiceParams {
    pub fn new(age_restriction: i64) -> Self {
        Self {
            age_restriction: Some(age_restriction),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// `version: 2` のような整数タグも文字列として受け付ける
///
/// 小数は `1.10` → `1.1` のように元の表記が失われるため拒否する
fn deserialize_scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Str(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Str(s)) => Ok(Some(s)),
        Some(Scalar::Int(i)) => Ok(Some(i.to_string())),
        Some(Scalar::Float(f)) => Err(D::Error::custom(format!(
            "version に小数 {} は指定できません。\"1.10\" のように引用符で囲んでください",
            f
        ))),
        Some(Scalar::Bool(b)) => Ok(Some(b.to_string())),
    }
}

/// 検証済みのサービス定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// サービス名（環境内で一意）
    pub name: String,
    /// メッセージの保持日数制限
    pub age_restriction_days: u32,
    /// 固定されたバージョン
    pub pinned_version: Option<String>,
}

impl ServiceSpec {
    /// 未検証のパラメータから生成
    ///
    /// `ageRestriction` の欠落は [`FlowError::MissingField`]、
    /// 負数や範囲外の値は [`FlowError::InvalidConfig`] になります。
    pub fn from_params(name: impl Into<String>, params: ServiceParams) -> Result<Self> {
        let name = name.into();

        let raw_age = params.age_restriction.ok_or_else(|| FlowError::MissingField {
            service: name.clone(),
            field: "ageRestriction",
        })?;

        let age_restriction_days = u32::try_from(raw_age).map_err(|_| {
            FlowError::InvalidConfig(format!(
                "サービス '{}' の ageRestriction は 0 以上 {} 以下で指定してください: {}",
                name,
                u32::MAX,
                raw_age
            ))
        })?;

        Ok(Self {
            name,
            age_restriction_days,
            pinned_version: params.version,
        })
    }
}
