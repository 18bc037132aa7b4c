//! デプロイ対象の解決結果

use crate::naming::queue_service_stack_id;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 既定のイメージタグ
pub const LATEST_TAG: &str = "latest";

/// サービスが使用するイメージタグ
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageTag(String);

impl ImageTag {
    pub fn latest() -> Self {
        Self(LATEST_TAG.to_string())
    }

    /// 固定バージョンから実際のタグを決定
    ///
    /// 未指定・空文字・`"latest"` はすべて latest 追従として扱う
    pub fn resolve(pinned: Option<&str>) -> Self {
        match pinned.map(str::trim) {
            Some(version) if !version.is_empty() && version != LATEST_TAG => {
                Self(version.to_string())
            }
            _ => Self::latest(),
        }
    }

    pub fn is_latest(&self) -> bool {
        self.0 == LATEST_TAG
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 正規化されたサービス識別子（スタックIDの一部）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceHandle(String);

impl ServiceHandle {
    pub(crate) fn new(identifier: String) -> Self {
        Self(identifier)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// このサービスの QueueService スタックID
    pub fn stack_id(&self) -> String {
        queue_service_stack_id(&self.0)
    }
}

impl fmt::Display for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 解決済みのデプロイ対象
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    pub name: String,
    pub handle: ServiceHandle,
    pub effective_tag: ImageTag,
    pub tracks_latest: bool,
    pub age_restriction_days: u32,
}

impl ResolvedTarget {
    pub fn stack_id(&self) -> String {
        self.handle.stack_id()
    }
}
