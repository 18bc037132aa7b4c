//! 解決結果の集合

use super::target::ResolvedTarget;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// サービス名をキーとするデプロイ対象の集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetSet {
    targets: BTreeMap<String, ResolvedTarget>,
}

/// latest に追従し、デプロイパイプラインが自動で更新する対象
pub type DeploymentTargetSet = TargetSet;

/// バージョン固定され、デプロイパイプラインの管理外となる対象
pub type FrozenSet = TargetSet;

impl TargetSet {
    pub(crate) fn insert(&mut self, target: ResolvedTarget) {
        self.targets.insert(target.name.clone(), target);
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedTarget> {
        self.targets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// 名前順に走査
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedTarget> {
        self.targets.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }
}

/// プロビジョニング順序の制約（dependent は dependency の後に作成する）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderingConstraint {
    pub dependent: String,
    pub dependency: String,
}

/// 環境全体の解決結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    targets: Vec<ResolvedTarget>,
    deployable: DeploymentTargetSet,
    frozen: FrozenSet,
}

impl Resolution {
    pub(crate) fn from_targets(targets: Vec<ResolvedTarget>) -> Self {
        let mut deployable = TargetSet::default();
        let mut frozen = TargetSet::default();
        for target in &targets {
            if target.tracks_latest {
                deployable.insert(target.clone());
            } else {
                frozen.insert(target.clone());
            }
        }
        Self {
            targets,
            deployable,
            frozen,
        }
    }

    /// 全対象（入力順）
    pub fn targets(&self) -> &[ResolvedTarget] {
        &self.targets
    }

    pub fn deployable(&self) -> &DeploymentTargetSet {
        &self.deployable
    }

    pub fn frozen(&self) -> &FrozenSet {
        &self.frozen
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedTarget> {
        self.deployable.get(name).or_else(|| self.frozen.get(name))
    }

    /// 固定スタックをデプロイパイプラインの後に作成するための制約
    ///
    /// パイプラインが固定スタックを参照すると循環参照になるため、
    /// 依存の向きを逆にして固定スタック側からパイプラインに依存させる。
    pub fn ordering_constraints(&self, pipeline_id: &str) -> Vec<OrderingConstraint> {
        self.frozen
            .iter()
            .map(|target| OrderingConstraint {
                dependent: target.stack_id(),
                dependency: pipeline_id.to_string(),
            })
            .collect()
    }
}
