//! デプロイ対象の解決
//!
//! 環境内の各サービスについてイメージタグを決定し、
//! latest に追従する対象と固定された対象に分割します。

use crate::error::{FlowError, Result};
use crate::model::{ImageTag, Resolution, ResolvedTarget, ServiceHandle, ServiceParams, ServiceSpec};
use crate::naming::normalize_identifier;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// サービス定義の列を解決
///
/// 入力の順序は [`Resolution::targets`] に保持されます。
/// 名前の重複や正規化後の識別子の衝突は即座にエラーとなり、部分的な結果は返しません。
#[instrument(skip(entries))]
pub fn resolve<I>(entries: I) -> Result<Resolution>
where
    I: IntoIterator<Item = (String, ServiceParams)>,
{
    let mut targets = Vec::new();
    // 識別子 → 元のサービス名
    let mut seen: HashMap<String, String> = HashMap::new();

    for (name, params) in entries {
        let spec = ServiceSpec::from_params(name, params)?;
        let target = resolve_one(&spec)?;

        if let Some(existing) = seen.get(target.handle.as_str()) {
            if *existing == spec.name {
                return Err(FlowError::DuplicateService(spec.name));
            }
            return Err(FlowError::IdentifierCollision {
                name: spec.name,
                existing: existing.clone(),
                identifier: target.handle.to_string(),
            });
        }
        seen.insert(target.handle.to_string(), spec.name.clone());

        debug!(
            service = %target.name,
            tag = %target.effective_tag,
            tracks_latest = target.tracks_latest,
            "Resolved service"
        );
        targets.push(target);
    }

    let resolution = Resolution::from_targets(targets);
    info!(
        deployable = resolution.deployable().len(),
        frozen = resolution.frozen().len(),
        "Resolution complete"
    );
    Ok(resolution)
}

/// 検証済みのサービス定義から単一の対象を解決
pub fn resolve_one(spec: &ServiceSpec) -> Result<ResolvedTarget> {
    let handle = ServiceHandle::new(normalize_identifier(&spec.name)?);
    let effective_tag = ImageTag::resolve(spec.pinned_version.as_deref());
    let tracks_latest = effective_tag.is_latest();

    Ok(ResolvedTarget {
        name: spec.name.clone(),
        handle,
        effective_tag,
        tracks_latest,
        age_restriction_days: spec.age_restriction_days,
    })
}
