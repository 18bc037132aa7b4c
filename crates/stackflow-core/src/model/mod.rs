//! モデル定義
//!
//! 環境設定から読み込むサービス定義と、その解決結果を定義します。

mod resolution;
mod service;
mod target;

// Re-exports
pub use resolution::*;
pub use service::*;
pub use target::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowError;

    #[test]
    fn test_image_tag_unset_is_latest() {
        let tag = ImageTag::resolve(None);
        assert!(tag.is_latest());
        assert_eq!(tag.as_str(), LATEST_TAG);
    }

    #[test]
    fn test_image_tag_explicit_latest_is_latest() {
        assert!(ImageTag::resolve(Some("latest")).is_latest());
    }

    #[test]
    fn test_image_tag_blank_is_latest() {
        assert!(ImageTag::resolve(Some("")).is_latest());
        assert!(ImageTag::resolve(Some("   ")).is_latest());
    }

    #[test]
    fn test_image_tag_pinned() {
        let tag = ImageTag::resolve(Some(" v2 "));
        assert!(!tag.is_latest());
        assert_eq!(tag.to_string(), "v2");
    }

    #[test]
    fn test_image_tag_is_case_sensitive() {
        // ECRのタグは大文字小文字を区別する
        assert!(!ImageTag::resolve(Some("LATEST")).is_latest());
    }

    #[test]
    fn test_service_spec_from_params() {
        let spec = ServiceSpec::from_params("orders", ServiceParams::new(28).with_version("v2"))
            .unwrap();
        assert_eq!(spec.name, "orders");
        assert_eq!(spec.age_restriction_days, 28);
        assert_eq!(spec.pinned_version.as_deref(), Some("v2"));
    }

    #[test]
    fn test_service_spec_missing_age_restriction() {
        let result = ServiceSpec::from_params("orders", ServiceParams::default());
        match result {
            Err(FlowError::MissingField { service, field }) => {
                assert_eq!(service, "orders");
                assert_eq!(field, "ageRestriction");
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_service_spec_negative_age_restriction() {
        let result = ServiceSpec::from_params("orders", ServiceParams::new(-1));
        assert!(matches!(result, Err(FlowError::InvalidConfig(_))));
    }

    #[test]
    fn test_service_params_numeric_version() {
        let params: ServiceParams =
            serde_yaml::from_str("ageRestriction: 7\nversion: 2\n").unwrap();
        assert_eq!(params.age_restriction, Some(7));
        assert_eq!(params.version.as_deref(), Some("2"));
    }

    #[test]
    fn test_service_params_float_version_rejected() {
        let result = serde_yaml::from_str::<ServiceParams>("ageRestriction: 7\nversion: 1.50\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("引用符"));

        // 引用符付きなら表記どおり
        let params: ServiceParams =
            serde_yaml::from_str("ageRestriction: 7\nversion: \"1.50\"\n").unwrap();
        assert_eq!(params.version.as_deref(), Some("1.50"));
    }

    #[test]
    fn test_service_params_unknown_keys_are_kept() {
        let params: ServiceParams =
            serde_yaml::from_str("ageRestriction: 7\ncpu: 512\n").unwrap();
        assert!(params.unknown.contains_key("cpu"));
    }

    #[test]
    fn test_resolution_serialization() {
        let targets = vec![ResolvedTarget {
            name: "orders".to_string(),
            handle: ServiceHandle::new("Orders".to_string()),
            effective_tag: ImageTag::latest(),
            tracks_latest: true,
            age_restriction_days: 28,
        }];
        let resolution = Resolution::from_targets(targets);

        let json = serde_json::to_string(&resolution).unwrap();
        assert!(json.contains("\"effective_tag\":\"latest\""));

        let deserialized: Resolution = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, resolution);
    }
}
