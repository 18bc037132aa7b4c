//! Application assembly
//!
//! Builds the full stack graph of an environment from the shared settings
//! and the resolved deployment targets.

use crate::error::Result;
use crate::graph::StackGraph;
use crate::stack::{StackEnv, StackKind, StackSpec};
use serde_json::json;
use stackflow_config::Settings;
use stackflow_core::{LATEST_TAG, Resolution, ResolvedTarget};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

pub const EXTERNAL_RESOURCES: &str = "ExternalResources";
pub const CDK_PIPELINE: &str = "CdkPipeline";
pub const DOCKER_PIPELINE: &str = "DockerPipeline";
pub const BASE_STACK: &str = "BaseStack";
pub const DEPLOY_PIPELINE: &str = "DeployPipeline";
pub const DASHBOARD_STACK: &str = "DashboardStack";

/// Metric each queue service publishes to the dashboard
pub const QUEUE_METRIC: &str = "ApproximateNumberOfMessagesAvailable";

const TASK_CPU: u32 = 256;
const TASK_MEMORY_MIB: u32 = 1024;
const DESIRED_COUNT: u32 = 1;
const UNTAGGED_IMAGE_MAX_AGE_DAYS: u32 = 5;
const LOG_RETENTION_DAYS: u32 = 365;

/// Shared values every stack builder needs
struct Context<'a> {
    env: StackEnv,
    tags: BTreeMap<String, String>,
    artifact_bucket: String,
    settings: &'a Settings,
    environment: &'a str,
}

impl Context<'_> {
    fn stack(&self, id: impl Into<String>, kind: StackKind) -> StackSpec {
        StackSpec::new(id, kind)
            .with_env(self.env.clone())
            .with_tags(self.tags.clone())
    }
}

/// Assemble the stack graph for an environment
#[instrument(skip(settings, resolution), fields(services = resolution.targets().len()))]
pub fn assemble(settings: &Settings, environment: &str, resolution: &Resolution) -> Result<StackGraph> {
    let ctx = Context {
        env: StackEnv {
            account: settings.account.clone(),
            region: settings.region.clone(),
        },
        tags: settings.tags_for(environment),
        artifact_bucket: settings.artifact_bucket_name()?,
        settings,
        environment,
    };

    let mut graph = StackGraph::new();

    graph.add(external_resources(&ctx))?;

    graph.add(cdk_pipeline(&ctx))?;
    graph.add_dependency(CDK_PIPELINE, EXTERNAL_RESOURCES)?;

    graph.add(docker_pipeline(&ctx))?;
    graph.add_dependency(DOCKER_PIPELINE, EXTERNAL_RESOURCES)?;
    graph.add_dependency(DOCKER_PIPELINE, CDK_PIPELINE)?;

    graph.add(base_stack(&ctx))?;
    graph.add_dependency(BASE_STACK, EXTERNAL_RESOURCES)?;
    graph.add_dependency(BASE_STACK, CDK_PIPELINE)?;

    for target in resolution.targets() {
        let id = target.stack_id();
        debug!(stack = %id, tracks_latest = target.tracks_latest, "Adding queue service stack");
        graph.add(queue_service(&ctx, target))?;
        graph.add_dependency(&id, BASE_STACK)?;
        graph.add_dependency(&id, DOCKER_PIPELINE)?;
    }

    // The pipeline references the services it deploys
    graph.add(deploy_pipeline(&ctx, resolution))?;
    graph.add_dependency(DEPLOY_PIPELINE, EXTERNAL_RESOURCES)?;
    graph.add_dependency(DEPLOY_PIPELINE, DOCKER_PIPELINE)?;
    for target in resolution.deployable().iter() {
        graph.add_dependency(DEPLOY_PIPELINE, &target.stack_id())?;
    }

    // Frozen stacks come after the pipeline
    for constraint in resolution.ordering_constraints(DEPLOY_PIPELINE) {
        graph.add_dependency(&constraint.dependent, &constraint.dependency)?;
    }

    graph.add(dashboard(&ctx, resolution))?;
    graph.add_dependency(DASHBOARD_STACK, BASE_STACK)?;
    graph.add_dependency(DASHBOARD_STACK, DEPLOY_PIPELINE)?;
    for target in resolution.targets() {
        graph.add_dependency(DASHBOARD_STACK, &target.stack_id())?;
    }

    info!(
        stacks = graph.len(),
        deployable = resolution.deployable().len(),
        frozen = resolution.frozen().len(),
        "Stack graph assembled"
    );
    Ok(graph)
}

fn external_resources(ctx: &Context) -> StackSpec {
    ctx.stack(EXTERNAL_RESOURCES, StackKind::ExternalResources)
        .with_properties(json!({
            "artifactBucket": ctx.artifact_bucket,
            "vpc": ctx.settings.vpc,
            "subnets": ctx.settings.subnets,
            "availabilityZones": ctx.settings.availability_zones,
        }))
}

fn cdk_pipeline(ctx: &Context) -> StackSpec {
    ctx.stack(CDK_PIPELINE, StackKind::CdkPipeline)
        .with_properties(json!({
            "repository": ctx.settings.cdk_repository,
            "dockerRepository": ctx.settings.docker_repository,
            "owner": ctx.settings.owner,
            "branch": ctx.settings.cdk_branch,
            "githubTokenParameter": ctx.settings.github_token_parameter,
            "artifactBucket": ctx.artifact_bucket,
            "environment": ctx.environment,
        }))
}

fn docker_pipeline(ctx: &Context) -> StackSpec {
    ctx.stack(DOCKER_PIPELINE, StackKind::DockerPipeline)
        .with_properties(json!({
            "repository": ctx.settings.docker_repository,
            "owner": ctx.settings.owner,
            "branch": ctx.settings.docker_branch,
            "githubTokenParameter": ctx.settings.github_token_parameter,
            "artifactBucket": ctx.artifact_bucket,
            "imageTag": LATEST_TAG,
            "untaggedImageMaxAgeDays": UNTAGGED_IMAGE_MAX_AGE_DAYS,
        }))
}

fn base_stack(ctx: &Context) -> StackSpec {
    ctx.stack(BASE_STACK, StackKind::BaseStack)
        .with_properties(json!({
            "logGroup": format!("/aws/ecs/cicd-{}", ctx.environment),
            "logRetentionDays": LOG_RETENTION_DAYS,
        }))
}

fn queue_service(ctx: &Context, target: &ResolvedTarget) -> StackSpec {
    ctx.stack(target.stack_id(), StackKind::QueueService)
        .with_properties(json!({
            "service": target.name,
            "ageRestriction": target.age_restriction_days,
            "imageTag": target.effective_tag,
            "tracksLatest": target.tracks_latest,
            "imageRepository": ctx.settings.docker_repository,
            "cpu": TASK_CPU,
            "memoryLimitMiB": TASK_MEMORY_MIB,
            "desiredCount": DESIRED_COUNT,
            "metric": QUEUE_METRIC,
        }))
}

fn deploy_pipeline(ctx: &Context, resolution: &Resolution) -> StackSpec {
    let services: Vec<&str> = resolution
        .deployable()
        .iter()
        .map(|target| target.handle.as_str())
        .collect();

    ctx.stack(DEPLOY_PIPELINE, StackKind::DeployPipeline)
        .with_properties(json!({
            "imageRepository": ctx.settings.docker_repository,
            "imageTag": LATEST_TAG,
            "ecsServices": services,
            "artifactBucket": ctx.artifact_bucket,
        }))
}

fn dashboard(ctx: &Context, resolution: &Resolution) -> StackSpec {
    let metrics: Vec<serde_json::Value> = resolution
        .targets()
        .iter()
        .map(|target| json!({ "stack": target.stack_id(), "metric": QUEUE_METRIC }))
        .collect();

    ctx.stack(DASHBOARD_STACK, StackKind::Dashboard)
        .with_properties(json!({
            "dashboardName": "queue-service-messages",
            "start": "-24H",
            "metrics": metrics,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CloudError;
    use stackflow_core::{ServiceParams, resolve};

    fn settings() -> Settings {
        Settings::default().with_overrides(
            Some("123456789012".to_string()),
            Some("eu-west-1".to_string()),
        )
    }

    fn sample_resolution() -> Resolution {
        resolve(vec![
            ("orders".to_string(), ServiceParams::new(28)),
            ("billing".to_string(), ServiceParams::new(14).with_version("v1")),
            ("audit-log".to_string(), ServiceParams::new(7).with_version("latest")),
        ])
        .unwrap()
    }

    fn position(order: &[String], id: &str) -> usize {
        order.iter().position(|s| s == id).unwrap()
    }

    #[test]
    fn test_assemble_creates_all_stacks() {
        let graph = assemble(&settings(), "test", &sample_resolution()).unwrap();

        for id in [
            EXTERNAL_RESOURCES,
            CDK_PIPELINE,
            DOCKER_PIPELINE,
            BASE_STACK,
            DEPLOY_PIPELINE,
            DASHBOARD_STACK,
            "QueueService-Orders",
            "QueueService-Billing",
            "QueueService-AuditLog",
        ] {
            assert!(graph.contains(id), "missing stack {}", id);
        }
        assert_eq!(graph.len(), 9);
    }

    #[test]
    fn test_frozen_stacks_follow_deploy_pipeline() {
        let graph = assemble(&settings(), "test", &sample_resolution()).unwrap();
        let order = graph.deployment_order().unwrap();

        let pipeline = position(&order, DEPLOY_PIPELINE);
        assert!(position(&order, "QueueService-Billing") > pipeline);
        assert!(position(&order, "QueueService-Orders") < pipeline);
        assert!(position(&order, "QueueService-AuditLog") < pipeline);
        assert_eq!(order.last().map(String::as_str), Some(DASHBOARD_STACK));
    }

    #[test]
    fn test_deploy_pipeline_lists_only_deployable_services() {
        let graph = assemble(&settings(), "test", &sample_resolution()).unwrap();
        let pipeline = graph.get(DEPLOY_PIPELINE).unwrap();

        let services: Vec<String> = pipeline.get_property("ecsServices").unwrap();
        assert_eq!(services, vec!["AuditLog", "Orders"]);
        assert!(!pipeline.depends_on.contains("QueueService-Billing"));
    }

    #[test]
    fn test_waves_match_pipeline_run_order() {
        let graph = assemble(&settings(), "test", &sample_resolution()).unwrap();
        let waves = graph.waves().unwrap();

        assert_eq!(waves[0], vec![EXTERNAL_RESOURCES]);
        assert_eq!(waves[1], vec![CDK_PIPELINE]);
        assert_eq!(waves[2], vec![BASE_STACK, DOCKER_PIPELINE]);
        assert_eq!(waves[3], vec!["QueueService-AuditLog", "QueueService-Orders"]);
        assert_eq!(waves[4], vec![DEPLOY_PIPELINE]);
        assert_eq!(waves[5], vec!["QueueService-Billing"]);
        assert_eq!(waves[6], vec![DASHBOARD_STACK]);
    }

    #[test]
    fn test_queue_service_properties() {
        let graph = assemble(&settings(), "test", &sample_resolution()).unwrap();
        let billing = graph.get("QueueService-Billing").unwrap();

        assert_eq!(billing.get_property::<String>("imageTag").as_deref(), Some("v1"));
        assert_eq!(billing.get_property::<bool>("tracksLatest"), Some(false));
        assert_eq!(billing.get_property::<u32>("ageRestriction"), Some(14));
        assert_eq!(billing.tags.get("Environment").map(String::as_str), Some("test"));
        assert_eq!(billing.env.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_dashboard_has_metric_per_service() {
        let graph = assemble(&settings(), "test", &sample_resolution()).unwrap();
        let dashboard = graph.get(DASHBOARD_STACK).unwrap();

        let metrics: Vec<serde_json::Value> = dashboard.get_property("metrics").unwrap();
        assert_eq!(metrics.len(), 3);
    }

    #[test]
    fn test_pipeline_referencing_frozen_stack_is_a_cycle() {
        let mut graph = assemble(&settings(), "test", &sample_resolution()).unwrap();
        graph
            .add_dependency(DEPLOY_PIPELINE, "QueueService-Billing")
            .unwrap();

        assert!(matches!(
            graph.deployment_order(),
            Err(CloudError::CircularDependency(_))
        ));
    }

    #[test]
    fn test_assemble_requires_bucket_location() {
        let result = assemble(&Settings::default(), "test", &sample_resolution());
        assert!(matches!(result, Err(CloudError::Config(_))));
    }

    #[test]
    fn test_assemble_without_services() {
        let resolution = resolve(Vec::new()).unwrap();
        let graph = assemble(&settings(), "test", &resolution).unwrap();

        assert_eq!(graph.len(), 6);
        let order = graph.deployment_order().unwrap();
        assert_eq!(order.first().map(String::as_str), Some(EXTERNAL_RESOURCES));
        assert_eq!(order.last().map(String::as_str), Some(DASHBOARD_STACK));
        assert!(position(&order, DEPLOY_PIPELINE) < position(&order, DASHBOARD_STACK));
    }
}
