//! Stack specifications
//!
//! A stack is a group of cloud resources provisioned together. StackFlow
//! only describes the stacks, their parameters and how they depend on each
//! other; synthesizing the resources inside them is left to the provisioner.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Kind of stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackKind {
    /// Imported resources that already exist (artifact bucket, VPC)
    ExternalResources,
    /// Self-deploying pipeline for the infrastructure definitions
    CdkPipeline,
    /// Image build pipeline and ECR repository
    DockerPipeline,
    /// ECS cluster and shared log group
    BaseStack,
    /// One queue-consuming Fargate service
    QueueService,
    /// Rolling deployment of the services tracking `latest`
    DeployPipeline,
    /// CloudWatch dashboard
    Dashboard,
}

impl StackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StackKind::ExternalResources => "external-resources",
            StackKind::CdkPipeline => "cdk-pipeline",
            StackKind::DockerPipeline => "docker-pipeline",
            StackKind::BaseStack => "base-stack",
            StackKind::QueueService => "queue-service",
            StackKind::DeployPipeline => "deploy-pipeline",
            StackKind::Dashboard => "dashboard",
        }
    }
}

impl std::fmt::Display for StackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment target of a stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEnv {
    pub account: Option<String>,
    pub region: Option<String>,
}

/// Specification of a single stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSpec {
    /// Stack identifier (also the deployed stack name)
    pub id: String,

    pub kind: StackKind,

    pub env: StackEnv,

    pub tags: BTreeMap<String, String>,

    /// Stack-specific parameters
    pub properties: serde_json::Value,

    /// Stacks that must be provisioned before this one
    #[serde(default)]
    pub depends_on: BTreeSet<String>,
}

impl StackSpec {
    pub fn new(id: impl Into<String>, kind: StackKind) -> Self {
        Self {
            id: id.into(),
            kind,
            env: StackEnv::default(),
            tags: BTreeMap::new(),
            properties: serde_json::Value::Object(Default::default()),
            depends_on: BTreeSet::new(),
        }
    }

    pub fn with_env(mut self, env: StackEnv) -> Self {
        self.env = env;
        self
    }

    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = properties;
        self
    }

    /// Get a property value as a specific type
    pub fn get_property<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.properties
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Names of the top-level fields that differ from `other`
    pub fn changed_fields(&self, other: &StackSpec) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.kind != other.kind {
            changed.push("kind");
        }
        if self.env != other.env {
            changed.push("env");
        }
        if self.tags != other.tags {
            changed.push("tags");
        }
        if self.properties != other.properties {
            changed.push("properties");
        }
        if self.depends_on != other.depends_on {
            changed.push("depends_on");
        }
        changed
    }
}
