//! StackFlow stack planning
//!
//! Turns a resolved environment into the graph of stacks that make up the
//! delivery pipeline, orders them, and diffs the result against the state
//! recorded by the previous plan.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               stackflow CLI                  │
//! │          (resolve / plan / validate)         │
//! └──────────────────┬───────────────────────────┘
//!                    │
//! ┌──────────────────▼───────────────────────────┐
//! │               stackflow-cloud                │
//! │  ┌────────────┐  ┌────────────┐  ┌────────┐  │
//! │  │  assembly  │─▶│ StackGraph │─▶│  Plan  │  │
//! │  └────────────┘  └────────────┘  └───┬────┘  │
//! │                                      │       │
//! │                              ┌───────▼─────┐ │
//! │                              │ State Mgmt  │ │
//! │                              └─────────────┘ │
//! └──────────────────────────────────────────────┘
//! ```

pub mod action;
pub mod assembly;
pub mod error;
pub mod graph;
pub mod stack;
pub mod state;

// Re-exports
pub use action::{Action, ActionType, Plan, PlanSummary};
pub use assembly::{
    BASE_STACK, CDK_PIPELINE, DASHBOARD_STACK, DEPLOY_PIPELINE, DOCKER_PIPELINE,
    EXTERNAL_RESOURCES, assemble,
};
pub use error::{CloudError, Result};
pub use graph::StackGraph;
pub use stack::{StackEnv, StackKind, StackSpec};
pub use state::{DeployedState, StateManager};
