//! Action types for stack deployment planning

use crate::error::Result;
use crate::graph::StackGraph;
use crate::state::DeployedState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents a planned action for a stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier for the action
    pub id: String,

    /// Type of action to perform
    pub action_type: ActionType,

    /// Resource type (e.g., "queue-service", "deploy-pipeline")
    pub resource_type: String,

    /// Stack identifier
    pub resource_id: String,

    /// Description of the action
    pub description: String,

    /// Additional details about the action
    pub details: HashMap<String, serde_json::Value>,
}

impl Action {
    fn new(action_type: ActionType, resource_type: &str, resource_id: &str) -> Self {
        let description = match action_type {
            ActionType::Create => format!("Create {} stack {}", resource_type, resource_id),
            ActionType::Update => format!("Update {} stack {}", resource_type, resource_id),
            ActionType::Delete => format!("Delete {} stack {}", resource_type, resource_id),
            ActionType::NoOp => format!("{} is up to date", resource_id),
        };
        Self {
            id: format!("{}:{}", action_type, resource_id),
            action_type,
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            description,
            details: HashMap::new(),
        }
    }

    fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new stack
    Create,
    /// Update an existing stack
    Update,
    /// Delete a stack
    Delete,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Plan containing all actions to be applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// List of actions to perform, in provisioning order
    pub actions: Vec<Action>,

    /// Whether the plan has any changes
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    pub fn empty() -> Self {
        Self {
            actions: Vec::new(),
            has_changes: false,
        }
    }

    /// Compare the desired graph with the previously recorded state
    ///
    /// Creates and updates follow the deployment order of `desired`.
    /// Stacks that only exist in `previous` are deleted last, dependents first.
    pub fn between(previous: Option<&DeployedState>, desired: &StackGraph) -> Result<Self> {
        let mut actions = Vec::with_capacity(desired.len());

        for id in desired.deployment_order()? {
            let Some(stack) = desired.get(&id) else {
                continue;
            };
            let kind = stack.kind.as_str();
            let action = match previous.and_then(|state| state.stacks.get(&id)) {
                None => Action::new(ActionType::Create, kind, &id),
                Some(old) => {
                    let changed = stack.changed_fields(old);
                    if changed.is_empty() {
                        Action::new(ActionType::NoOp, kind, &id)
                    } else {
                        Action::new(ActionType::Update, kind, &id)
                            .with_detail("changed", serde_json::json!(changed))
                    }
                }
            };
            actions.push(action);
        }

        if let Some(state) = previous {
            let removed: Vec<_> = state
                .stacks
                .values()
                .filter(|stack| !desired.contains(&stack.id))
                .cloned()
                .collect();
            if !removed.is_empty() {
                // Edges towards stacks that remain are irrelevant for ordering the deletes
                let removed_graph = StackGraph::from_stacks(removed.into_iter().map(|mut stack| {
                    stack.depends_on.retain(|dep| !desired.contains(dep));
                    stack
                }))?;
                for id in removed_graph.deployment_order()?.into_iter().rev() {
                    if let Some(stack) = removed_graph.get(&id) {
                        actions.push(Action::new(ActionType::Delete, stack.kind.as_str(), &id));
                    }
                }
            }
        }

        Ok(Self::new(actions))
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete, {} unchanged",
            self.create, self.update, self.delete, self.no_change
        )
    }
}
