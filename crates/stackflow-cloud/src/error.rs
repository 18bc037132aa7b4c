//! Stack planning error types

use thiserror::Error;

/// Stack graph and planning errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Stack not found: {0}")]
    StackNotFound(String),

    #[error("Stack already exists: {0}")]
    DuplicateStack(String),

    #[error("Stack cannot depend on itself: {0}")]
    SelfDependency(String),

    #[error("Circular dependency between stacks: {}", .0.join(" -> "))]
    CircularDependency(Vec<String>),

    #[error(transparent)]
    Config(#[from] stackflow_config::ConfigError),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
