//! Error types for simulation operations.

use thiserror::Error;

use crate::core::ExecutionId;

/// Errors produced by simulation components.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The execution is not (or no longer) pending.
    #[error("execution not found: {0}")]
    NotFound(ExecutionId),
    /// Construction-time configuration problem.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A downstream consumer went away; fatal to the owning loop.
    #[error("channel closed: {0}")]
    ChannelClosed(&'static str),
    /// The simulation loops are already running.
    #[error("simulation already running")]
    AlreadyRunning,
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
