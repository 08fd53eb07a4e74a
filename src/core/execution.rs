//! Pending executions and their externally visible projection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{Query, QueryId};

/// Identifier of an execution, distinct from its query's identifier.
pub type ExecutionId = Uuid;

/// An admitted query instance waiting for its delay to elapse.
#[derive(Debug, Clone)]
pub struct Execution {
    id: ExecutionId,
    query: Arc<Query>,
    remaining_delay: i64,
}

impl Execution {
    /// Create an execution of `query` that fires after `delay` ticks.
    #[must_use]
    pub fn new(query: Arc<Query>, delay: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            query,
            remaining_delay: delay,
        }
    }

    /// Execution identifier.
    #[must_use]
    pub const fn id(&self) -> ExecutionId {
        self.id
    }

    /// The query being executed.
    #[must_use]
    pub fn query(&self) -> &Arc<Query> {
        &self.query
    }

    /// Ticks left before the execution fires.
    #[must_use]
    pub const fn remaining_delay(&self) -> i64 {
        self.remaining_delay
    }

    pub(crate) const fn adjust_delay(&mut self, delta: i64) {
        self.remaining_delay = self.remaining_delay.saturating_add(delta);
    }

    /// Decrement by one tick and report whether the execution is due.
    pub(crate) const fn advance(&mut self) -> bool {
        self.remaining_delay -= 1;
        self.remaining_delay <= 0
    }

    /// Project into the external view, firing `remaining_delay` ticks after `now_ms`.
    #[must_use]
    pub fn project(&self, now_ms: i64, tickrate: u32) -> QueuedOperation {
        let offset_ms = self.remaining_delay.saturating_mul(1000) / i64::from(tickrate.max(1));
        QueuedOperation {
            query: QueuedQuery {
                id: self.query.id(),
            },
            execution: QueuedExecution {
                id: self.id,
                timestamp: now_ms.saturating_add(offset_ms),
            },
        }
    }
}

/// Query part of a [`QueuedOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedQuery {
    /// Query identifier.
    pub id: QueryId,
}

/// Execution part of a [`QueuedOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedExecution {
    /// Execution identifier.
    pub id: ExecutionId,
    /// Projected fire time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Read-only view of a pending execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedOperation {
    /// The query.
    pub query: QueuedQuery,
    /// The execution and its projected fire time.
    pub execution: QueuedExecution,
}
