//! API-facing request/response models for a transport layer.

use serde::{Deserialize, Serialize};

use crate::core::{ExecutionId, QueuedOperation, ResourceMetrics};
use crate::runtime::SimulationHandle;

/// Request to shift a pending execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRequest {
    /// Execution identifier.
    pub id: ExecutionId,
    /// Ticks to add (negative brings the execution forward).
    pub delay: i64,
}

impl DelayRequest {
    /// Reject requests without an execution id.
    ///
    /// # Errors
    ///
    /// Returns a message when `id` is the nil UUID.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_nil() {
            return Err("missing execution id".into());
        }
        Ok(())
    }
}

/// Answer to a queued-operations poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueuedResponse {
    /// Nothing pending; transports typically answer "no content".
    Empty,
    /// Pending operations, in no particular order.
    Items(Vec<QueuedOperation>),
}

impl From<Vec<QueuedOperation>> for QueuedResponse {
    fn from(ops: Vec<QueuedOperation>) -> Self {
        if ops.is_empty() {
            Self::Empty
        } else {
            Self::Items(ops)
        }
    }
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Pending executions.
    pub pending: usize,
}

/// Poll the pending executions.
#[must_use]
pub fn queued(handle: &SimulationHandle) -> QueuedResponse {
    handle.get_queued().into()
}

/// Read the last resource window.
#[must_use]
pub fn resources(handle: &SimulationHandle) -> ResourceMetrics {
    handle.get_resources()
}

/// Validate and apply a delay request.
///
/// # Errors
///
/// Returns the validation message or the `NotFound` description.
pub fn delay(handle: &SimulationHandle, req: DelayRequest) -> Result<(), String> {
    req.validate()?;
    handle.delay(req.id, req.delay).map_err(|e| e.to_string())
}

/// Return a health payload.
#[must_use]
pub fn health(handle: &SimulationHandle) -> Health {
    Health {
        ok: true,
        pending: handle.pending_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_delay_request_rejects_nil() {
        let req = DelayRequest {
            id: Uuid::nil(),
            delay: 3,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_delay_request_json() {
        let id = Uuid::new_v4();
        let req: DelayRequest =
            serde_json::from_str(&format!(r#"{{"id":"{id}","delay":-4}}"#)).unwrap();
        assert_eq!(req.id, id);
        assert_eq!(req.delay, -4);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_queue_is_no_content() {
        assert_eq!(QueuedResponse::from(Vec::new()), QueuedResponse::Empty);
    }
}
