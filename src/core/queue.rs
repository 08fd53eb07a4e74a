//! Pending execution queue advanced one tick at a time.

use std::collections::HashMap;

use rand::rngs::StdRng;

use crate::core::{AdmissionSampler, Execution, ExecutionId, QueryCatalog, SimError};

/// Result of one queue tick.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Executions admitted this tick, in catalog order.
    pub admitted: Vec<Execution>,
    /// Executions whose delay elapsed this tick. Order is unspecified.
    pub executed: Vec<Execution>,
}

/// Map of pending executions plus the catalog and admission table feeding it.
///
/// After every [`tick`](Self::tick) each pending entry has a remaining delay
/// greater than zero.
pub struct ExecutionQueue {
    pending: HashMap<ExecutionId, Execution>,
    catalog: QueryCatalog,
    sampler: AdmissionSampler,
    default_delay: i64,
    rng: StdRng,
}

impl ExecutionQueue {
    /// Create an empty queue.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidConfig` if the catalog and admission table
    /// differ in length or `default_delay` is not positive.
    pub fn new(
        catalog: QueryCatalog,
        sampler: AdmissionSampler,
        default_delay: i64,
        rng: StdRng,
    ) -> Result<Self, SimError> {
        if catalog.len() != sampler.len() {
            return Err(SimError::InvalidConfig(format!(
                "catalog has {} queries but admission table has {} entries",
                catalog.len(),
                sampler.len()
            )));
        }
        if default_delay <= 0 {
            return Err(SimError::InvalidConfig(format!(
                "default_delay must be greater than 0, got {default_delay}"
            )));
        }
        Ok(Self {
            pending: HashMap::new(),
            catalog,
            sampler,
            default_delay,
            rng,
        })
    }

    /// Admit new executions with load `scalar`, then age every pending entry
    /// by one tick and pull out the ones that are due.
    ///
    /// Admitted executions are reported after aging, so their remaining delay
    /// matches what [`pending`](Self::pending) shows right after the tick.
    pub fn tick(&mut self, scalar: f64) -> TickOutcome {
        let admitted_ids: Vec<ExecutionId> = self
            .sampler
            .select(&mut self.rng, scalar)
            .into_iter()
            .filter_map(|idx| self.catalog.get(idx))
            .map(|query| {
                let execution = Execution::new(query.clone(), self.default_delay);
                let id = execution.id();
                self.pending.insert(id, execution);
                id
            })
            .collect();

        let mut executed = Vec::new();
        self.pending.retain(|_, execution| {
            if execution.advance() {
                executed.push(execution.clone());
                false
            } else {
                true
            }
        });

        let admitted = admitted_ids
            .iter()
            .filter_map(|id| {
                self.pending
                    .get(id)
                    .or_else(|| executed.iter().find(|e| e.id() == *id))
                    .cloned()
            })
            .collect();

        TickOutcome { admitted, executed }
    }

    /// Snapshot of the pending executions, in no particular order.
    #[must_use]
    pub fn pending(&self) -> Vec<Execution> {
        self.pending.values().cloned().collect()
    }

    /// Shift the remaining delay of a pending execution by `delta` ticks.
    ///
    /// # Errors
    ///
    /// Returns `SimError::NotFound` if `id` is not pending.
    pub fn delay(&mut self, id: ExecutionId, delta: i64) -> Result<(), SimError> {
        let execution = self.pending.get_mut(&id).ok_or(SimError::NotFound(id))?;
        execution.adjust_delay(delta);
        Ok(())
    }

    /// Remaining delay of a pending execution.
    #[must_use]
    pub fn remaining_delay(&self, id: &ExecutionId) -> Option<i64> {
        self.pending.get(id).map(Execution::remaining_delay)
    }

    /// Number of pending executions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Delay given to newly admitted executions.
    #[must_use]
    pub const fn default_delay(&self) -> i64 {
        self.default_delay
    }

    /// The query catalog.
    #[must_use]
    pub const fn catalog(&self) -> &QueryCatalog {
        &self.catalog
    }

    /// The admission table.
    #[must_use]
    pub const fn sampler(&self) -> &AdmissionSampler {
        &self.sampler
    }
}
