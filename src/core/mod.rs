//! Core simulation engine: catalog, admission, queue, scheduler and monitor.

pub mod admission;
pub mod catalog;
pub mod cost;
pub mod error;
pub mod execution;
pub mod monitor;
pub mod queue;
pub mod scheduler;

pub use admission::AdmissionSampler;
pub use catalog::{Profile, Query, QueryCatalog, QueryId};
pub use cost::{generate_cost, ResourceCost, SkewNormal};
pub use error::{AppResult, SimError};
pub use execution::{Execution, ExecutionId, QueuedExecution, QueuedOperation, QueuedQuery};
pub use monitor::{
    resource_stats, MonitorHandle, ResourceMetrics, ResourceMonitor, ResourceUpdate, ResourceUsage,
};
pub use queue::{ExecutionQueue, TickOutcome};
pub use scheduler::{ConstantLoad, LoadFunction, SinusoidalLoad, TickReport, TickScheduler};
