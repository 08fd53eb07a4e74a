//! Windowed aggregation of per-tick resource consumption.
//!
//! The monitor collects one [`ResourceUpdate`] per tick and, on its own
//! window timer, reduces the collected samples to average/min/max per
//! dimension. Readers always see the last closed window.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::core::Execution;
use crate::util::Clock;

/// Summary of one dimension over a closed window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// Integer-truncated mean.
    pub average: i64,
    /// Smallest sample.
    pub min: i64,
    /// Largest sample.
    pub max: i64,
}

/// Last closed window for every dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetrics {
    /// CPU usage.
    pub cpu: ResourceUsage,
    /// IO usage.
    pub io: ResourceUsage,
    /// Memory usage.
    pub memory: ResourceUsage,
    /// When the window closed, in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Resource consumption of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUpdate {
    /// CPU units.
    pub cpu: i64,
    /// Memory units.
    pub memory: i64,
    /// IO units.
    pub io: i64,
}

impl ResourceUpdate {
    /// Sum the query costs of a set of executions.
    #[must_use]
    pub fn from_executions(executions: &[Execution]) -> Self {
        executions.iter().fold(Self::default(), |acc, execution| {
            let cost = execution.query().cost();
            Self {
                cpu: acc.cpu + cost.cpu,
                memory: acc.memory + cost.memory,
                io: acc.io + cost.io,
            }
        })
    }
}

/// Reduce samples to average/min/max. An empty slice yields all zeros.
#[must_use]
pub fn resource_stats(samples: &[i64]) -> ResourceUsage {
    let (Some(&min), Some(&max)) = (samples.iter().min(), samples.iter().max()) else {
        return ResourceUsage::default();
    };
    let sum: i64 = samples.iter().sum();
    #[allow(clippy::cast_possible_wrap)]
    let average = sum / samples.len() as i64;
    ResourceUsage { average, min, max }
}

/// Cheap read handle onto the monitor's published snapshot.
#[derive(Clone)]
pub struct MonitorHandle {
    snapshot: Arc<RwLock<ResourceMetrics>>,
}

impl MonitorHandle {
    /// Most recently closed window.
    #[must_use]
    pub fn resources(&self) -> ResourceMetrics {
        *self.snapshot.read()
    }
}

/// Collects per-tick samples and publishes windowed summaries.
pub struct ResourceMonitor {
    cpu: Vec<i64>,
    memory: Vec<i64>,
    io: Vec<i64>,
    snapshot: Arc<RwLock<ResourceMetrics>>,
    clock: Arc<dyn Clock>,
}

impl ResourceMonitor {
    /// Create a monitor with an all-zero snapshot.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            cpu: Vec::new(),
            memory: Vec::new(),
            io: Vec::new(),
            snapshot: Arc::new(RwLock::new(ResourceMetrics::default())),
            clock,
        }
    }

    /// Read handle onto the published snapshot.
    #[must_use]
    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            snapshot: Arc::clone(&self.snapshot),
        }
    }

    /// Record one tick's consumption.
    pub fn update(&mut self, update: ResourceUpdate) {
        self.cpu.push(update.cpu);
        self.memory.push(update.memory);
        self.io.push(update.io);
    }

    /// Close the current window: publish its summary and clear the samples.
    pub fn aggregate(&mut self) -> ResourceMetrics {
        let metrics = ResourceMetrics {
            cpu: resource_stats(&self.cpu),
            io: resource_stats(&self.io),
            memory: resource_stats(&self.memory),
            timestamp: self.clock.now_ms(),
        };
        let samples = self.cpu.len();
        *self.snapshot.write() = metrics;
        self.cpu.clear();
        self.memory.clear();
        self.io.clear();
        tracing::info!(
            samples,
            cpu = ?metrics.cpu,
            memory = ?metrics.memory,
            io = ?metrics.io,
            "resource window closed"
        );
        metrics
    }

    /// Most recently closed window.
    #[must_use]
    pub fn resources(&self) -> ResourceMetrics {
        *self.snapshot.read()
    }

    /// Samples collected in the open window.
    #[must_use]
    pub fn pending_samples(&self) -> usize {
        self.cpu.len()
    }

    /// Consume updates and close a window every `window` until shutdown or
    /// until every sender is gone.
    pub async fn run(
        mut self,
        mut updates: mpsc::UnboundedReceiver<ResourceUpdate>,
        window: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut timer = interval_at(Instant::now() + window, window);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(window_ms = window.as_millis(), "resource monitor started");

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                update = updates.recv() => {
                    let Some(update) = update else {
                        tracing::warn!("resource update channel closed");
                        break;
                    };
                    self.update(update);
                }
                _ = timer.tick() => {
                    self.aggregate();
                }
            }
        }
        tracing::info!("resource monitor stopped");
    }
}
