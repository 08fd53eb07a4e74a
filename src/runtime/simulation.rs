//! Simulation lifecycle and the handle collaborators use to query it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use crate::core::{
    ExecutionId, ExecutionQueue, MonitorHandle, QueuedOperation, ResourceMetrics, ResourceMonitor,
    ResourceUpdate, SimError, TickReport, TickScheduler,
};
use crate::infra::{QueueBroadcaster, QueueListener};
use crate::runtime::Spawn;
use crate::util::Clock;

/// Cloneable view onto a simulation's queue, listeners and metrics.
#[derive(Clone)]
pub struct SimulationHandle {
    queue: Arc<Mutex<ExecutionQueue>>,
    broadcaster: Arc<QueueBroadcaster>,
    monitor: MonitorHandle,
    clock: Arc<dyn Clock>,
    tickrate: u32,
}

impl SimulationHandle {
    /// Project every pending execution. An empty list is a valid answer.
    #[must_use]
    pub fn get_queued(&self) -> Vec<QueuedOperation> {
        let pending = self.queue.lock().pending();
        let now = self.clock.now_ms();
        pending
            .iter()
            .map(|e| e.project(now, self.tickrate))
            .collect()
    }

    /// Last closed resource window.
    #[must_use]
    pub fn get_resources(&self) -> ResourceMetrics {
        self.monitor.resources()
    }

    /// Shift a pending execution by `delta_ticks`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::NotFound` if the execution is not pending.
    pub fn delay(&self, id: ExecutionId, delta_ticks: i64) -> Result<(), SimError> {
        let result = self.queue.lock().delay(id, delta_ticks);
        match &result {
            Ok(()) => tracing::debug!(execution = %id, delta_ticks, "execution delayed"),
            Err(e) => tracing::warn!(execution = %id, delta_ticks, error = %e, "delay rejected"),
        }
        result
    }

    /// Subscribe to projections of newly admitted executions.
    #[must_use]
    pub fn register_queue_listener(&self) -> QueueListener {
        self.broadcaster.register()
    }

    /// Number of pending executions.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue.lock().len()
    }

    /// Ticks per second.
    #[must_use]
    pub const fn tickrate(&self) -> u32 {
        self.tickrate
    }
}

struct Loops {
    scheduler: TickScheduler,
    monitor: ResourceMonitor,
    updates: mpsc::UnboundedReceiver<ResourceUpdate>,
}

/// A wired simulation: construct, optionally step by hand, then start.
pub struct Simulation {
    handle: SimulationHandle,
    loops: Option<Loops>,
    window: Duration,
    shutdown: watch::Sender<bool>,
}

impl Simulation {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        queue: Arc<Mutex<ExecutionQueue>>,
        broadcaster: Arc<QueueBroadcaster>,
        scheduler: TickScheduler,
        monitor: ResourceMonitor,
        updates: mpsc::UnboundedReceiver<ResourceUpdate>,
        clock: Arc<dyn Clock>,
        window: Duration,
    ) -> Self {
        let handle = SimulationHandle {
            queue,
            broadcaster,
            monitor: monitor.handle(),
            clock,
            tickrate: scheduler.tickrate(),
        };
        let (shutdown, _) = watch::channel(false);
        Self {
            handle,
            loops: Some(Loops {
                scheduler,
                monitor,
                updates,
            }),
            window,
            shutdown,
        }
    }

    /// Handle for collaborators.
    #[must_use]
    pub fn handle(&self) -> SimulationHandle {
        self.handle.clone()
    }

    /// True once [`start`](Self::start) has handed the loops to the runtime.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.loops.is_none()
    }

    /// Run one tick synchronously and fold its sample into the open window.
    ///
    /// # Errors
    ///
    /// Returns `SimError::AlreadyRunning` after [`start`](Self::start).
    pub fn step(&mut self) -> Result<TickReport, SimError> {
        let loops = self.loops.as_mut().ok_or(SimError::AlreadyRunning)?;
        let report = loops.scheduler.step()?;
        while let Ok(update) = loops.updates.try_recv() {
            loops.monitor.update(update);
        }
        Ok(report)
    }

    /// Close the open resource window immediately.
    ///
    /// # Errors
    ///
    /// Returns `SimError::AlreadyRunning` after [`start`](Self::start).
    pub fn close_window(&mut self) -> Result<ResourceMetrics, SimError> {
        let loops = self.loops.as_mut().ok_or(SimError::AlreadyRunning)?;
        Ok(loops.monitor.aggregate())
    }

    /// Spawn the tick loop and the monitor loop.
    ///
    /// # Errors
    ///
    /// Returns `SimError::AlreadyRunning` if called twice.
    pub fn start<S: Spawn>(&mut self, spawner: &S) -> Result<(), SimError> {
        let Loops {
            scheduler,
            monitor,
            updates,
        } = self.loops.take().ok_or(SimError::AlreadyRunning)?;

        let window = self.window;
        let monitor_shutdown = self.shutdown.subscribe();
        spawner.spawn(async move {
            monitor.run(updates, window, monitor_shutdown).await;
        });

        let scheduler_shutdown = self.shutdown.subscribe();
        spawner.spawn(async move {
            let scheduler = scheduler.run(scheduler_shutdown).await;
            tracing::debug!(ticks = scheduler.ticks(), "tick loop exited");
        });

        tracing::info!(
            tickrate = self.handle.tickrate,
            window_secs = window.as_secs(),
            "simulation started"
        );
        Ok(())
    }

    /// Ask both loops to exit.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
        tracing::info!("simulation stop requested");
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}
