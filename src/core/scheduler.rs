//! Fixed-rate tick driver.
//!
//! The scheduler owns the tick counter and the load function. Each step
//! ticks the shared queue, fans admitted executions out to listeners and
//! hands the executed set's summed cost to the resource monitor.

use std::f64::consts::PI;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::core::{ExecutionQueue, ResourceUpdate, SimError};
use crate::infra::QueueBroadcaster;

/// Load multiplier applied to admission probabilities as a function of tick.
pub trait LoadFunction: Send + Sync {
    /// Scalar for tick `tick`.
    fn at(&self, tick: u64) -> f64;
}

impl<F> LoadFunction for F
where
    F: Fn(u64) -> f64 + Send + Sync,
{
    fn at(&self, tick: u64) -> f64 {
        self(tick)
    }
}

/// Smooth cyclic load `sin((tick - phase_offset) * PI / period) / 2 + 1.5`.
///
/// The scalar stays within `[1.0, 2.0]` for any phase offset and period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SinusoidalLoad {
    /// Tick at which the wave crosses its midpoint going up.
    pub phase_offset: f64,
    /// Ticks per half cycle.
    pub period: f64,
}

impl Default for SinusoidalLoad {
    fn default() -> Self {
        Self {
            phase_offset: 500.0,
            period: 10_000.0,
        }
    }
}

impl LoadFunction for SinusoidalLoad {
    #[allow(clippy::cast_precision_loss)]
    fn at(&self, tick: u64) -> f64 {
        ((tick as f64 - self.phase_offset) * PI / self.period).sin() / 2.0 + 1.5
    }
}

/// Load that never changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantLoad(pub f64);

impl LoadFunction for ConstantLoad {
    fn at(&self, _tick: u64) -> f64 {
        self.0
    }
}

/// Summary of one scheduler step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Index of the tick that ran.
    pub tick: u64,
    /// Load scalar used.
    pub scalar: f64,
    /// Executions admitted.
    pub admitted: usize,
    /// Executions that fired.
    pub executed: usize,
    /// Summed cost of the executions that fired.
    pub usage: ResourceUpdate,
    /// Pending executions after the tick.
    pub pending: usize,
}

/// Drives the queue at a fixed rate.
pub struct TickScheduler {
    queue: Arc<Mutex<ExecutionQueue>>,
    load: Box<dyn LoadFunction>,
    broadcaster: Arc<QueueBroadcaster>,
    updates: mpsc::UnboundedSender<ResourceUpdate>,
    tickrate: u32,
    ticks: u64,
}

impl TickScheduler {
    /// Create a scheduler at tick zero.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidConfig` when `tickrate` is zero.
    pub fn new(
        queue: Arc<Mutex<ExecutionQueue>>,
        load: Box<dyn LoadFunction>,
        broadcaster: Arc<QueueBroadcaster>,
        updates: mpsc::UnboundedSender<ResourceUpdate>,
        tickrate: u32,
    ) -> Result<Self, SimError> {
        if tickrate == 0 {
            return Err(SimError::InvalidConfig(
                "tickrate must be greater than 0".into(),
            ));
        }
        Ok(Self {
            queue,
            load,
            broadcaster,
            updates,
            tickrate,
            ticks: 0,
        })
    }

    /// Ticks completed so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks per second.
    #[must_use]
    pub const fn tickrate(&self) -> u32 {
        self.tickrate
    }

    /// Wall time between ticks.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_secs(1) / self.tickrate
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns `SimError::ChannelClosed` if the resource monitor is gone; the
    /// tick still happened but its sample could not be delivered.
    pub fn step(&mut self) -> Result<TickReport, SimError> {
        let tick = self.ticks;
        let scalar = self.load.at(tick);

        let (outcome, pending) = {
            let mut queue = self.queue.lock();
            let outcome = queue.tick(scalar);
            (outcome, queue.len())
        };
        self.ticks += 1;

        self.broadcaster.publish(&outcome.admitted);
        let usage = ResourceUpdate::from_executions(&outcome.executed);
        self.updates
            .send(usage)
            .map_err(|_| SimError::ChannelClosed("resource updates"))?;

        let report = TickReport {
            tick,
            scalar,
            admitted: outcome.admitted.len(),
            executed: outcome.executed.len(),
            usage,
            pending,
        };
        tracing::debug!(
            tick,
            scalar,
            admitted = report.admitted,
            executed = report.executed,
            pending,
            "tick"
        );
        Ok(report)
    }

    /// Tick at the configured rate until `shutdown` becomes true or a step
    /// fails. Returns the scheduler so its counter can be inspected.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Self {
        let period = self.period();
        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Burst);
        tracing::info!(tickrate = self.tickrate, "tick scheduler started");

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = timer.tick() => {
                    if let Err(e) = self.step() {
                        tracing::error!(error = %e, tick = self.ticks, "tick scheduler halted");
                        break;
                    }
                }
            }
        }
        tracing::info!(ticks = self.ticks, "tick scheduler stopped");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AdmissionSampler, Profile, Query, QueryCatalog, ResourceCost};
    use crate::util::ManualClock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scheduler(
        probability: f64,
        delay: i64,
        load: Box<dyn LoadFunction>,
    ) -> (TickScheduler, mpsc::UnboundedReceiver<ResourceUpdate>) {
        let cost = ResourceCost {
            cpu: 7,
            memory: 11,
            io: 13,
        };
        let queue = ExecutionQueue::new(
            QueryCatalog::from_queries(vec![Query::new(Profile::Cpu, cost)]),
            AdmissionSampler::from_probabilities(vec![probability]),
            delay,
            StdRng::seed_from_u64(3),
        )
        .unwrap();
        let broadcaster = Arc::new(QueueBroadcaster::new(10, 10, Arc::new(ManualClock::new(0))));
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler =
            TickScheduler::new(Arc::new(Mutex::new(queue)), load, broadcaster, tx, 10).unwrap();
        (scheduler, rx)
    }

    #[test]
    fn test_sinusoidal_range() {
        let load = SinusoidalLoad::default();
        for tick in (0..40_000).step_by(37) {
            let scalar = load.at(tick);
            assert!((0.5..2.5).contains(&scalar), "tick {tick}: {scalar}");
        }
        assert!((load.at(500) - 1.5).abs() < 1e-12);
        assert!((load.at(5_500) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sinusoidal_range_any_phase_and_period() {
        for (phase_offset, period) in [(0.0, 1.0), (-3_250.5, 7.0), (1e9, 0.25), (42.0, 1e6)] {
            let load = SinusoidalLoad {
                phase_offset,
                period,
            };
            for tick in (0..20_000).step_by(13) {
                let scalar = load.at(tick);
                assert!((1.0..=2.0).contains(&scalar), "{load:?} tick {tick}: {scalar}");
            }
        }
    }

    #[test]
    fn test_closure_load() {
        let load = |tick: u64| if tick % 2 == 0 { 1.0 } else { 0.0 };
        assert!((load.at(4) - 1.0).abs() < f64::EPSILON);
        assert!(load.at(5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_tickrate_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let queue = ExecutionQueue::new(
            QueryCatalog::default(),
            AdmissionSampler::default(),
            1,
            StdRng::seed_from_u64(0),
        )
        .unwrap();
        let broadcaster = Arc::new(QueueBroadcaster::new(1, 1, Arc::new(ManualClock::new(0))));
        let result = TickScheduler::new(
            Arc::new(Mutex::new(queue)),
            Box::new(ConstantLoad(1.0)),
            broadcaster,
            tx,
            0,
        );
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_step_sends_executed_cost() {
        let (mut scheduler, mut rx) = scheduler(1.0, 2, Box::new(|t: u64| if t == 0 { 1.0 } else { 0.0 }));
        let first = scheduler.step().unwrap();
        assert_eq!(first.admitted, 1);
        assert_eq!(rx.try_recv().unwrap(), ResourceUpdate::default());

        let second = scheduler.step().unwrap();
        assert_eq!(second.executed, 1);
        assert_eq!(
            rx.try_recv().unwrap(),
            ResourceUpdate {
                cpu: 7,
                memory: 11,
                io: 13
            }
        );
        assert_eq!(second.usage, ResourceUpdate { cpu: 7, memory: 11, io: 13 });
        assert_eq!(scheduler.ticks(), 2);
    }

    #[test]
    fn test_step_uses_tick_counter_for_load() {
        let (mut scheduler, _rx) = scheduler(0.0, 1, Box::new(|t: u64| t as f64));
        for expected in 0..5u32 {
            let report = scheduler.step().unwrap();
            assert!((report.scalar - f64::from(expected)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_closed_monitor_is_fatal() {
        let (mut scheduler, rx) = scheduler(0.0, 1, Box::new(ConstantLoad(1.0)));
        drop(rx);
        assert_eq!(
            scheduler.step(),
            Err(SimError::ChannelClosed("resource updates"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_at_rate_until_shutdown() {
        let (scheduler, mut rx) = scheduler(0.0, 1, Box::new(ConstantLoad(1.0)));
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(scheduler.run(stop_rx));

        tokio::time::sleep(Duration::from_millis(1_050)).await;
        stop_tx.send(true).unwrap();
        let scheduler = task.await.unwrap();
        assert_eq!(scheduler.ticks(), 10);

        let mut samples = 0;
        while rx.try_recv().is_ok() {
            samples += 1;
        }
        assert_eq!(samples, 10);
    }
}
