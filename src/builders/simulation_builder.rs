//! Builders to construct a simulation from configuration.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use crate::config::SimulationConfig;
use crate::core::{
    AdmissionSampler, ExecutionQueue, LoadFunction, QueryCatalog, ResourceMonitor, SimError,
    TickScheduler,
};
use crate::infra::QueueBroadcaster;
use crate::runtime::Simulation;
use crate::util::{Clock, SystemClock};

/// Wires catalog, queue, scheduler, monitor and broadcaster together.
///
/// Any configuration problem fails here, before a loop exists.
pub struct SimulationBuilder {
    config: SimulationConfig,
    clock: Arc<dyn Clock>,
    load: Option<Box<dyn LoadFunction>>,
    catalog: Option<QueryCatalog>,
    sampler: Option<AdmissionSampler>,
}

impl SimulationBuilder {
    /// Start from a configuration; the clock defaults to the system clock and
    /// the load to the configured sinusoid.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            load: None,
            catalog: None,
            sampler: None,
        }
    }

    /// Use another clock for projections and window stamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the load function.
    #[must_use]
    pub fn with_load(mut self, load: Box<dyn LoadFunction>) -> Self {
        self.load = Some(load);
        self
    }

    /// Use a prepared catalog instead of generating one.
    #[must_use]
    pub fn with_catalog(mut self, catalog: QueryCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Use a prepared admission table instead of generating one.
    #[must_use]
    pub fn with_sampler(mut self, sampler: AdmissionSampler) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Validate and assemble the simulation.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidConfig` for invalid settings or a
    /// catalog/admission table size mismatch.
    pub fn build(self) -> Result<Simulation, SimError> {
        let cfg = self.config;
        cfg.validate()
            .map_err(|e| SimError::InvalidConfig(format!("config invalid: {e}")))?;

        let mut rng = cfg
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => QueryCatalog::generate(cfg.catalog_size, &mut rng),
        };
        let sampler = match self.sampler {
            Some(sampler) => sampler,
            None => AdmissionSampler::generate(catalog.len(), &mut rng)?,
        };
        let queue_rng = StdRng::seed_from_u64(rng.random());
        let queue = Arc::new(Mutex::new(ExecutionQueue::new(
            catalog,
            sampler,
            cfg.default_delay,
            queue_rng,
        )?));

        let broadcaster = Arc::new(QueueBroadcaster::new(
            cfg.listener_capacity,
            cfg.tickrate,
            Arc::clone(&self.clock),
        ));
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let load = self
            .load
            .unwrap_or_else(|| Box::new(cfg.load.to_load()) as Box<dyn LoadFunction>);
        let scheduler = TickScheduler::new(
            Arc::clone(&queue),
            load,
            Arc::clone(&broadcaster),
            updates_tx,
            cfg.tickrate,
        )?;
        let monitor = ResourceMonitor::new(Arc::clone(&self.clock));

        tracing::info!(
            catalog_size = cfg.catalog_size,
            default_delay = cfg.default_delay,
            tickrate = cfg.tickrate,
            window_secs = cfg.window_secs,
            seeded = cfg.seed.is_some(),
            "simulation built"
        );

        Ok(Simulation::from_parts(
            queue,
            broadcaster,
            scheduler,
            monitor,
            updates_rx,
            self.clock,
            cfg.window(),
        ))
    }
}

/// Build a simulation from configuration with the default clock and load.
///
/// # Errors
///
/// See [`SimulationBuilder::build`].
pub fn build_simulation(cfg: SimulationConfig) -> Result<Simulation, SimError> {
    SimulationBuilder::new(cfg).build()
}
