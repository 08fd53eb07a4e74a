//! # Workload Simulator
//!
//! A tick-driven simulation of a workload running against a
//! resource-constrained executor.
//!
//! Synthetic queries are admitted into a pending queue with a small
//! per-tick probability, age one tick at a time and "execute" once their
//! delay runs out. The simulated CPU, memory and IO cost of every executed
//! query is summed per tick and reduced to windowed average/min/max.
//!
//! ## Components
//!
//! - **Query catalog**: immutable queries with skew-normal resource costs
//! - **Admission sampler**: exponential per-query probabilities, one
//!   Bernoulli trial per query per tick
//! - **Execution queue**: pending executions, decremented every tick,
//!   adjustable through `delay`
//! - **Tick scheduler**: fixed-rate loop with a pluggable cyclic load scalar
//! - **Resource monitor**: windowed aggregation of per-tick samples
//! - **Queue broadcaster**: bounded drop-oldest fan-out of admissions
//!
//! ```rust,ignore
//! use workload_sim::builders::build_simulation;
//! use workload_sim::config::SimulationConfig;
//! use workload_sim::runtime::TokioSpawner;
//!
//! let mut sim = build_simulation(SimulationConfig::default())?;
//! let handle = sim.handle();
//! sim.start(&TokioSpawner::current())?;
//!
//! let listener = handle.register_queue_listener();
//! while let Some(op) = listener.recv().await {
//!     println!("{} fires at {}", op.execution.id, op.execution.timestamp);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core simulation engine.
pub mod core;
/// Configuration models.
pub mod config;
/// Builders that wire a simulation from configuration.
pub mod builders;
/// Listener buffers and event fan-out.
pub mod infra;
/// Runtime adapters, lifecycle and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
