//! Runtime adapters, the simulation lifecycle and the API surface.

use std::future::Future;

pub mod api;
pub mod simulation;
pub mod tokio_spawner;

pub use api::{DelayRequest, Health, QueuedResponse};
pub use simulation::{Simulation, SimulationHandle};
pub use tokio_spawner::TokioSpawner;

/// Abstraction for spawning the simulation loops on a runtime.
pub trait Spawn {
    /// Spawn a background future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
