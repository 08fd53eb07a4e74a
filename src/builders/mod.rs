//! Builders to construct a simulation from configuration.

pub mod simulation_builder;

pub use simulation_builder::{build_simulation, SimulationBuilder};
