//! Configuration models for the simulation and its load wave.

pub mod simulation;

pub use simulation::{LoadConfig, SimulationConfig};
