//! Tests for simulation builders

use std::sync::Arc;

use workload_sim::builders::{build_simulation, SimulationBuilder};
use workload_sim::config::SimulationConfig;
use workload_sim::core::{
    AdmissionSampler, ConstantLoad, Profile, Query, QueryCatalog, ResourceCost, SimError,
};
use workload_sim::util::ManualClock;

#[test]
fn test_build_from_default_config() {
    let sim = build_simulation(SimulationConfig::default()).unwrap();
    assert!(!sim.is_running());
    assert_eq!(sim.handle().pending_count(), 0);
    assert_eq!(sim.handle().tickrate(), 100);
}

#[test]
fn test_build_rejects_invalid_config() {
    let cfg = SimulationConfig {
        tickrate: 0,
        ..SimulationConfig::default()
    };
    assert!(matches!(build_simulation(cfg), Err(SimError::InvalidConfig(_))));
}

#[test]
fn test_build_rejects_table_mismatch() {
    let catalog = QueryCatalog::from_queries(vec![
        Query::new(Profile::Cpu, ResourceCost::default()),
        Query::new(Profile::Io, ResourceCost::default()),
    ]);
    let result = SimulationBuilder::new(SimulationConfig::default())
        .with_catalog(catalog)
        .with_sampler(AdmissionSampler::from_probabilities(vec![0.1]))
        .build();
    assert!(matches!(result, Err(SimError::InvalidConfig(_))));
}

#[test]
fn test_builder_overrides() {
    let clock = Arc::new(ManualClock::new(1_000));
    let catalog = QueryCatalog::from_queries(vec![Query::new(
        Profile::Memory,
        ResourceCost {
            cpu: 1,
            memory: 2,
            io: 3,
        },
    )]);
    let mut sim = SimulationBuilder::new(SimulationConfig {
        tickrate: 10,
        default_delay: 5,
        ..SimulationConfig::default()
    })
    .with_clock(clock)
    .with_catalog(catalog)
    .with_sampler(AdmissionSampler::from_probabilities(vec![1.0]))
    .with_load(Box::new(ConstantLoad(1.0)))
    .build()
    .unwrap();

    let report = sim.step().unwrap();
    assert_eq!(report.admitted, 1);
    let queued = sim.handle().get_queued();
    assert_eq!(queued.len(), 1);
    // Four ticks left at 10 ticks/s.
    assert_eq!(queued[0].execution.timestamp, 1_400);
}
