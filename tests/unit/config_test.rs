//! Tests for configuration validation

use std::collections::HashMap;

use workload_sim::config::{LoadConfig, SimulationConfig};

#[test]
fn test_default_config_is_valid() {
    let cfg = SimulationConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.catalog_size, 100);
    assert_eq!(cfg.default_delay, 10);
    assert_eq!(cfg.tickrate, 100);
    assert_eq!(cfg.window_secs, 30);
    assert_eq!(cfg.listener_capacity, 100);
    assert_eq!(cfg.load, LoadConfig { phase_offset: 500.0, period: 10_000.0 });
    assert!(cfg.seed.is_none());
}

#[test]
fn test_invalid_catalog_size() {
    let cfg = SimulationConfig {
        catalog_size: 0,
        ..SimulationConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_tickrate() {
    let cfg = SimulationConfig {
        tickrate: 0,
        ..SimulationConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_default_delay() {
    let cfg = SimulationConfig {
        default_delay: -1,
        ..SimulationConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_window_and_capacity() {
    let cfg = SimulationConfig {
        window_secs: 0,
        ..SimulationConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = SimulationConfig {
        listener_capacity: 0,
        ..SimulationConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_load_period() {
    let cfg = SimulationConfig {
        load: LoadConfig {
            phase_offset: 0.0,
            period: 0.0,
        },
        ..SimulationConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "catalog_size": 30,
        "default_delay": 5,
        "tickrate": 10,
        "window_secs": 5,
        "load": { "period": 200.0 },
        "seed": 42
    }"#;

    let cfg = SimulationConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.catalog_size, 30);
    assert_eq!(cfg.tickrate, 10);
    assert_eq!(cfg.listener_capacity, 100);
    assert!((cfg.load.period - 200.0).abs() < f64::EPSILON);
    assert!((cfg.load.phase_offset - 500.0).abs() < f64::EPSILON);
    assert_eq!(cfg.seed, Some(42));
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(SimulationConfig::from_json_str(r#"{ "tickrate": 0 }"#).is_err());
    assert!(SimulationConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_from_lookup() {
    let vars: HashMap<&str, &str> = [
        ("SIM_CATALOG_SIZE", "60"),
        ("SIM_TICKRATE", " 10 "),
        ("SIM_SEED", "7"),
    ]
    .into_iter()
    .collect();
    let cfg = SimulationConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string())).unwrap();
    assert_eq!(cfg.catalog_size, 60);
    assert_eq!(cfg.tickrate, 10);
    assert_eq!(cfg.seed, Some(7));
    assert_eq!(cfg.default_delay, 10);
}

#[test]
fn test_config_from_lookup_bad_value() {
    let err = SimulationConfig::from_lookup(|k| (k == "SIM_TICKRATE").then(|| "fast".to_string()))
        .unwrap_err();
    assert!(err.contains("SIM_TICKRATE"));
}
