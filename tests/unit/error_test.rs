//! Tests for error types

use uuid::Uuid;
use workload_sim::core::SimError;

#[test]
fn test_not_found_error() {
    let id = Uuid::nil();
    let err = SimError::NotFound(id);
    assert_eq!(
        format!("{}", err),
        "execution not found: 00000000-0000-0000-0000-000000000000"
    );
}

#[test]
fn test_invalid_config_error() {
    let err = SimError::InvalidConfig("tickrate must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: tickrate must be greater than 0"
    );
}

#[test]
fn test_channel_closed_error() {
    let err = SimError::ChannelClosed("resource updates");
    assert_eq!(format!("{}", err), "channel closed: resource updates");
}

#[test]
fn test_already_running_error() {
    assert_eq!(format!("{}", SimError::AlreadyRunning), "simulation already running");
}

#[test]
fn test_converts_into_anyhow() {
    let result: workload_sim::core::AppResult<()> = Err(SimError::AlreadyRunning.into());
    assert!(result.unwrap_err().to_string().contains("already running"));
}
