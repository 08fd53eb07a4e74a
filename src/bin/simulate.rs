//! `simulate` -- run a workload simulation and log what it does.
//!
//! # Environment variables
//!
//! | Variable                | Default | Description                     |
//! |-------------------------|---------|---------------------------------|
//! | `SIM_CATALOG_SIZE`      | `100`   | Queries in the catalog          |
//! | `SIM_DEFAULT_DELAY`     | `10`    | Ticks from admission to firing  |
//! | `SIM_TICKRATE`          | `100`   | Ticks per second                |
//! | `SIM_WINDOW_SECS`       | `30`    | Resource aggregation window     |
//! | `SIM_LISTENER_CAPACITY` | `100`   | Queue listener buffer size      |
//! | `SIM_SEED`              | random  | RNG seed                        |
//! | `RUST_LOG`              | --      | Log filter, e.g. `info`         |

use std::time::Duration;

use anyhow::anyhow;
use workload_sim::builders::build_simulation;
use workload_sim::config::SimulationConfig;
use workload_sim::core::AppResult;
use workload_sim::runtime::{api, TokioSpawner};
use workload_sim::util::init_tracing;

/// How often the queue depth is logged.
const QUEUE_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> AppResult<()> {
    let cfg = SimulationConfig::from_env().map_err(|e| anyhow!(e))?;
    init_tracing();

    let mut sim = build_simulation(cfg.clone())?;
    let handle = sim.handle();
    let listener = handle.register_queue_listener();
    sim.start(&TokioSpawner::current())?;

    let mut queue_poll = tokio::time::interval(QUEUE_POLL_INTERVAL);
    let mut resource_poll = tokio::time::interval(cfg.window());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received");
                break;
            }
            _ = queue_poll.tick() => {
                let admitted = listener.drain().len();
                let dropped = listener.dropped();
                match api::queued(&handle) {
                    api::QueuedResponse::Empty => tracing::info!(admitted, dropped, "no queued queries"),
                    api::QueuedResponse::Items(ops) => {
                        tracing::info!(queued = ops.len(), admitted, dropped, "queued queries");
                    }
                }
            }
            _ = resource_poll.tick() => {
                let metrics = api::resources(&handle);
                tracing::info!(
                    cpu = ?metrics.cpu,
                    io = ?metrics.io,
                    memory = ?metrics.memory,
                    timestamp = metrics.timestamp,
                    "resources"
                );
            }
        }
    }

    sim.stop();
    Ok(())
}
