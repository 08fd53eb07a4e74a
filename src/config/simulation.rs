//! Simulation configuration structures.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::SinusoidalLoad;

/// Parameters of the cyclic load wave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Tick at which the wave crosses its midpoint going up.
    pub phase_offset: f64,
    /// Ticks per half cycle.
    pub period: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        let load = SinusoidalLoad::default();
        Self {
            phase_offset: load.phase_offset,
            period: load.period,
        }
    }
}

impl LoadConfig {
    /// Load function described by this configuration.
    #[must_use]
    pub const fn to_load(self) -> SinusoidalLoad {
        SinusoidalLoad {
            phase_offset: self.phase_offset,
            period: self.period,
        }
    }
}

/// Root simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of synthetic queries in the catalog.
    pub catalog_size: usize,
    /// Ticks between admission and execution.
    pub default_delay: i64,
    /// Ticks per second.
    pub tickrate: u32,
    /// Resource aggregation window in seconds.
    pub window_secs: u64,
    /// Buffer capacity of each queue listener.
    pub listener_capacity: usize,
    /// Cyclic load parameters.
    pub load: LoadConfig,
    /// RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            catalog_size: 100,
            default_delay: 10,
            tickrate: 100,
            window_secs: 30,
            listener_capacity: 100,
            load: LoadConfig::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.catalog_size == 0 {
            return Err("catalog_size must be greater than 0".into());
        }
        if self.default_delay <= 0 {
            return Err("default_delay must be greater than 0".into());
        }
        if self.tickrate == 0 {
            return Err("tickrate must be greater than 0".into());
        }
        if self.window_secs == 0 {
            return Err("window_secs must be greater than 0".into());
        }
        if self.listener_capacity == 0 {
            return Err("listener_capacity must be greater than 0".into());
        }
        if !self.load.period.is_finite() || self.load.period <= 0.0 {
            return Err("load.period must be a positive number".into());
        }
        if !self.load.phase_offset.is_finite() {
            return Err("load.phase_offset must be finite".into());
        }
        Ok(())
    }

    /// Aggregation window as a duration.
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `SIM_*` environment variables (after loading
    /// a `.env` file if present), falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns a message naming the variable that failed to parse, or the
    /// validation failure.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
            target: &mut T,
        ) -> Result<(), String>
        where
            T::Err: std::fmt::Display,
        {
            if let Some(raw) = lookup(key) {
                *target = raw
                    .trim()
                    .parse()
                    .map_err(|e| format!("{key}={raw:?}: {e}"))?;
            }
            Ok(())
        }

        let mut cfg = Self::default();
        parse(&lookup, "SIM_CATALOG_SIZE", &mut cfg.catalog_size)?;
        parse(&lookup, "SIM_DEFAULT_DELAY", &mut cfg.default_delay)?;
        parse(&lookup, "SIM_TICKRATE", &mut cfg.tickrate)?;
        parse(&lookup, "SIM_WINDOW_SECS", &mut cfg.window_secs)?;
        parse(&lookup, "SIM_LISTENER_CAPACITY", &mut cfg.listener_capacity)?;
        parse(&lookup, "SIM_LOAD_PHASE_OFFSET", &mut cfg.load.phase_offset)?;
        parse(&lookup, "SIM_LOAD_PERIOD", &mut cfg.load.period)?;
        if let Some(raw) = lookup("SIM_SEED") {
            let seed = raw
                .trim()
                .parse()
                .map_err(|e| format!("SIM_SEED={raw:?}: {e}"))?;
            cfg.seed = Some(seed);
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
