//! Configuration System
//!
//! Loads run parameters from a TOML file so sensitivity experiments can change
//! push magnitude, threshold noise or load blending without recompiling.
//!
//! ```toml
//! [simulation]
//! years = 1000000
//! seed = 42
//! mode = "nonlinear"
//!
//! [coupling]
//! push_magnitude = 0.01
//!
//! [[faults]]
//! recurrence_interval = 400.0
//! neighbors = [1]
//!
//! [[faults]]
//! recurrence_interval = 700.0
//! neighbors = [0]
//! ```

use rupture_events::{FaultSpec, LoadingMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::SimError;
use crate::fault::FaultId;
use crate::load::LoadParams;
use crate::network::{CouplingParams, FaultNetwork, NetworkParams};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "fault_sim.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub simulation: SimulationConfig,
    pub load: LoadParams,
    pub coupling: CouplingParams,
    pub faults: Vec<FaultSpec>,
}

/// Run-level parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Horizon length in years
    pub years: u64,
    pub seed: u64,
    pub mode: LoadingMode,
    /// Per-year fault processing order; construction order when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<usize>>,
    /// Keep per-year phase samples in the output
    pub record_history: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            years: 1_000_000,
            seed: 42,
            mode: LoadingMode::Linear,
            order: None,
            record_history: true,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            load: LoadParams::default(),
            coupling: CouplingParams::default(),
            faults: vec![
                FaultSpec::new(400.0).with_neighbors([1]),
                FaultSpec::new(700.0).with_neighbors([0]),
            ],
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Checks every knob that can be checked without building the network.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.simulation.years == 0 {
            return Err(SimError::invalid("simulation.years", "must be at least one year"));
        }
        if self.faults.is_empty() {
            return Err(SimError::invalid("faults", "at least one [[faults]] entry is required"));
        }
        self.network_params().validate()
    }

    pub fn network_params(&self) -> NetworkParams {
        NetworkParams {
            load: self.load,
            coupling: self.coupling,
        }
    }

    /// Builds the configured network, ready to run from year 0.
    pub fn build_network(&self) -> Result<FaultNetwork, SimError> {
        let mut network = FaultNetwork::build(
            &self.faults,
            self.simulation.years,
            self.network_params(),
            self.simulation.seed,
        )?;
        if let Some(order) = &self.simulation.order {
            network.set_order(order.iter().copied().map(FaultId).collect())?;
        }
        Ok(network)
    }
}

impl FaultNetwork {
    /// Builds a network from a loaded configuration.
    pub fn from_config(config: &SimConfig) -> Result<Self, SimError> {
        config.build_network()
    }
}

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] SimError),
}
