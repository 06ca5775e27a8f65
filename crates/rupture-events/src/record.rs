//! Fault specifications and simulation output records.
//!
//! [`FaultSpec`] is what a driver hands to the engine; [`SimulationOutput`] is
//! what comes back once the horizon completes: per-fault phase samples and
//! rupture years, plus the chronological rupture log.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::catalog::merge_event_years;
use crate::event::RuptureEvent;

/// How phase accumulates between ruptures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingMode {
    /// Constant reloading rate of `1 / recurrence_interval` per year
    #[default]
    Linear,
    /// Decaying post-seismic transient blended with the constant rate
    Nonlinear,
}

impl fmt::Display for LoadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadingMode::Linear => write!(f, "linear"),
            LoadingMode::Nonlinear => write!(f, "nonlinear"),
        }
    }
}

impl FromStr for LoadingMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(LoadingMode::Linear),
            "nonlinear" => Ok(LoadingMode::Nonlinear),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Error returned when a loading mode name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown loading mode '{0}' (expected 'linear' or 'nonlinear')")]
pub struct ParseModeError(pub String);

/// Construction parameters for one fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultSpec {
    /// Average years between ruptures absent coupling
    pub recurrence_interval: f64,
    /// Phase at year 0
    #[serde(default)]
    pub initial_phase: f64,
    /// Indices of the faults this fault pushes when it ruptures
    #[serde(default)]
    pub neighbors: Vec<usize>,
}

impl FaultSpec {
    /// Creates an isolated fault starting at phase 0.
    pub fn new(recurrence_interval: f64) -> Self {
        Self {
            recurrence_interval,
            initial_phase: 0.0,
            neighbors: Vec::new(),
        }
    }

    /// Builder: sets the neighbors pushed on rupture.
    pub fn with_neighbors(mut self, neighbors: impl IntoIterator<Item = usize>) -> Self {
        self.neighbors = neighbors.into_iter().collect();
        self
    }

    /// Builder: sets the starting phase.
    pub fn with_initial_phase(mut self, phase: f64) -> Self {
        self.initial_phase = phase;
        self
    }
}

/// Final state of one fault after a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultRecord {
    pub index: usize,
    pub recurrence_interval: f64,
    /// Chronological rupture years
    pub event_years: Vec<u64>,
    /// Phase after the fault's own scheduled advance, one sample per year
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phase_history: Vec<f64>,
}

/// Everything a run produced, in a form analysis code can load back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub seed: u64,
    pub mode: LoadingMode,
    /// Preallocated horizon length
    pub horizon: u64,
    /// Years actually processed (less than `horizon` if the run was stopped early)
    pub years_simulated: u64,
    pub faults: Vec<FaultRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ruptures: Vec<RuptureEvent>,
}

impl SimulationOutput {
    /// Returns every fault's rupture years merged into one sorted timeline.
    pub fn merged_event_years(&self) -> Vec<u64> {
        merge_event_years(self.faults.iter().map(|f| f.event_years.as_slice()))
    }

    /// Total number of ruptures across all faults.
    pub fn total_ruptures(&self) -> usize {
        self.faults.iter().map(|f| f.event_years.len()).sum()
    }

    /// Writes the output as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), OutputError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reads an output document written by [`SimulationOutput::write_json`].
    pub fn read_json(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Errors that can occur reading or writing output files.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
