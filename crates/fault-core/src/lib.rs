//! Coupled stress-cycle fault simulation engine.
//!
//! Faults load toward a randomized rupture threshold, reset on rupture, and
//! push their neighbors by a small fixed amount, which can trigger cascades of
//! ruptures within the same simulated year.
//!
//! - [`load`]: yearly phase increments (linear and nonlinear loading)
//! - [`fault`]: per-fault state machine
//! - [`network`]: fault arena, neighbor graph, year loop and cascades
//! - [`interventions`]: scheduled out-of-band perturbations
//! - [`config`]: TOML configuration

use rand::rngs::SmallRng;
use rand::SeedableRng;

pub mod config;
pub mod error;
pub mod fault;
pub mod interventions;
pub mod load;
pub mod network;

pub use config::{ConfigError, SimConfig, SimulationConfig};
pub use error::SimError;
pub use fault::{Fault, FaultId};
pub use interventions::{Intervention, InterventionError, InterventionSchedule, InterventionType};
pub use load::LoadParams;
pub use network::{CascadeReport, CouplingParams, FaultNetwork, NetworkParams, RunSummary, YearReport};

pub use rupture_events::{FaultSpec, LoadingMode, RuptureEvent, RuptureTrigger, SimulationOutput};

/// Seeded random number generator shared by every threshold draw in a run.
#[derive(Debug, Clone)]
pub struct SimRng(pub SmallRng);

impl SimRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }
}
