//! Fault state machine.
//!
//! A fault is always loading: its phase climbs each year until it exceeds the
//! per-cycle threshold, then the rupture transition resets it to zero and a new
//! threshold is drawn. Faults do not own their neighbors; they hold indices
//! into the [`FaultNetwork`](crate::network::FaultNetwork) arena, which
//! resolves them and runs the cascade.

use rupture_events::LoadingMode;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{require_non_negative, require_positive, SimError};
use crate::load::{self, LoadParams};

/// Stable index of a fault inside its network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaultId(pub usize);

impl FaultId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fault_{}", self.0)
    }
}

/// One seismic source with its stress-cycle state and history.
#[derive(Debug, Clone)]
pub struct Fault {
    recurrence_interval: f64,
    /// Stress / strength ratio, 0 right after a rupture
    phase: f64,
    /// Critical phase for the current cycle
    phase_threshold: f64,
    /// Only advanced by nonlinear loading
    years_since_event: u64,
    phase_history: Vec<f64>,
    event_years: Vec<u64>,
    neighbors: Vec<FaultId>,
}

impl Fault {
    /// Creates a fault with room for `horizon` yearly phase samples.
    pub fn new(
        recurrence_interval: f64,
        horizon: u64,
        initial_phase: f64,
        initial_threshold: f64,
    ) -> Result<Self, SimError> {
        require_positive("recurrence_interval", recurrence_interval)?;
        require_non_negative("initial_phase", initial_phase)?;
        if !initial_threshold.is_finite() {
            return Err(SimError::invalid(
                "phase_threshold",
                format!("must be finite, got {initial_threshold}"),
            ));
        }
        if horizon == 0 {
            return Err(SimError::invalid("horizon", "must be at least one year"));
        }
        let slots = usize::try_from(horizon)
            .map_err(|_| SimError::invalid("horizon", format!("{horizon} years does not fit in memory")))?;

        Ok(Self {
            recurrence_interval,
            phase: initial_phase,
            phase_threshold: initial_threshold,
            years_since_event: 0,
            phase_history: vec![0.0; slots],
            event_years: Vec::new(),
            neighbors: Vec::new(),
        })
    }

    pub fn recurrence_interval(&self) -> f64 {
        self.recurrence_interval
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn phase_threshold(&self) -> f64 {
        self.phase_threshold
    }

    pub fn years_since_event(&self) -> u64 {
        self.years_since_event
    }

    /// Number of yearly samples preallocated for this fault.
    pub fn horizon(&self) -> u64 {
        self.phase_history.len() as u64
    }

    /// Phase after each year's scheduled advance. Years not yet simulated read 0.
    pub fn phase_history(&self) -> &[f64] {
        &self.phase_history
    }

    /// Chronological rupture years.
    pub fn event_years(&self) -> &[u64] {
        &self.event_years
    }

    /// Faults pushed when this one ruptures, in push order.
    pub fn neighbors(&self) -> &[FaultId] {
        &self.neighbors
    }

    pub(crate) fn set_neighbors(&mut self, neighbors: Vec<FaultId>) {
        self.neighbors = neighbors;
    }

    /// Overwrites the current phase without touching the history.
    pub fn set_phase(&mut self, phase: f64) -> Result<(), SimError> {
        self.phase = require_non_negative("phase", phase)?;
        Ok(())
    }

    /// Returns true if the phase has passed this cycle's threshold.
    pub fn is_critical(&self) -> bool {
        self.phase > self.phase_threshold
    }

    /// Applies one year of constant loading.
    ///
    /// Returns whether the fault crossed its threshold and must rupture.
    pub fn advance_linear(&mut self, year: u64) -> Result<bool, SimError> {
        let slot = self.slot(year)?;
        self.phase += load::linear_increment(self.recurrence_interval);
        self.phase_history[slot] = self.phase;
        Ok(self.is_critical())
    }

    /// Applies one year of nonlinear loading.
    ///
    /// Returns whether the fault crossed its threshold and must rupture.
    pub fn advance_nonlinear(&mut self, year: u64, params: &LoadParams) -> Result<bool, SimError> {
        let slot = self.slot(year)?;
        self.phase += load::nonlinear_increment(
            self.years_since_event as f64,
            self.recurrence_interval,
            params,
        );
        self.phase_history[slot] = self.phase;
        self.years_since_event += 1;
        Ok(self.is_critical())
    }

    /// Applies one year of loading in the given mode.
    pub fn advance(
        &mut self,
        year: u64,
        mode: LoadingMode,
        params: &LoadParams,
    ) -> Result<bool, SimError> {
        match mode {
            LoadingMode::Linear => self.advance_linear(year),
            LoadingMode::Nonlinear => self.advance_nonlinear(year, params),
        }
    }

    /// Applies a coseismic push from a rupturing neighbor.
    ///
    /// Pushes are not recorded in the phase history. They are tested against
    /// the fixed `push_threshold`, not the resampled cycle threshold.
    pub fn receive_push(&mut self, magnitude: f64, push_threshold: f64) -> bool {
        self.phase += magnitude;
        self.phase > push_threshold
    }

    /// Rupture transition: records the event and re-enters loading at phase 0.
    pub fn rupture(&mut self, year: u64, next_threshold: f64) {
        self.event_years.push(year);
        self.years_since_event = 0;
        self.phase = 0.0;
        self.phase_threshold = next_threshold;
    }

    fn slot(&self, year: u64) -> Result<usize, SimError> {
        usize::try_from(year)
            .ok()
            .filter(|&slot| slot < self.phase_history.len())
            .ok_or(SimError::YearOutOfRange {
                year,
                horizon: self.horizon(),
            })
    }
}
