//! Intervention System
//!
//! Scheduled perturbations applied at the start of a simulated year, before
//! any fault's own advance. Schedules are read from JSON:
//!
//! ```json
//! [
//!   { "year": 1200, "action": { "type": "force_rupture", "fault": 0 } },
//!   { "year": 1500, "action": { "type": "push", "fault": 1, "magnitude": 0.05 } }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Types of interventions that can be applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InterventionType {
    /// Overwrite a fault's phase
    SetPhase { fault: usize, phase: f64 },
    /// Push a fault through the coseismic push path (may rupture and cascade)
    Push { fault: usize, magnitude: f64 },
    /// Rupture a fault immediately, with its full cascade
    ForceRupture { fault: usize },
}

impl InterventionType {
    /// Index of the targeted fault.
    pub fn fault(&self) -> usize {
        match *self {
            InterventionType::SetPhase { fault, .. }
            | InterventionType::Push { fault, .. }
            | InterventionType::ForceRupture { fault } => fault,
        }
    }
}

/// An intervention and the year it applies in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub year: u64,
    pub action: InterventionType,
}

impl Intervention {
    pub fn new(year: u64, action: InterventionType) -> Self {
        Self { year, action }
    }
}

/// Pending interventions ordered by year.
///
/// Interventions sharing a year keep their file order.
#[derive(Debug, Clone, Default)]
pub struct InterventionSchedule {
    pending: VecDeque<Intervention>,
}

impl InterventionSchedule {
    pub fn new(mut interventions: Vec<Intervention>) -> Self {
        interventions.sort_by_key(|i| i.year);
        Self {
            pending: interventions.into(),
        }
    }

    /// Parses a JSON array of interventions.
    pub fn from_json(content: &str) -> Result<Self, InterventionError> {
        let interventions: Vec<Intervention> = serde_json::from_str(content)?;
        Ok(Self::new(interventions))
    }

    /// Loads a JSON array of interventions from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InterventionError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Removes and returns every intervention due in `year`.
    ///
    /// Interventions scheduled for earlier years can no longer apply; they are
    /// dropped with a warning.
    pub fn take_due(&mut self, year: u64) -> Vec<Intervention> {
        let mut due = Vec::new();
        while let Some(next) = self.pending.front() {
            if next.year > year {
                break;
            }
            if let Some(intervention) = self.pending.pop_front() {
                if intervention.year < year {
                    warn!(
                        "Dropping intervention scheduled for year {} (already at year {})",
                        intervention.year, year
                    );
                } else {
                    due.push(intervention);
                }
            }
        }
        due
    }
}

/// Errors that can occur loading an intervention schedule.
#[derive(Debug, thiserror::Error)]
pub enum InterventionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
