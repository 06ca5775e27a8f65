//! Rupture event records.
//!
//! Every rupture the engine performs is logged as a [`RuptureEvent`]. Events
//! serialize to one JSON object per line so long runs can be streamed.
//!
//! # Example
//!
//! ```
//! use rupture_events::{RuptureEvent, RuptureTrigger};
//!
//! let event = RuptureEvent::new(1, 2_400, RuptureTrigger::Push { source: 0 }, 1.004, 1.03);
//! let line = event.to_jsonl().unwrap();
//! assert_eq!(RuptureEvent::from_jsonl(&line).unwrap(), event);
//! ```

use serde::{Deserialize, Serialize};

/// What caused a fault to rupture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuptureTrigger {
    /// The fault's own scheduled loading carried it past its threshold
    Loading,
    /// A coseismic push from the given neighbor carried it past the push threshold
    Push { source: usize },
    /// Rupture imposed from outside the loading cycle (intervention or test harness)
    Forced,
}

impl RuptureTrigger {
    /// Returns true if the rupture was triggered by a neighbor.
    pub fn is_triggered(&self) -> bool {
        matches!(self, RuptureTrigger::Push { .. })
    }
}

/// A single rupture of one fault.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuptureEvent {
    /// Index of the fault in the network
    pub fault: usize,
    /// Simulated year of the rupture
    pub year: u64,
    /// Cause of the rupture
    pub trigger: RuptureTrigger,
    /// Phase the fault had reached when it failed
    pub phase_at_failure: f64,
    /// Loading threshold in force for the cycle that just ended
    pub threshold: f64,
}

impl RuptureEvent {
    /// Creates a new rupture event.
    pub fn new(
        fault: usize,
        year: u64,
        trigger: RuptureTrigger,
        phase_at_failure: f64,
        threshold: f64,
    ) -> Self {
        Self {
            fault,
            year,
            trigger,
            phase_at_failure,
            threshold,
        }
    }

    /// Serializes the event as a single JSON line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses an event from a single JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
