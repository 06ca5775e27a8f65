//! Shared rupture catalog types for the fault-cycle simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! The engine in `fault-core` produces them; analysis code consumes them.

pub mod catalog;
pub mod event;
pub mod record;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export event types
pub use event::{RuptureEvent, RuptureTrigger};

// Re-export record types
pub use record::{
    FaultRecord, FaultSpec, LoadingMode, OutputError, ParseModeError, SimulationOutput,
};

// Re-export catalog helpers
pub use catalog::{
    inter_event_times, mean_nearest_offset, merge_event_years, short_gap_fraction, Histogram,
};
