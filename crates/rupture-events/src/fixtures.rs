//! Ready-made fault topologies for tests.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // rupture-events = { path = "../rupture-events", features = ["test-fixtures"] }
//!
//! use rupture_events::fixtures;
//!
//! let specs = fixtures::reference_pair();
//! ```

use crate::FaultSpec;

/// A single fault with no neighbors.
pub fn isolated(recurrence_interval: f64) -> Vec<FaultSpec> {
    vec![FaultSpec::new(recurrence_interval)]
}

/// Two faults that push each other on rupture.
pub fn coupled_pair(first: f64, second: f64) -> Vec<FaultSpec> {
    vec![
        FaultSpec::new(first).with_neighbors([1]),
        FaultSpec::new(second).with_neighbors([0]),
    ]
}

/// The 400 / 700 year mutually coupled pair used in the clustering experiments.
pub fn reference_pair() -> Vec<FaultSpec> {
    coupled_pair(400.0, 700.0)
}

/// `n` faults, each pushing every other one.
pub fn clique(n: usize, recurrence_interval: f64) -> Vec<FaultSpec> {
    (0..n)
        .map(|i| FaultSpec::new(recurrence_interval).with_neighbors((0..n).filter(move |&j| j != i)))
        .collect()
}

/// `n` faults in a one-directional ring (`i` pushes `i + 1`).
pub fn ring(n: usize, recurrence_interval: f64) -> Vec<FaultSpec> {
    (0..n)
        .map(|i| FaultSpec::new(recurrence_interval).with_neighbors([(i + 1) % n]))
        .collect()
}
