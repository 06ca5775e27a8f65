//! Rupture catalog read-out helpers.
//!
//! The engine only reports per-fault rupture years. These helpers do the
//! merging and gap bookkeeping needed to compare clustering between runs.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Merges several per-fault rupture catalogs into one sorted timeline.
///
/// Simultaneous ruptures on different faults are kept as repeated years.
pub fn merge_event_years<'a>(catalogs: impl IntoIterator<Item = &'a [u64]>) -> Vec<u64> {
    let mut merged: Vec<u64> = catalogs.into_iter().flatten().copied().collect();
    merged.sort_unstable();
    merged
}

/// Gaps between consecutive entries of a sorted timeline.
pub fn inter_event_times(sorted_years: &[u64]) -> Vec<u64> {
    sorted_years
        .windows(2)
        .map(|pair| pair[1].saturating_sub(pair[0]))
        .collect()
}

/// Fraction of gaps no longer than `max_gap` years. Returns 0.0 for no gaps.
pub fn short_gap_fraction(gaps: &[u64], max_gap: u64) -> f64 {
    if gaps.is_empty() {
        return 0.0;
    }
    let short = gaps.iter().filter(|&&gap| gap <= max_gap).count();
    short as f64 / gaps.len() as f64
}

/// Mean distance from each event of `a` inside `window` to the nearest event of `b`.
///
/// `b` must be sorted. Returns `None` when `b` is empty or no event of `a`
/// falls inside the window. Smaller values mean the two faults rupture in
/// closer alignment.
pub fn mean_nearest_offset(a: &[u64], b: &[u64], window: Range<u64>) -> Option<f64> {
    if b.is_empty() {
        return None;
    }

    let mut total = 0u64;
    let mut count = 0u64;
    for &year in a.iter().filter(|y| window.contains(*y)) {
        let idx = b.partition_point(|&other| other < year);
        let after = b.get(idx).map(|&other| other - year);
        let before = idx.checked_sub(1).map(|i| year - b[i]);
        let nearest = match (before, after) {
            (Some(x), Some(y)) => x.min(y),
            (Some(x), None) | (None, Some(x)) => x,
            (None, None) => continue,
        };
        total += nearest;
        count += 1;
    }

    (count > 0).then(|| total as f64 / count as f64)
}

/// Fixed-width histogram of non-negative integer values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    pub bin_width: u64,
    pub counts: Vec<usize>,
    /// Values at or beyond `bin_width * counts.len()`
    pub overflow: usize,
}

impl Histogram {
    /// Bins `values` into `bins` buckets of `bin_width` (a zero width is treated as 1).
    pub fn from_values(values: &[u64], bin_width: u64, bins: usize) -> Self {
        let bin_width = bin_width.max(1);
        let mut counts = vec![0usize; bins];
        let mut overflow = 0;

        for &value in values {
            match usize::try_from(value / bin_width).ok().and_then(|i| counts.get_mut(i)) {
                Some(count) => *count += 1,
                None => overflow += 1,
            }
        }

        Self {
            bin_width,
            counts,
            overflow,
        }
    }

    /// Total number of values seen, including overflow.
    pub fn total(&self) -> usize {
        self.counts.iter().sum::<usize>() + self.overflow
    }

    /// Share of values that fell into the first bin.
    pub fn leading_fraction(&self) -> f64 {
        match (self.counts.first(), self.total()) {
            (Some(&first), total) if total > 0 => first as f64 / total as f64,
            _ => 0.0,
        }
    }
}
