//! Fault network: arena, neighbor graph and the shared year loop.
//!
//! Faults live in a `Vec` and refer to each other by [`FaultId`], so cyclic
//! neighbor graphs need no shared ownership. Every year each fault advances
//! once, in a fixed processing order; a fault that crosses its threshold
//! ruptures and its cascade runs to completion before the next fault advances.
//!
//! # Cascades
//!
//! A cascade is driven by an explicit stack of `(fault, next neighbor)` frames.
//! Pushes are delivered in depth-first order: when a pushed neighbor ruptures,
//! its own neighbors are pushed before the next neighbor of the fault that
//! pushed it. A fault whose frame is still on the stack cannot rupture again;
//! a push that would do so raises [`SimError::UnboundedCascade`]. Once its
//! frame has popped, a fault may rupture again in the same cascade.

use rand::Rng;
use rand_distr::StandardNormal;
use rupture_events::{FaultRecord, FaultSpec, LoadingMode, RuptureEvent, RuptureTrigger, SimulationOutput};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::error::{require_non_negative, SimError};
use crate::fault::{Fault, FaultId};
use crate::interventions::{InterventionSchedule, InterventionType};
use crate::load::LoadParams;
use crate::SimRng;

/// Coseismic coupling and threshold noise settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouplingParams {
    /// Phase added to every neighbor of a rupturing fault
    pub push_magnitude: f64,
    /// Phase a pushed fault must exceed to rupture
    pub push_threshold: f64,
    /// Center of the per-cycle rupture threshold
    pub threshold_mean: f64,
    /// Standard deviation of the per-cycle rupture threshold
    pub threshold_noise_std: f64,
}

impl Default for CouplingParams {
    fn default() -> Self {
        Self {
            push_magnitude: 0.01,
            push_threshold: 1.0,
            threshold_mean: 1.0,
            threshold_noise_std: 0.05,
        }
    }
}

impl CouplingParams {
    pub fn validate(&self) -> Result<(), SimError> {
        require_non_negative("coupling.push_magnitude", self.push_magnitude)?;
        require_non_negative("coupling.threshold_noise_std", self.threshold_noise_std)?;
        if !self.push_threshold.is_finite() {
            return Err(SimError::invalid("coupling.push_threshold", "must be finite"));
        }
        if !self.threshold_mean.is_finite() {
            return Err(SimError::invalid("coupling.threshold_mean", "must be finite"));
        }
        Ok(())
    }
}

/// All tunable physics of a network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    pub load: LoadParams,
    pub coupling: CouplingParams,
}

impl NetworkParams {
    pub fn validate(&self) -> Result<(), SimError> {
        self.load.validate()?;
        self.coupling.validate()
    }
}

/// One rupture cascade: the initiating rupture and everything it triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    pub year: u64,
    pub origin: FaultId,
    /// Ruptured faults in the order they failed, starting with `origin`
    pub ruptured: Vec<FaultId>,
    /// Push calls delivered during the cascade
    pub pushes: usize,
}

impl CascadeReport {
    /// Number of ruptures beyond the initiating one.
    pub fn triggered(&self) -> usize {
        self.ruptured.len().saturating_sub(1)
    }
}

/// Everything that happened in one simulated year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearReport {
    pub year: u64,
    pub cascades: Vec<CascadeReport>,
}

impl YearReport {
    fn new(year: u64) -> Self {
        Self {
            year,
            cascades: Vec::new(),
        }
    }

    pub fn ruptures(&self) -> usize {
        self.cascades.iter().map(|c| c.ruptured.len()).sum()
    }

    pub fn pushes(&self) -> usize {
        self.cascades.iter().map(|c| c.pushes).sum()
    }
}

/// Totals for a call to [`FaultNetwork::run`] or [`FaultNetwork::run_while`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub first_year: u64,
    pub years_run: u64,
    pub ruptures: usize,
    /// Ruptures caused by a neighbor's push
    pub triggered_ruptures: usize,
    pub pushes: usize,
    /// True if the caller stopped the run before the requested year
    pub stopped_early: bool,
}

impl RunSummary {
    fn record(&mut self, report: &YearReport) {
        self.years_run += 1;
        self.ruptures += report.ruptures();
        self.triggered_ruptures += report.cascades.iter().map(CascadeReport::triggered).sum::<usize>();
        self.pushes += report.pushes();
    }
}

/// Owns every fault and drives the shared time axis.
#[derive(Debug)]
pub struct FaultNetwork {
    faults: Vec<Fault>,
    order: Vec<FaultId>,
    params: NetworkParams,
    rng: SimRng,
    seed: u64,
    horizon: u64,
    next_year: u64,
    mode: Option<LoadingMode>,
    ruptures: Vec<RuptureEvent>,
    push_count: u64,
    interventions: InterventionSchedule,
}

impl FaultNetwork {
    /// Builds a network in two phases: all faults first, then neighbor links.
    ///
    /// Initial thresholds are drawn in construction order. Neighbor lists are
    /// treated as sets; repeated indices keep their first position.
    pub fn build(
        specs: &[FaultSpec],
        horizon: u64,
        params: NetworkParams,
        seed: u64,
    ) -> Result<Self, SimError> {
        params.validate()?;
        if specs.is_empty() {
            return Err(SimError::invalid("faults", "a network needs at least one fault"));
        }

        let mut rng = SimRng::from_seed(seed);
        let mut faults = Vec::with_capacity(specs.len());
        for spec in specs {
            let threshold = sample_threshold(&mut rng, &params.coupling);
            faults.push(Fault::new(
                spec.recurrence_interval,
                horizon,
                spec.initial_phase,
                threshold,
            )?);
        }

        for (index, spec) in specs.iter().enumerate() {
            let mut neighbors: Vec<FaultId> = Vec::with_capacity(spec.neighbors.len());
            for &neighbor in &spec.neighbors {
                if neighbor >= specs.len() {
                    return Err(SimError::invalid(
                        "neighbors",
                        format!("fault {index} lists unknown neighbor {neighbor}"),
                    ));
                }
                if neighbor == index {
                    return Err(SimError::invalid(
                        "neighbors",
                        format!("fault {index} lists itself as a neighbor"),
                    ));
                }
                if !neighbors.contains(&FaultId(neighbor)) {
                    neighbors.push(FaultId(neighbor));
                }
            }
            faults[index].set_neighbors(neighbors);
        }

        debug!(
            "Built fault network: {} faults, horizon {} years, seed {}",
            faults.len(),
            horizon,
            seed
        );

        Ok(Self {
            order: (0..faults.len()).map(FaultId).collect(),
            faults,
            params,
            rng,
            seed,
            horizon,
            next_year: 0,
            mode: None,
            ruptures: Vec::new(),
            push_count: 0,
            interventions: InterventionSchedule::default(),
        })
    }

    /// Sets the per-year processing order. Must be a permutation of all faults.
    pub fn set_order(&mut self, order: Vec<FaultId>) -> Result<(), SimError> {
        let mut seen = vec![false; self.faults.len()];
        for id in &order {
            match seen.get_mut(id.0) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(SimError::invalid("order", format!("{id} appears more than once")))
                }
                None => return Err(SimError::invalid("order", format!("{id} does not exist"))),
            }
        }
        if order.len() != self.faults.len() {
            return Err(SimError::invalid(
                "order",
                format!("expected {} faults, got {}", self.faults.len(), order.len()),
            ));
        }
        self.order = order;
        Ok(())
    }

    /// Replaces the scheduled interventions.
    pub fn set_interventions(&mut self, schedule: InterventionSchedule) {
        self.interventions = schedule;
    }

    pub fn faults(&self) -> &[Fault] {
        &self.faults
    }

    pub fn fault(&self, id: FaultId) -> Option<&Fault> {
        self.faults.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.faults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    pub fn order(&self) -> &[FaultId] {
        &self.order
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn horizon(&self) -> u64 {
        self.horizon
    }

    /// The next year [`FaultNetwork::step_year`] will process.
    pub fn next_year(&self) -> u64 {
        self.next_year
    }

    /// Chronological log of every rupture so far.
    pub fn ruptures(&self) -> &[RuptureEvent] {
        &self.ruptures
    }

    /// Total push calls delivered so far.
    pub fn push_count(&self) -> u64 {
        self.push_count
    }

    /// Overwrites a fault's phase (for priming controlled scenarios).
    pub fn set_phase(&mut self, id: FaultId, phase: f64) -> Result<(), SimError> {
        self.fault_mut(id)?.set_phase(phase)
    }

    /// Advances every fault by one year in processing order.
    ///
    /// Interventions due this year are applied first. A rupture's cascade
    /// completes before the next fault's scheduled advance.
    pub fn step_year(&mut self, mode: LoadingMode) -> Result<YearReport, SimError> {
        let year = self.current_year()?;
        self.mode = Some(mode);
        let mut report = YearReport::new(year);

        for intervention in self.interventions.take_due(year) {
            if let Some(cascade) = self.apply_intervention(&intervention.action)? {
                report.cascades.push(cascade);
            }
        }

        let load = self.params.load;
        for position in 0..self.order.len() {
            let id = self.order[position];
            if self.faults[id.0].advance(year, mode, &load)? {
                let cascade = self.cascade(id, year, RuptureTrigger::Loading)?;
                report.cascades.push(cascade);
            }
        }

        self.next_year += 1;
        Ok(report)
    }

    /// Runs every remaining year before `years`.
    pub fn run(&mut self, years: u64, mode: LoadingMode) -> Result<RunSummary, SimError> {
        self.run_while(years, mode, |_| true)
    }

    /// Runs every remaining year before `years`, asking `keep_going` after each one.
    ///
    /// The run can only stop on a year boundary; returning `false` leaves the
    /// network ready to resume from the following year.
    pub fn run_while<F>(
        &mut self,
        years: u64,
        mode: LoadingMode,
        mut keep_going: F,
    ) -> Result<RunSummary, SimError>
    where
        F: FnMut(&YearReport) -> bool,
    {
        let mut summary = RunSummary {
            first_year: self.next_year,
            ..RunSummary::default()
        };
        info!(
            "Starting {} run: years {}..{} across {} faults",
            mode,
            self.next_year,
            years,
            self.faults.len()
        );

        while self.next_year < years {
            let report = self.step_year(mode)?;
            summary.record(&report);
            if !keep_going(&report) {
                summary.stopped_early = self.next_year < years;
                if summary.stopped_early {
                    info!("Run stopped by caller after year {}", report.year);
                }
                break;
            }
        }

        info!(
            "Run complete: {} years, {} ruptures ({} triggered), {} pushes",
            summary.years_run, summary.ruptures, summary.triggered_ruptures, summary.pushes
        );
        Ok(summary)
    }

    /// Forces `id` to rupture in the year being simulated and runs the cascade.
    ///
    /// The rupture is logged in [`next_year`](Self::next_year), so event years
    /// stay in step with the year loop.
    pub fn trigger_rupture(&mut self, id: FaultId) -> Result<CascadeReport, SimError> {
        self.fault_mut(id)?;
        let year = self.current_year()?;
        self.cascade(id, year, RuptureTrigger::Forced)
    }

    /// Applies one intervention in the year being simulated.
    ///
    /// Interventions naming unknown faults are skipped. Nothing is changed once
    /// the horizon has been reached.
    pub fn apply_intervention(
        &mut self,
        action: &InterventionType,
    ) -> Result<Option<CascadeReport>, SimError> {
        let year = self.current_year()?;
        let id = FaultId(action.fault());
        if self.fault(id).is_none() {
            warn!("Skipping intervention for unknown {} in year {}", id, year);
            return Ok(None);
        }

        match *action {
            InterventionType::SetPhase { phase, .. } => {
                self.set_phase(id, phase)?;
                Ok(None)
            }
            InterventionType::Push { magnitude, .. } => {
                require_non_negative("intervention.magnitude", magnitude)?;
                let threshold = self.params.coupling.push_threshold;
                if self.faults[id.0].receive_push(magnitude, threshold) {
                    self.trigger_rupture(id).map(Some)
                } else {
                    Ok(None)
                }
            }
            InterventionType::ForceRupture { .. } => self.trigger_rupture(id).map(Some),
        }
    }

    /// Snapshot of the run for external analysis.
    ///
    /// Phase histories are cut to the years actually simulated.
    pub fn to_output(&self, include_history: bool) -> SimulationOutput {
        let simulated = self.next_year as usize;
        let faults = self
            .faults
            .iter()
            .enumerate()
            .map(|(index, fault)| FaultRecord {
                index,
                recurrence_interval: fault.recurrence_interval(),
                event_years: fault.event_years().to_vec(),
                phase_history: if include_history {
                    fault.phase_history()[..simulated].to_vec()
                } else {
                    Vec::new()
                },
            })
            .collect();

        SimulationOutput {
            seed: self.seed,
            mode: self.mode.unwrap_or_default(),
            horizon: self.horizon,
            years_simulated: self.next_year,
            faults,
            ruptures: self.ruptures.clone(),
        }
    }

    /// The year being simulated, or `YearOutOfRange` once the horizon is reached.
    fn current_year(&self) -> Result<u64, SimError> {
        if self.next_year >= self.horizon {
            return Err(SimError::YearOutOfRange {
                year: self.next_year,
                horizon: self.horizon,
            });
        }
        Ok(self.next_year)
    }

    fn fault_mut(&mut self, id: FaultId) -> Result<&mut Fault, SimError> {
        let count = self.faults.len();
        self.faults
            .get_mut(id.0)
            .ok_or_else(|| SimError::invalid("fault", format!("{id} does not exist ({count} faults)")))
    }

    /// Ruptures `origin` and delivers pushes until no frame has neighbors left.
    fn cascade(
        &mut self,
        origin: FaultId,
        year: u64,
        trigger: RuptureTrigger,
    ) -> Result<CascadeReport, SimError> {
        let CouplingParams {
            push_magnitude,
            push_threshold,
            ..
        } = self.params.coupling;
        let mut on_stack = vec![false; self.faults.len()];
        let mut report = CascadeReport {
            year,
            origin,
            ruptured: vec![origin],
            pushes: 0,
        };

        on_stack[origin.0] = true;
        self.rupture(origin, year, trigger);

        let mut stack: Vec<(FaultId, usize)> = vec![(origin, 0)];
        while let Some(&(source, cursor)) = stack.last() {
            let Some(&target) = self.faults[source.0].neighbors().get(cursor) else {
                on_stack[source.0] = false;
                stack.pop();
                continue;
            };
            if let Some(frame) = stack.last_mut() {
                frame.1 += 1;
            }

            report.pushes += 1;
            self.push_count += 1;
            if !self.faults[target.0].receive_push(push_magnitude, push_threshold) {
                continue;
            }
            if on_stack[target.0] {
                return Err(SimError::UnboundedCascade {
                    fault: target.0,
                    year,
                });
            }

            on_stack[target.0] = true;
            self.rupture(target, year, RuptureTrigger::Push { source: source.0 });
            report.ruptured.push(target);
            stack.push((target, 0));
        }

        if report.triggered() > 0 {
            debug!(
                "Year {}: {} triggered {} ruptures with {} pushes",
                year,
                origin,
                report.triggered(),
                report.pushes
            );
        }
        Ok(report)
    }

    fn rupture(&mut self, id: FaultId, year: u64, trigger: RuptureTrigger) {
        let next_threshold = sample_threshold(&mut self.rng, &self.params.coupling);
        let fault = &mut self.faults[id.0];
        let event = RuptureEvent::new(id.0, year, trigger, fault.phase(), fault.phase_threshold());
        fault.rupture(year, next_threshold);
        trace!("Year {}: {} ruptured at phase {:.4}", year, id, event.phase_at_failure);
        self.ruptures.push(event);
    }
}

/// Draws one per-cycle threshold: `mean + N(0, 1) * std`.
fn sample_threshold(rng: &mut SimRng, coupling: &CouplingParams) -> f64 {
    let z: f64 = rng.0.sample(StandardNormal);
    coupling.threshold_mean + z * coupling.threshold_noise_std
}
