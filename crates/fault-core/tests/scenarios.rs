//! End-to-end scenarios for isolated and coupled faults.

use fault_core::{
    CouplingParams, FaultNetwork, InterventionSchedule, LoadingMode, NetworkParams,
    RuptureTrigger, SimError,
};
use rupture_events::{
    fixtures, inter_event_times, mean_nearest_offset, short_gap_fraction, FaultSpec,
};

fn quiet_params() -> NetworkParams {
    NetworkParams {
        coupling: CouplingParams {
            threshold_noise_std: 0.0,
            ..CouplingParams::default()
        },
        ..NetworkParams::default()
    }
}

fn zero_gap_fraction(network: &FaultNetwork) -> f64 {
    let gaps = inter_event_times(&network.to_output(false).merged_event_years());
    short_gap_fraction(&gaps, 0)
}

#[test]
fn test_isolated_linear_fault_rate() {
    let years = 100_000;
    let mut network =
        FaultNetwork::build(&fixtures::isolated(400.0), years, NetworkParams::default(), 3)
            .unwrap();
    network.run(years, LoadingMode::Linear).unwrap();

    let count = network.faults()[0].event_years().len();
    // years / recurrence_interval = 250, less a little for discrete stepping
    assert!((240..=260).contains(&count), "got {count} ruptures");
}

#[test]
fn test_phase_restarts_from_zero_after_each_rupture() {
    let years = 20_000;
    let mut network =
        FaultNetwork::build(&fixtures::isolated(400.0), years, NetworkParams::default(), 8)
            .unwrap();
    network.run(years, LoadingMode::Linear).unwrap();

    let fault = &network.faults()[0];
    let history = fault.phase_history();
    assert!(!fault.event_years().is_empty());
    for &year in fault.event_years() {
        let y = year as usize;
        if y + 1 < history.len() {
            // Exactly one increment above zero the following year
            assert_eq!(history[y + 1], 1.0 / 400.0, "year {year}");
        }
    }
    for event in network.ruptures() {
        assert_eq!(event.trigger, RuptureTrigger::Loading);
        assert!(event.phase_at_failure > event.threshold);
    }
}

#[test]
fn test_isolated_nonlinear_cycle_reaches_one() {
    let mut network = FaultNetwork::build(&fixtures::isolated(400.0), 1_000, quiet_params(), 1)
        .unwrap();
    network.run(400, LoadingMode::Nonlinear).unwrap();

    let fault = &network.faults()[0];
    assert!(fault.event_years().is_empty());
    assert!((fault.phase_history()[399] - 1.0).abs() < 0.01);
    // Fast early reloading: over 40% of the cycle's phase within the first fifth
    assert!(fault.phase_history()[79] > 0.4);
}

#[test]
fn test_event_years_strictly_increasing() {
    for mode in [LoadingMode::Linear, LoadingMode::Nonlinear] {
        let years = 200_000;
        let mut network =
            FaultNetwork::build(&fixtures::reference_pair(), years, NetworkParams::default(), 17)
                .unwrap();
        network.run(years, mode).unwrap();

        for fault in network.faults() {
            assert!(
                fault.event_years().windows(2).all(|w| w[0] < w[1]),
                "{mode} rupture years must be strictly increasing"
            );
        }
    }
}

#[test]
fn test_clique_cascades_stay_bounded() {
    let n = 4;
    let years = 100_000;
    let mut network =
        FaultNetwork::build(&fixtures::clique(n, 500.0), years, NetworkParams::default(), 21)
            .unwrap();

    let mut largest = 0;
    network
        .run_while(years, LoadingMode::Nonlinear, |report| {
            for cascade in &report.cascades {
                assert!(cascade.ruptured.len() <= n);
                assert!(cascade.pushes <= n * (n - 1));
                largest = largest.max(cascade.ruptured.len());
            }
            true
        })
        .unwrap();

    assert!(largest >= 1);
    assert!(network.ruptures().iter().any(|e| e.trigger.is_triggered()));
}

#[test]
fn test_oversized_push_is_detected() {
    let mut params = NetworkParams::default();
    params.coupling.push_magnitude = 2.0;
    let mut network = FaultNetwork::build(&fixtures::reference_pair(), 5_000, params, 4).unwrap();

    let result = network.run(5_000, LoadingMode::Linear);
    assert!(matches!(result, Err(SimError::UnboundedCascade { .. })));
}

/// Two linear faults, 400 and 700 years, coupled by a 0.01 push
#[test]
fn test_linear_pair_over_a_million_years() {
    let years = 1_000_000;
    let mut network =
        FaultNetwork::build(&fixtures::reference_pair(), years, NetworkParams::default(), 42)
            .unwrap();
    let summary = network.run(years, LoadingMode::Linear).unwrap();

    let expected = 1e6 / 400.0 + 1e6 / 700.0;
    let total = network.to_output(false).total_ruptures();
    assert_eq!(total, summary.ruptures);
    assert!(
        (total as f64) > expected * 0.97 && (total as f64) < expected * 1.04,
        "got {total} ruptures, expected about {expected:.0}"
    );
}

/// Nonlinear reloading lingers near failure, so pushes trigger far more
/// same-year ruptures than under linear reloading
#[test]
fn test_nonlinear_loading_clusters_ruptures() {
    let years = 1_000_000;
    let mut linear =
        FaultNetwork::build(&fixtures::reference_pair(), years, NetworkParams::default(), 42)
            .unwrap();
    linear.run(years, LoadingMode::Linear).unwrap();

    let mut nonlinear =
        FaultNetwork::build(&fixtures::reference_pair(), years, NetworkParams::default(), 42)
            .unwrap();
    nonlinear.run(years, LoadingMode::Nonlinear).unwrap();

    let linear_zero = zero_gap_fraction(&linear);
    let nonlinear_zero = zero_gap_fraction(&nonlinear);
    assert!(
        nonlinear_zero > 1.5 * linear_zero,
        "nonlinear {nonlinear_zero:.4} vs linear {linear_zero:.4}"
    );
    assert!(nonlinear_zero > 0.02);
}

/// Under nonlinear reloading the pair drifts into alignment: late ruptures of
/// the short fault sit closer to the long fault's than early ones do
#[test]
fn test_nonlinear_pair_drifts_into_alignment() {
    let years = 1_000_000;
    let window = 10_000;
    let mut network =
        FaultNetwork::build(&fixtures::reference_pair(), years, NetworkParams::default(), 42)
            .unwrap();
    network.run(years, LoadingMode::Nonlinear).unwrap();

    let a = network.faults()[0].event_years();
    let b = network.faults()[1].event_years();
    let early = mean_nearest_offset(a, b, 0..window).unwrap();
    let late = mean_nearest_offset(a, b, years - window..years).unwrap();
    assert!(late < early, "early {early:.1} vs late {late:.1}");
}

#[test]
fn test_interventions_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interventions.json");
    std::fs::write(
        &path,
        r#"[
            { "year": 10, "action": { "type": "set_phase", "fault": 1, "phase": 0.995 } },
            { "year": 10, "action": { "type": "force_rupture", "fault": 0 } }
        ]"#,
    )
    .unwrap();

    let specs = vec![
        FaultSpec::new(400.0).with_neighbors([1]),
        FaultSpec::new(700.0).with_neighbors([0]),
    ];
    let mut network = FaultNetwork::build(&specs, 100, quiet_params(), 1).unwrap();
    network.set_interventions(InterventionSchedule::load(&path).unwrap());
    network.run(100, LoadingMode::Linear).unwrap();

    let triggers: Vec<(usize, u64, RuptureTrigger)> = network
        .ruptures()
        .iter()
        .map(|e| (e.fault, e.year, e.trigger))
        .collect();
    assert_eq!(
        triggers,
        vec![
            (0, 10, RuptureTrigger::Forced),
            (1, 10, RuptureTrigger::Push { source: 0 }),
        ]
    );
}

#[test]
fn test_output_file_round_trip() {
    let years = 10_000;
    let mut network =
        FaultNetwork::build(&fixtures::reference_pair(), years, NetworkParams::default(), 5)
            .unwrap();
    network.run(years, LoadingMode::Nonlinear).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");
    let output = network.to_output(true);
    output.write_json(&path).unwrap();

    let loaded = rupture_events::SimulationOutput::read_json(&path).unwrap();
    assert_eq!(loaded.mode, LoadingMode::Nonlinear);
    assert_eq!(loaded.faults[1].phase_history.len(), years as usize);
    assert_eq!(loaded.merged_event_years(), output.merged_event_years());
}
