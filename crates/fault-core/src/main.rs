//! Coupled fault-cycle simulator
//!
//! Runs a network of stress-cycle oscillators over a long horizon and writes
//! per-fault phase histories and rupture years for external analysis.

use clap::Parser;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use fault_core::config::DEFAULT_CONFIG_PATH;
use fault_core::{InterventionSchedule, LoadingMode, SimConfig};
use rupture_events::{inter_event_times, short_gap_fraction, Histogram};

/// Command line arguments for the simulator
#[derive(Parser, Debug)]
#[command(name = "fault_sim")]
#[command(about = "Coupled stress-cycle fault simulator")]
struct Args {
    /// TOML configuration file (defaults to ./fault_sim.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of years to simulate
    #[arg(long)]
    years: Option<u64>,

    /// Loading mode: linear or nonlinear
    #[arg(long)]
    mode: Option<LoadingMode>,

    /// JSON file of scheduled interventions
    #[arg(long)]
    interventions: Option<PathBuf>,

    /// Where to write the simulation output
    #[arg(long, default_value = "output/simulation.json")]
    output: PathBuf,

    /// Also write the rupture log as JSON lines
    #[arg(long)]
    events: Option<PathBuf>,

    /// Leave per-year phase samples out of the output
    #[arg(long)]
    no_history: bool,

    /// Stop at the end of the year in which this many ruptures have occurred
    #[arg(long)]
    max_ruptures: Option<usize>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Args::parse()) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => SimConfig::load(DEFAULT_CONFIG_PATH)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(years) = args.years {
        config.simulation.years = years;
    }
    if let Some(mode) = args.mode {
        config.simulation.mode = mode;
    }
    if args.no_history {
        config.simulation.record_history = false;
    }
    config.validate()?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let mode = config.simulation.mode;
    let years = config.simulation.years;

    println!("Coupled Fault Simulator");
    println!("=======================");
    println!("Seed: {}", config.simulation.seed);
    println!("Years: {}", years);
    println!("Mode: {}", mode);
    println!("Faults: {}", config.faults.len());
    println!("Push magnitude: {}", config.coupling.push_magnitude);
    println!();

    let mut network = config.build_network()?;
    if let Some(path) = &args.interventions {
        let schedule = InterventionSchedule::load(path)?;
        println!("Loaded {} interventions from {}", schedule.len(), path.display());
        network.set_interventions(schedule);
    }

    let progress_interval = (years / 10).max(1);
    let mut ruptures_so_far = 0usize;
    let summary = network.run_while(years, mode, |report| {
        ruptures_so_far += report.ruptures();
        if report.year > 0 && report.year % progress_interval == 0 {
            tracing::info!("Year {} / {} ({} ruptures)", report.year, years, ruptures_so_far);
        }
        args.max_ruptures.map_or(true, |max| ruptures_so_far < max)
    })?;

    let output = network.to_output(config.simulation.record_history);
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    output.write_json(&args.output)?;
    println!("Wrote {}", args.output.display());

    if let Some(path) = &args.events {
        let mut writer = BufWriter::new(fs::File::create(path)?);
        for event in network.ruptures() {
            writeln!(writer, "{}", event.to_jsonl()?)?;
        }
        writer.flush()?;
        println!("Wrote {} rupture events to {}", network.ruptures().len(), path.display());
    }

    println!();
    println!(
        "Simulated {} years{}: {} ruptures ({} triggered by neighbors), {} pushes",
        summary.years_run,
        if summary.stopped_early { " (stopped early)" } else { "" },
        summary.ruptures,
        summary.triggered_ruptures,
        summary.pushes
    );
    for record in &output.faults {
        println!(
            "  fault {} (R = {} yr): {} ruptures",
            record.index,
            record.recurrence_interval,
            record.event_years.len()
        );
    }

    let gaps = inter_event_times(&output.merged_event_years());
    let histogram = Histogram::from_values(&gaps, 10, 100);
    println!(
        "Inter-event times: {} gaps, {:.2}% at most 1 year, {:.2}% under 10 years",
        gaps.len(),
        100.0 * short_gap_fraction(&gaps, 1),
        100.0 * histogram.leading_fraction()
    );

    Ok(())
}
