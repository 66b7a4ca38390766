//! # Pulsar Simulator
//!
//! The Pulsar Simulator component performs the following functions:
//! * Reads a JSON file describing one or more pulsars, each with a von Mises profile and a
//!   phase model.
//! * Averages each pulsar's flux over a regularly spaced sequence of time samples, in parallel.
//! * Adds Gaussian noise, optionally seeded, and writes the samples as CSV.
//!
//! It can also describe a single profile: its derived constants, Fourier coefficients and
//! signal-to-noise for given sampling parameters.
mod output;
mod parameters;
mod simulation;

use clap::Parser;
use miette::IntoDiagnostic;
use parameters::{DescribeParameters, Mode, SimulateParameters};
use pulsar_common::init_tracer;
use pulsar_profile::VonMisesProfile;
use simulation::Simulation;
use std::{
    fs::File,
    io::{BufReader, BufWriter},
};
use tracing::info;

/// [clap] derived struct to handle command line parameters.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Log filter directive, used if the RUST_LOG environment variable is not set.
    #[clap(long, default_value = "info")]
    log_filter: String,

    #[command(subcommand)]
    mode: Mode,
}

fn main() -> miette::Result<()> {
    let args = Cli::parse();

    init_tracer(&args.log_filter).into_diagnostic()?;

    match &args.mode {
        Mode::Simulate(parameters) => simulate(parameters),
        Mode::Describe(parameters) => describe(parameters),
    }
}

fn simulate(parameters: &SimulateParameters) -> miette::Result<()> {
    let file = File::open(&parameters.config).into_diagnostic()?;
    let simulation: Simulation = serde_json::from_reader(BufReader::new(file)).into_diagnostic()?;
    info!(
        "Simulating {} pulsars in {} samples",
        simulation.pulsars.len(),
        simulation.num_samples
    );

    let trace = simulation.run().into_diagnostic()?;

    match &parameters.output {
        Some(path) => {
            let file = File::create(path).into_diagnostic()?;
            output::write_trace(BufWriter::new(file), &trace).into_diagnostic()?;
            info!("Wrote {} samples to {}", trace.flux.len(), path.display());
        }
        None => output::write_trace(std::io::stdout().lock(), &trace).into_diagnostic()?,
    }
    Ok(())
}

fn describe(parameters: &DescribeParameters) -> miette::Result<()> {
    let profile = VonMisesProfile::from_config(&parameters.profile).into_diagnostic()?;
    let single = profile
        .single_pulse_signal_to_noise(
            parameters.dt_sample,
            parameters.pulse_freq,
            parameters.sample_rms,
        )
        .into_diagnostic()?;
    let multi = profile
        .multi_pulse_signal_to_noise(
            parameters.total_time,
            parameters.dt_sample,
            parameters.pulse_freq,
            parameters.sample_rms,
        )
        .into_diagnostic()?;

    println!("duty-cycle: {}", profile.duty_cycle());
    println!("detrend: {}", profile.detrend());
    println!("kappa: {}", profile.kappa());
    println!("grid-resolution: {}", profile.grid_resolution());
    println!("mean-flux: {}", profile.mean_flux());
    println!("template-mean-flux: {}", profile.template_mean_flux());
    println!("single-pulse-signal-to-noise: {single}");
    println!("multi-pulse-signal-to-noise: {multi}");
    for (m, rho) in profile
        .profile_fft(parameters.num_harmonics)
        .iter()
        .enumerate()
    {
        println!("rho[{m}]: {rho}");
    }
    Ok(())
}
