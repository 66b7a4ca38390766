//! Command line parameters of the simulator's modes.
use clap::{Parser, Subcommand};
use pulsar_profile::ProfileConfig;
use std::path::PathBuf;

/// Encapsulates the parameters of the simulate mode.
#[derive(Debug, Clone, Parser)]
pub(crate) struct SimulateParameters {
    /// Path to the JSON file describing the simulation.
    #[clap(long)]
    pub(crate) config: PathBuf,

    /// File to write the simulated samples to, as CSV. If not given, samples are written to stdout.
    #[clap(long)]
    pub(crate) output: Option<PathBuf>,
}

/// Encapsulates the parameters of the describe mode.
#[derive(Debug, Clone, Parser)]
pub(crate) struct DescribeParameters {
    #[clap(flatten)]
    pub(crate) profile: ProfileConfig,

    /// Length of each time sample.
    #[clap(long, default_value = "0.001")]
    pub(crate) dt_sample: f64,

    /// Pulse frequency.
    #[clap(long, default_value = "1.0")]
    pub(crate) pulse_freq: f64,

    /// Total duration of the pulse train.
    #[clap(long, default_value = "60.0")]
    pub(crate) total_time: f64,

    /// RMS noise fluctuation in each time sample.
    #[clap(long, default_value = "1.0")]
    pub(crate) sample_rms: f64,

    /// Number of Fourier coefficients to print.
    #[clap(long, default_value = "8")]
    pub(crate) num_harmonics: usize,
}

/// Specifies what the simulator does, and wraps the mode-specific options in each variant.
#[derive(Subcommand, Debug)]
pub(crate) enum Mode {
    /// Simulates the pulsars described by a JSON file, plus noise, and writes the samples as CSV.
    Simulate(SimulateParameters),
    /// Prints the derived properties and signal-to-noise of a single pulse profile.
    Describe(DescribeParameters),
}
