//! Defines the parameters used to construct a pulse profile.
use clap::Args;
use serde::Deserialize;

/// Encapsulates the parameters of a von Mises pulse profile.
///
/// Can be read from a kebab-case JSON object, or flattened into a [clap] command line.
#[derive(Debug, Clone, PartialEq, Deserialize, Args)]
#[serde(rename_all = "kebab-case")]
pub struct ProfileConfig {
    /// Pulse full width at half maximum, as a fraction of the pulse period.
    #[clap(long, default_value = "0.1")]
    pub duty_cycle: f64,

    /// If set, the mean flux is subtracted from the profile.
    #[clap(long)]
    #[serde(default)]
    pub detrend: bool,

    /// Number of phase bins used internally. If zero, a value is chosen from the duty cycle.
    #[clap(long, default_value = "0")]
    #[serde(default)]
    pub grid_resolution: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            duty_cycle: 0.1,
            detrend: false,
            grid_resolution: 0,
        }
    }
}
