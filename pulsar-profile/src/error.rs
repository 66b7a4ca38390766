//! Errors reported by profile construction and evaluation.
use thiserror::Error;

/// Rejected constructor arguments.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Duty cycle {0} is not in the open interval (0, 1)")]
    DutyCycleOutOfRange(f64),
    #[error("Grid resolution {0} is below the minimum of {1} phase bins")]
    GridResolutionTooSmall(usize, usize),
    #[error("Grid resolution {0} exceeds the maximum of {1} phase bins")]
    GridResolutionTooLarge(usize, usize),
    #[error("Duty cycle {0} is too narrow to resolve with at most {1} phase bins")]
    DutyCycleTooNarrow(f64, usize),
    #[error("Pulse frequency {0} must be positive and finite")]
    NonPositiveFrequency(f64),
    #[error("Phase model parameter '{0}' is not finite")]
    NotFinite(&'static str),
}

/// Rejected call-time arguments.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("Argument '{name}' must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("Argument '{0}' is not finite")]
    NotFinite(&'static str),
    #[error("End time {t1} precedes start time {t0}")]
    TimeRangeReversed { t0: f64, t1: f64 },
    #[error("Phase interval [{phi0}, {phi1}] must have width in [0, 1]")]
    IntervalWidthOutOfRange { phi0: f64, phi1: f64 },
    #[error("Phase model is not monotonic in sample {index}: phase {phi1} follows {phi0}")]
    NonMonotonicPhase { index: usize, phi0: f64, phi1: f64 },
    #[error("Phase model returned a non-finite phase at time {0}")]
    NonFinitePhase(f64),
    #[error("Total time {total_time} is shorter than the sample length {dt_sample}")]
    TotalTimeShorterThanSample { total_time: f64, dt_sample: f64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProfileError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),
}

/// Checks that `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, ArgumentError> {
    if !value.is_finite() {
        Err(ArgumentError::NotFinite(name))
    } else if value <= 0.0 {
        Err(ArgumentError::NonPositive { name, value })
    } else {
        Ok(value)
    }
}

/// Checks that `value` is finite.
pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<f64, ArgumentError> {
    value
        .is_finite()
        .then_some(value)
        .ok_or(ArgumentError::NotFinite(name))
}
