//! Phase models convert observation time into pulse phase.
use crate::error::ConfigurationError;
use pulsar_common::{Phase, Time};
use serde::Deserialize;

/// Implement for anything which maps time to pulse phase.
///
/// The phase must be finite and non-decreasing over every time range that is sampled.
/// This is checked by the sampler, which reports a violation rather than clamping it.
pub trait PhaseModel {
    /// Returns the pulse phase, in turns, at time `t`.
    fn phase(&self, t: Time) -> Phase;

    /// Evaluates the phase at each of `times`, writing the results to `phases`.
    ///
    /// Both slices have the same length. Override this if the model can evaluate
    /// a sequence faster than point by point.
    fn eval_phases(&self, times: &[Time], phases: &mut [Phase]) {
        for (phase, &t) in phases.iter_mut().zip(times) {
            *phase = self.phase(t);
        }
    }
}

impl<F> PhaseModel for F
where
    F: Fn(Time) -> Phase,
{
    fn phase(&self, t: Time) -> Phase {
        self(t)
    }
}

/// A pulsar spinning with constant frequency derivative.
///
/// ```text
/// phase(t) = phi0 + f (t - t0) + fdot (t - t0)^2 / 2
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawConstantAcceleration")]
pub struct ConstantAccelerationPhaseModel {
    phi0: Phase,
    frequency: f64,
    frequency_derivative: f64,
    t0: Time,
}

impl ConstantAccelerationPhaseModel {
    /// # Parameters
    /// - phi0: phase at the reference time.
    /// - frequency: pulse frequency at the reference time, must be positive.
    /// - frequency_derivative: rate of change of the frequency.
    /// - t0: the reference time.
    pub fn new(
        phi0: Phase,
        frequency: f64,
        frequency_derivative: f64,
        t0: Time,
    ) -> Result<Self, ConfigurationError> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(ConfigurationError::NonPositiveFrequency(frequency));
        }
        for (name, value) in [
            ("phi0", phi0),
            ("frequency-derivative", frequency_derivative),
            ("t0", t0),
        ] {
            if !value.is_finite() {
                return Err(ConfigurationError::NotFinite(name));
            }
        }
        Ok(Self {
            phi0,
            frequency,
            frequency_derivative,
            t0,
        })
    }

    /// Returns the instantaneous pulse frequency at time `t`.
    pub fn frequency_at(&self, t: Time) -> f64 {
        self.frequency + self.frequency_derivative * (t - self.t0)
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }
}

impl PhaseModel for ConstantAccelerationPhaseModel {
    fn phase(&self, t: Time) -> Phase {
        let dt = t - self.t0;
        self.phi0 + dt * (self.frequency + 0.5 * self.frequency_derivative * dt)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawConstantAcceleration {
    #[serde(default)]
    phi0: Phase,
    frequency: f64,
    #[serde(default)]
    frequency_derivative: f64,
    #[serde(default)]
    t0: Time,
}

impl TryFrom<RawConstantAcceleration> for ConstantAccelerationPhaseModel {
    type Error = ConfigurationError;

    fn try_from(raw: RawConstantAcceleration) -> Result<Self, Self::Error> {
        Self::new(raw.phi0, raw.frequency, raw.frequency_derivative, raw.t0)
    }
}
