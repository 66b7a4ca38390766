//! Approximate signal-to-noise of the pulsar in noisy, finitely resolved time samples.
use super::VonMisesProfile;
use crate::error::{ArgumentError, ProfileError, require_positive};
use std::f64::consts::PI;

fn sinc(x: f64) -> f64 {
    if x == 0.0 { 1.0 } else { x.sin() / x }
}

impl VonMisesProfile {
    /// Returns the signal-to-noise of a single pulse, for unit amplitude.
    ///
    /// Accounts for the finite time resolution, and for detrending if it was requested.
    /// The result is an approximation: the exact value depends slightly on the arrival times
    /// of the pulses relative to the sample boundaries.
    /// # Parameters
    /// - dt_sample: the length of each time sample.
    /// - pulse_freq: the pulse frequency.
    /// - sample_rms: the RMS noise fluctuation in each time sample.
    pub fn single_pulse_signal_to_noise(
        &self,
        dt_sample: f64,
        pulse_freq: f64,
        sample_rms: f64,
    ) -> Result<f64, ProfileError> {
        require_positive("dt_sample", dt_sample)?;
        require_positive("pulse_freq", pulse_freq)?;
        require_positive("sample_rms", sample_rms)?;

        // Each sample spans this fraction of a period, so one pulse covers its inverse in samples.
        let dphi = dt_sample * pulse_freq;
        Ok((self.sampled_power(dphi) / dphi).sqrt() / sample_rms)
    }

    /// Returns the signal-to-noise of a pulse train lasting `total_time`, for unit amplitude.
    ///
    /// The noise in each of the `total_time / dt_sample` samples is independent, so the
    /// signal-to-noise grows as the square root of the number of pulses.
    pub fn multi_pulse_signal_to_noise(
        &self,
        total_time: f64,
        dt_sample: f64,
        pulse_freq: f64,
        sample_rms: f64,
    ) -> Result<f64, ProfileError> {
        require_positive("total_time", total_time)?;
        let single = self.single_pulse_signal_to_noise(dt_sample, pulse_freq, sample_rms)?;
        if total_time < dt_sample {
            return Err(ArgumentError::TotalTimeShorterThanSample {
                total_time,
                dt_sample,
            }
            .into());
        }
        let num_samples = total_time / dt_sample;
        let samples_per_pulse = 1.0 / (dt_sample * pulse_freq);
        Ok(single * (num_samples / samples_per_pulse).sqrt())
    }

    /// Mean square of the profile after averaging over samples of phase width `dphi`.
    ///
    /// By Parseval this is the sum of `|rho_m|^2` over all harmonics, each attenuated by the
    /// boxcar window of the sample. The DC term is dropped when detrending.
    fn sampled_power(&self, dphi: f64) -> f64 {
        let dc = if self.detrend { 0.0 } else { 1.0 };
        let harmonics = self
            .harmonics
            .iter()
            .enumerate()
            .skip(1)
            .map(|(m, harmonic)| 2.0 * (harmonic * sinc(PI * m as f64 * dphi)).powi(2))
            .sum::<f64>();
        self.template_mean_flux.powi(2) * (dc + harmonics)
    }
}
