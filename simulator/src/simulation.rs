use pulsar_common::{Flux, Time};
use pulsar_profile::{
    ConstantAccelerationPhaseModel, ProfileConfig, ProfileError, SampleBuffer, VonMisesProfile,
};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use serde::Deserialize;
use thiserror::Error;
use tracing::{Span, debug, instrument};

///
/// This struct is created from the configuration JSON file.
///
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct Simulation {
    //  Start of the first sample and end of the last
    pub(crate) time_range: Interval<Time>,
    pub(crate) num_samples: usize,
    #[serde(default)]
    pub(crate) noise: Option<NoiseSource>,
    pub(crate) pulsars: Vec<PulsarSource>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct Interval<T>
where
    T: Clone,
{
    pub(crate) min: T,
    pub(crate) max: T,
}

/// Gaussian white noise, added to every sample.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct NoiseSource {
    pub(crate) rms: f64,
    /// If set, the noise is reproducible.
    #[serde(default)]
    pub(crate) seed: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct PulsarSource {
    pub(crate) profile: ProfileConfig,
    pub(crate) phase_model: ConstantAccelerationPhaseModel,
    pub(crate) intensity: Intensity,
}

/// Determines the amplitude of a simulated pulsar.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Intensity {
    /// Peak flux of the pulse, before detrending.
    Amplitude(f64),
    /// Signal-to-noise of the whole pulse train against the configured noise.
    SignalToNoise(f64),
}

#[derive(Debug, Error)]
pub(crate) enum SimulationError {
    #[error("Number of samples must be positive")]
    NoSamples,
    #[error("Time range [{0}, {1}] is empty")]
    EmptyTimeRange(Time, Time),
    #[error("Pulsar {0} specifies a signal-to-noise, but no noise is configured")]
    SignalToNoiseWithoutNoise(usize),
    #[error("Noise rms {0} must be positive")]
    NonPositiveNoise(f64),
    #[error("Invalid Normal Distribution: {0}")]
    NormalDistribution(#[from] rand_distr::NormalError),
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),
}

/// Simulated samples, with the start time of each.
#[derive(Debug)]
pub(crate) struct Trace {
    pub(crate) times: Vec<Time>,
    pub(crate) flux: Vec<Flux>,
}

impl Simulation {
    fn sample_length(&self) -> Time {
        (self.time_range.max - self.time_range.min) / self.num_samples as f64
    }

    #[instrument(skip_all, err(level = "error"), fields(num_pulsars = self.pulsars.len(), num_samples = self.num_samples))]
    pub(crate) fn run(&self) -> Result<Trace, SimulationError> {
        if self.num_samples == 0 {
            return Err(SimulationError::NoSamples);
        }
        let Interval { min: t0, max: t1 } = self.time_range;
        if !(t0 < t1) {
            return Err(SimulationError::EmptyTimeRange(t0, t1));
        }
        let noise_rms = self.noise.as_ref().map(|noise| noise.rms);

        //  Each pulsar is sampled on its own worker, in the span of this method
        let span = Span::current();
        let traces = self
            .pulsars
            .par_iter()
            .enumerate()
            .map(|(index, pulsar)| span.in_scope(|| pulsar.generate(index, self, noise_rms)))
            .collect::<Result<Vec<_>, SimulationError>>()?;

        let mut flux = vec![0.0; self.num_samples];
        for trace in traces {
            for (total, value) in flux.iter_mut().zip(trace) {
                *total += value;
            }
        }
        if let Some(noise) = &self.noise {
            noise.add_to(&mut flux)?;
        }

        let sample_length = self.sample_length();
        let times = (0..self.num_samples)
            .map(|i| t0 + i as f64 * sample_length)
            .collect();
        Ok(Trace { times, flux })
    }
}

impl PulsarSource {
    #[instrument(skip_all, level = "debug", err(level = "error"), fields(index = index, amplitude))]
    fn generate(
        &self,
        index: usize,
        simulation: &Simulation,
        noise_rms: Option<f64>,
    ) -> Result<Vec<Flux>, SimulationError> {
        let profile = VonMisesProfile::from_config(&self.profile)?;
        let Interval { min: t0, max: t1 } = simulation.time_range;

        let amplitude = match self.intensity {
            Intensity::Amplitude(amplitude) => amplitude,
            Intensity::SignalToNoise(snr) => {
                let rms = noise_rms.ok_or(SimulationError::SignalToNoiseWithoutNoise(index))?;
                let pulse_freq = self.phase_model.frequency_at(0.5 * (t0 + t1));
                snr / profile.multi_pulse_signal_to_noise(
                    t1 - t0,
                    simulation.sample_length(),
                    pulse_freq,
                    rms,
                )?
            }
        };
        Span::current().record("amplitude", amplitude);

        let mut buffer = SampleBuffer::default();
        let mut flux = vec![0.0; simulation.num_samples];
        profile.eval_integrated_samples_with_buffer(
            &mut buffer,
            &mut flux,
            t0,
            t1,
            &self.phase_model,
            amplitude,
        )?;
        debug!("Generated pulsar trace");
        Ok(flux)
    }
}

impl NoiseSource {
    fn add_to(&self, flux: &mut [Flux]) -> Result<(), SimulationError> {
        if !(self.rms > 0.0) {
            return Err(SimulationError::NonPositiveNoise(self.rms));
        }
        let normal = Normal::new(0.0, self.rms)?;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        for value in flux.iter_mut() {
            *value += normal.sample(&mut rng);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const JSON_INPUT_1: &str = r#"
    {
        "time-range": { "min": 0.0, "max": 10.0 },
        "num-samples": 1000,
        "noise": { "rms": 2.0, "seed": 42 },
        "pulsars": [
            {
                "profile": { "duty-cycle": 0.1, "detrend": true },
                "phase-model": { "frequency": 1.3, "frequency-derivative": -0.001, "phi0": 0.2 },
                "intensity": { "signal-to-noise": 30.0 }
            },
            {
                "profile": { "duty-cycle": 0.05, "grid-resolution": 1024 },
                "phase-model": { "frequency": 0.7 },
                "intensity": { "amplitude": 5.0 }
            }
        ]
    }
    "#;

    fn without_noise(mut simulation: Simulation) -> Simulation {
        simulation.noise = None;
        simulation
    }

    #[test]
    fn parse() {
        let simulation: Simulation = serde_json::from_str(JSON_INPUT_1).unwrap();
        assert_eq!(simulation.pulsars.len(), 2);
        assert_eq!(simulation.num_samples, 1000);
        assert_eq!(simulation.noise.as_ref().unwrap().seed, Some(42));
        assert!(simulation.pulsars[0].profile.detrend);
        assert_eq!(simulation.pulsars[1].profile.grid_resolution, 1024);
        assert!(matches!(
            simulation.pulsars[1].intensity,
            Intensity::Amplitude(5.0)
        ));
    }

    #[test]
    fn sums_pulsars() {
        let mut simulation: Simulation = serde_json::from_str(JSON_INPUT_1).unwrap();
        simulation.pulsars.remove(0);
        let trace = simulation.run().unwrap();
        assert_eq!(trace.times.len(), 1000);
        assert_eq!(trace.times[1], 0.01);

        let profile = VonMisesProfile::new(0.05, false, 1024).unwrap();
        let phase_model = ConstantAccelerationPhaseModel::new(0.0, 0.7, 0.0, 0.0).unwrap();
        let mut expected = vec![0.0; 1000];
        profile
            .eval_integrated_samples(&mut expected, 0.0, 10.0, &phase_model, 5.0)
            .unwrap();
        // Seeded noise is reproducible, and its mean is small.
        let noise_mean = trace
            .flux
            .iter()
            .zip(&expected)
            .map(|(f, e)| f - e)
            .sum::<f64>()
            / 1000.0;
        assert!(noise_mean.abs() < 0.3);
        assert_eq!(trace.flux, simulation.run().unwrap().flux);

        let clean = without_noise(simulation).run().unwrap();
        assert_eq!(clean.flux, expected);
    }

    #[test]
    fn signal_to_noise_sets_amplitude() {
        let simulation: Simulation = serde_json::from_str(JSON_INPUT_1).unwrap();
        let pulsar = &simulation.pulsars[0];
        let flux = pulsar.generate(0, &simulation, Some(2.0)).unwrap();

        let profile = VonMisesProfile::new(0.1, true, 0).unwrap();
        let snr = profile
            .multi_pulse_signal_to_noise(10.0, 0.01, pulsar.phase_model.frequency_at(5.0), 2.0)
            .unwrap();
        let mut unit = vec![0.0; 1000];
        profile
            .eval_integrated_samples(&mut unit, 0.0, 10.0, &pulsar.phase_model, 1.0)
            .unwrap();
        for (f, u) in flux.iter().zip(&unit) {
            assert_approx_eq!(*f, u * 30.0 / snr, 1e-12);
        }
    }

    #[test]
    fn signal_to_noise_requires_noise() {
        let simulation = without_noise(serde_json::from_str(JSON_INPUT_1).unwrap());
        assert!(matches!(
            simulation.run(),
            Err(SimulationError::SignalToNoiseWithoutNoise(0))
        ));
    }

    #[test]
    fn rejects_empty_configuration() {
        let mut simulation: Simulation = serde_json::from_str(JSON_INPUT_1).unwrap();
        simulation.num_samples = 0;
        assert!(matches!(simulation.run(), Err(SimulationError::NoSamples)));

        let mut simulation: Simulation = serde_json::from_str(JSON_INPUT_1).unwrap();
        simulation.time_range.max = simulation.time_range.min;
        assert!(matches!(
            simulation.run(),
            Err(SimulationError::EmptyTimeRange(..))
        ));

        let mut simulation: Simulation = serde_json::from_str(JSON_INPUT_1).unwrap();
        simulation.pulsars[1].profile.duty_cycle = 1.5;
        assert!(matches!(
            simulation.run(),
            Err(SimulationError::Profile(ProfileError::InvalidConfiguration(_)))
        ));
    }
}
