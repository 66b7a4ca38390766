//! Averages the profile over a regularly spaced sequence of time samples.
use super::VonMisesProfile;
use crate::{
    error::{ArgumentError, ProfileError, require_finite},
    phase_model::PhaseModel,
};
use pulsar_common::{Flux, Phase, Time};
use tracing::{instrument, trace};

/// Number of time samples whose phases are evaluated together.
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Scratch space used while sampling.
///
/// Holds the bin edge times and phases of one block of samples. Reusing a buffer across calls
/// avoids an allocation per call; each thread must use its own buffer. The contents carry no
/// meaning between calls, and the block size does not affect the sampled values.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    /// Length `block_size + 1`.
    times: Vec<Time>,
    /// Length `block_size + 1`.
    phases: Vec<Phase>,
}

impl SampleBuffer {
    pub fn with_block_size(block_size: usize) -> Self {
        let len = block_size.max(1) + 1;
        Self {
            times: vec![0.0; len],
            phases: vec![0.0; len],
        }
    }

    pub fn block_size(&self) -> usize {
        self.phases.len() - 1
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }
}

/// Determines whether sampled values replace or are added to the output.
#[derive(Clone, Copy, Debug)]
enum Accumulate {
    Overwrite,
    Add,
}

/// `num_bins` equal width time bins covering `[t0, t1)`.
struct TimeBins {
    t0: Time,
    t1: Time,
    width: Time,
    num_bins: usize,
}

impl TimeBins {
    fn new(t0: Time, t1: Time, num_bins: usize) -> Self {
        Self {
            t0,
            t1,
            width: (t1 - t0) / num_bins as f64,
            num_bins,
        }
    }

    /// The start time of bin `index`, or the end of the last bin if `index == num_bins`.
    fn edge(&self, index: usize) -> Time {
        if index == self.num_bins {
            self.t1
        } else {
            self.t0 + index as f64 * self.width
        }
    }
}

impl VonMisesProfile {
    /// Simulates the pulsar in a regularly spaced sequence of time samples.
    ///
    /// Each element of `out` is set to the average flux over one sample. `t0` is the beginning
    /// of the first sample and `t1` the end of the last, so each sample has length
    /// `(t1 - t0) / out.len()`.
    ///
    /// If the profile was detrended then so are the simulated fluxes.
    ///
    /// The phase model is evaluated twice at every sample edge: once to validate the whole
    /// range before `out` is touched, and once while writing.
    pub fn eval_integrated_samples<P>(
        &self,
        out: &mut [Flux],
        t0: Time,
        t1: Time,
        phase_model: &P,
        amplitude: f64,
    ) -> Result<(), ProfileError>
    where
        P: PhaseModel + ?Sized,
    {
        self.integrate_samples(
            &mut SampleBuffer::default(),
            out,
            t0,
            t1,
            phase_model,
            amplitude,
            Accumulate::Overwrite,
        )
    }

    /// As [Self::eval_integrated_samples], but adds the simulated fluxes to `out`.
    pub fn add_integrated_samples<P>(
        &self,
        out: &mut [Flux],
        t0: Time,
        t1: Time,
        phase_model: &P,
        amplitude: f64,
    ) -> Result<(), ProfileError>
    where
        P: PhaseModel + ?Sized,
    {
        self.integrate_samples(
            &mut SampleBuffer::default(),
            out,
            t0,
            t1,
            phase_model,
            amplitude,
            Accumulate::Add,
        )
    }

    /// As [Self::eval_integrated_samples], using the caller's scratch space.
    pub fn eval_integrated_samples_with_buffer<P>(
        &self,
        buffer: &mut SampleBuffer,
        out: &mut [Flux],
        t0: Time,
        t1: Time,
        phase_model: &P,
        amplitude: f64,
    ) -> Result<(), ProfileError>
    where
        P: PhaseModel + ?Sized,
    {
        self.integrate_samples(
            buffer,
            out,
            t0,
            t1,
            phase_model,
            amplitude,
            Accumulate::Overwrite,
        )
    }

    /// As [Self::add_integrated_samples], using the caller's scratch space.
    pub fn add_integrated_samples_with_buffer<P>(
        &self,
        buffer: &mut SampleBuffer,
        out: &mut [Flux],
        t0: Time,
        t1: Time,
        phase_model: &P,
        amplitude: f64,
    ) -> Result<(), ProfileError>
    where
        P: PhaseModel + ?Sized,
    {
        self.integrate_samples(
            buffer,
            out,
            t0,
            t1,
            phase_model,
            amplitude,
            Accumulate::Add,
        )
    }

    #[allow(clippy::too_many_arguments)]
    #[instrument(skip_all, level = "trace", err(level = "warn"), fields(num_samples = out.len(), t0 = t0, t1 = t1))]
    fn integrate_samples<P>(
        &self,
        buffer: &mut SampleBuffer,
        out: &mut [Flux],
        t0: Time,
        t1: Time,
        phase_model: &P,
        amplitude: f64,
        accumulate: Accumulate,
    ) -> Result<(), ProfileError>
    where
        P: PhaseModel + ?Sized,
    {
        require_finite("t0", t0)?;
        require_finite("t1", t1)?;
        if t1 < t0 {
            return Err(ArgumentError::TimeRangeReversed { t0, t1 }.into());
        }
        if out.is_empty() {
            return Ok(());
        }

        let bins = TimeBins::new(t0, t1, out.len());

        // The phase model is checked over the whole range before anything is written.
        for_each_block(buffer, &bins, phase_model, |_, _| {})?;

        for_each_block(buffer, &bins, phase_model, |first, phases| {
            let averages = phases
                .windows(2)
                .map(|edges| amplitude * self.average(edges[0], edges[1]));
            for (sample, value) in out[first..].iter_mut().zip(averages) {
                match accumulate {
                    Accumulate::Overwrite => *sample = value,
                    Accumulate::Add => *sample += value,
                }
            }
        })?;
        Ok(())
    }
}

/// Evaluates the phase model at the bin edges one block at a time, and calls `f` with the
/// index of the block's first bin and its `count + 1` edge phases.
fn for_each_block<P, F>(
    buffer: &mut SampleBuffer,
    bins: &TimeBins,
    phase_model: &P,
    mut f: F,
) -> Result<(), ArgumentError>
where
    P: PhaseModel + ?Sized,
    F: FnMut(usize, &[Phase]),
{
    let block_size = buffer.block_size();
    let mut first = 0;
    while first < bins.num_bins {
        let count = block_size.min(bins.num_bins - first);
        let times = &mut buffer.times[..=count];
        for (offset, time) in times.iter_mut().enumerate() {
            *time = bins.edge(first + offset);
        }
        let phases = &mut buffer.phases[..=count];
        phase_model.eval_phases(times, phases);
        validate_phases(first, times, phases)?;
        trace!(first, count, "Evaluated block of phases");
        f(first, phases);
        first += count;
    }
    Ok(())
}

/// Checks that the phases are finite and non-decreasing.
fn validate_phases(first: usize, times: &[Time], phases: &[Phase]) -> Result<(), ArgumentError> {
    if let Some((&time, _)) = times
        .iter()
        .zip(phases)
        .find(|(_, phase)| !phase.is_finite())
    {
        return Err(ArgumentError::NonFinitePhase(time));
    }
    if let Some((offset, edges)) = phases
        .windows(2)
        .enumerate()
        .find(|(_, edges)| edges[1] < edges[0])
    {
        return Err(ArgumentError::NonMonotonicPhase {
            index: first + offset,
            phi0: edges[0],
            phi1: edges[1],
        });
    }
    Ok(())
}
