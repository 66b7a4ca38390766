//! Evaluates the profile at a phase, and averages it over phase intervals.
use super::{VonMisesProfile, builder};
use crate::error::{ArgumentError, ProfileError, require_finite};
use pulsar_common::{Flux, Phase};

/// Number of Simpson subintervals used by [VonMisesProfile::eval_integrated_sample_slow].
const SLOW_INTEGRATION_STEPS: usize = 8192;

/// Reduces `phi` to the interval `[0, 1)`.
fn wrap(phi: Phase) -> Phase {
    let x = phi - phi.floor();
    // Tiny negative phases round up to exactly one.
    if x >= 1.0 { 0.0 } else { x }
}

impl VonMisesProfile {
    /// Returns the instantaneous flux at pulse phase `phi`.
    ///
    /// If the profile was detrended then so is the returned flux.
    pub fn point_eval(&self, phi: Phase, amplitude: f64) -> Flux {
        let (i, frac) = self.locate(wrap(phi));
        let grid = &self.profile_grid;
        amplitude * (grid[i] + frac * (grid[i + 1] - grid[i]))
    }

    /// Returns the average flux over the phase interval `[phi0, phi1]`.
    ///
    /// The interval may be at most one period wide; longer intervals must be split by the caller.
    /// A zero-width interval returns [Self::point_eval] at `phi0`.
    pub fn interval_average(
        &self,
        phi0: Phase,
        phi1: Phase,
        amplitude: f64,
    ) -> Result<Flux, ProfileError> {
        validate_interval(phi0, phi1)?;
        Ok(amplitude * self.average(phi0, phi1))
    }

    /// Returns the average flux over the phase interval `[phi0, phi1]`, by direct integration
    /// of the analytic template.
    ///
    /// This is intended for debugging [Self::interval_average], hence the "_slow".
    pub fn eval_integrated_sample_slow(
        &self,
        phi0: Phase,
        phi1: Phase,
        amplitude: f64,
    ) -> Result<Flux, ProfileError> {
        validate_interval(phi0, phi1)?;

        let offset = if self.detrend {
            self.template_mean_flux
        } else {
            0.0
        };
        let rho = |phi: Phase| builder::template(self.kappa, phi) - offset;

        let width = phi1 - phi0;
        if width == 0.0 {
            return Ok(amplitude * rho(phi0));
        }

        let step = width / SLOW_INTEGRATION_STEPS as f64;
        let interior = (1..SLOW_INTEGRATION_STEPS)
            .map(|j| {
                let weight = if j % 2 == 1 { 4.0 } else { 2.0 };
                weight * rho(phi0 + j as f64 * step)
            })
            .sum::<f64>();
        let integral = (rho(phi0) + interior + rho(phi1)) * step / 3.0;
        Ok(amplitude * integral / width)
    }

    /// Average of the unit amplitude profile over `[phi0, phi1]`, for any `phi0 <= phi1`.
    pub(super) fn average(&self, phi0: Phase, phi1: Phase) -> Flux {
        let width = phi1 - phi0;
        if width == 0.0 {
            return self.point_eval(phi0, 1.0);
        }
        // Whole periods integrate to the mean, whatever the phase offset.
        if spans_whole_periods(phi0, phi1) {
            return self.mean_flux;
        }
        self.integrate(phi0, phi1) / width
    }

    /// Integral of the unit amplitude profile over `[phi0, phi1]`, for any `phi0 <= phi1`.
    ///
    /// The interval is split into a partial period at each end and a whole number of
    /// periods in between.
    fn integrate(&self, phi0: Phase, phi1: Phase) -> f64 {
        let floor0 = phi0.floor();
        let floor1 = phi1.floor();
        let head = self.antiderivative_at(phi0 - floor0);
        let tail = self.antiderivative_at(phi1 - floor1);
        let periods = floor1 - floor0;
        if periods == 0.0 {
            tail - head
        } else {
            let period = self.period_integral();
            (period - head) + (periods - 1.0) * period + tail
        }
    }

    /// Integral of the piecewise-linear profile from phase zero to `x` in `[0, 1]`.
    fn antiderivative_at(&self, x: Phase) -> f64 {
        if x >= 1.0 {
            return self.period_integral();
        }
        let (i, frac) = self.locate(x);
        let grid = &self.profile_grid;
        let cell = 1.0 / self.grid_resolution() as f64;
        self.profile_antiderivative[i]
            + frac * cell * (grid[i] + 0.5 * frac * (grid[i + 1] - grid[i]))
    }

    /// Splits `x` in `[0, 1)` into a grid cell index and the fractional position within the cell.
    fn locate(&self, x: Phase) -> (usize, f64) {
        let n = self.grid_resolution();
        let position = x * n as f64;
        let i = (position as usize).min(n - 1);
        (i, position - i as f64)
    }
}

/// True if `[phi0, phi1]` spans a positive whole number of periods, up to the rounding
/// error already carried by phases of this magnitude.
fn spans_whole_periods(phi0: Phase, phi1: Phase) -> bool {
    let width = phi1 - phi0;
    let periods = width.round();
    let tolerance = 4.0 * f64::EPSILON * phi0.abs().max(phi1.abs()).max(1.0);
    periods >= 1.0 && (width - periods).abs() <= tolerance
}

fn validate_interval(phi0: Phase, phi1: Phase) -> Result<(), ArgumentError> {
    require_finite("phi0", phi0)?;
    require_finite("phi1", phi1)?;
    if (0.0..=1.0).contains(&(phi1 - phi0)) {
        Ok(())
    } else {
        Err(ArgumentError::IntervalWidthOutOfRange { phi0, phi1 })
    }
}
