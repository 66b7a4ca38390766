//! The von Mises pulse profile and its precomputed integration tables.
//!
//! Mathematically the profile is the function
//! ```text
//! rho(phi) = exp[ -2 kappa sin^2(pi phi) ]
//! ```
//! of pulse phase `phi`, where `kappa = ln(2) / (2 sin^2(pi D / 2))` for duty cycle `D`.
//! It peaks at one when `phi` is an integer, before any detrending is applied.
mod builder;
mod evaluate;
mod harmonics;
mod sampler;
mod snr;

use crate::{
    error::{ConfigurationError, ProfileError},
    parameters::ProfileConfig,
};
use pulsar_common::Flux;
use tracing::{debug, instrument};

pub use sampler::{DEFAULT_BLOCK_SIZE, SampleBuffer};

/// Smallest grid resolution which may be requested explicitly.
pub const MIN_GRID_RESOLUTION: usize = 16;

/// Largest grid resolution, whether requested or chosen automatically.
pub const MAX_GRID_RESOLUTION: usize = 1 << 20;

/// A von Mises pulse profile, sampled on a uniform phase grid.
///
/// The profile is immutable once constructed, so a single instance can be shared
/// between threads. Scratch space used by the samplers lives in a [SampleBuffer].
#[derive(Debug, Clone)]
pub struct VonMisesProfile {
    duty_cycle: f64,
    detrend: bool,
    kappa: f64,
    /// Mean of the raw template over one period.
    template_mean_flux: Flux,
    /// Mean of the profile as evaluated, zero when detrending.
    mean_flux: Flux,
    /// Length `grid_resolution + 1`, the last entry repeats the first.
    profile_grid: Vec<Flux>,
    /// Running integral of `profile_grid`, same length, starting at zero.
    profile_antiderivative: Vec<f64>,
    /// Cosine coefficients of the raw template, normalised so the first is one.
    harmonics: Vec<f64>,
}

impl VonMisesProfile {
    /// Creates the profile.
    /// # Parameters
    /// - duty_cycle: pulse full width at half maximum divided by the pulse period, in (0, 1).
    /// - detrend: if true, the mean flux is subtracted from the profile.
    /// - grid_resolution: the number of phase bins used internally, or zero to choose
    ///   automatically. At most [MAX_GRID_RESOLUTION]; pulses too narrow to resolve within it
    ///   are rejected.
    #[instrument(skip_all, level = "debug", err(level = "warn"), fields(duty_cycle = duty_cycle, detrend = detrend))]
    pub fn new(
        duty_cycle: f64,
        detrend: bool,
        grid_resolution: usize,
    ) -> Result<Self, ProfileError> {
        if !(duty_cycle > 0.0 && duty_cycle < 1.0) {
            return Err(ConfigurationError::DutyCycleOutOfRange(duty_cycle).into());
        }
        if grid_resolution != 0 && grid_resolution < MIN_GRID_RESOLUTION {
            return Err(ConfigurationError::GridResolutionTooSmall(
                grid_resolution,
                MIN_GRID_RESOLUTION,
            )
            .into());
        }
        if grid_resolution > MAX_GRID_RESOLUTION {
            return Err(ConfigurationError::GridResolutionTooLarge(
                grid_resolution,
                MAX_GRID_RESOLUTION,
            )
            .into());
        }

        let kappa = builder::kappa(duty_cycle);
        let too_narrow = ConfigurationError::DutyCycleTooNarrow(duty_cycle, MAX_GRID_RESOLUTION);
        if !kappa.is_finite() {
            return Err(too_narrow.into());
        }
        let grid_resolution = match grid_resolution {
            0 => builder::default_grid_resolution(kappa).ok_or(too_narrow)?,
            n => n,
        };

        let mut profile_grid = builder::sample_template(kappa, grid_resolution);
        let raw_antiderivative = builder::antiderivative(&profile_grid);
        let template_mean_flux = raw_antiderivative[grid_resolution];

        let (mean_flux, profile_antiderivative) = if detrend {
            profile_grid
                .iter_mut()
                .for_each(|flux| *flux -= template_mean_flux);
            let mut antiderivative = builder::antiderivative(&profile_grid);
            // Removes rounding residue so a whole period integrates to exactly zero.
            antiderivative[grid_resolution] = 0.0;
            (0.0, antiderivative)
        } else {
            (template_mean_flux, raw_antiderivative)
        };

        let harmonics = harmonics::normalised_harmonics(kappa, grid_resolution);

        debug!(
            kappa,
            grid_resolution, template_mean_flux, mean_flux, "Built von Mises profile"
        );

        Ok(Self {
            duty_cycle,
            detrend,
            kappa,
            template_mean_flux,
            mean_flux,
            profile_grid,
            profile_antiderivative,
            harmonics,
        })
    }

    pub fn from_config(config: &ProfileConfig) -> Result<Self, ProfileError> {
        Self::new(config.duty_cycle, config.detrend, config.grid_resolution)
    }

    pub fn duty_cycle(&self) -> f64 {
        self.duty_cycle
    }

    pub fn detrend(&self) -> bool {
        self.detrend
    }

    /// The narrowness parameter of the profile.
    pub fn kappa(&self) -> f64 {
        self.kappa
    }

    /// Number of phase bins used internally.
    pub fn grid_resolution(&self) -> usize {
        self.profile_grid.len() - 1
    }

    /// Mean flux over one period, for unit amplitude.
    ///
    /// This is zero if the profile was detrended.
    pub fn mean_flux(&self) -> Flux {
        self.mean_flux
    }

    /// Mean flux of the template before detrending, for unit amplitude.
    pub fn template_mean_flux(&self) -> Flux {
        self.template_mean_flux
    }

    /// The profile sampled at `grid_resolution + 1` equally spaced phases in `[0, 1]`.
    pub fn profile_grid(&self) -> &[Flux] {
        &self.profile_grid
    }

    /// Integral of the profile from phase zero to each grid phase.
    pub fn profile_antiderivative(&self) -> &[f64] {
        &self.profile_antiderivative
    }

    /// Integral of the profile over one whole period.
    fn period_integral(&self) -> f64 {
        self.profile_antiderivative[self.grid_resolution()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// `exp(-kappa) I_0(kappa)` from the power series of the modified Bessel function.
    pub(super) fn analytic_mean(kappa: f64) -> f64 {
        let x = 0.25 * kappa * kappa;
        let mut term = 1.0;
        let mut sum = 1.0;
        for k in 1..200 {
            term *= x / (k * k) as f64;
            sum += term;
        }
        (-kappa).exp() * sum
    }

    #[test]
    fn rejects_duty_cycle() {
        for duty_cycle in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                VonMisesProfile::new(duty_cycle, false, 0),
                Err(ProfileError::InvalidConfiguration(
                    ConfigurationError::DutyCycleOutOfRange(_)
                ))
            ));
        }
    }

    #[test]
    fn rejects_coarse_grid() {
        assert_eq!(
            VonMisesProfile::new(0.1, false, 3).unwrap_err(),
            ProfileError::InvalidConfiguration(ConfigurationError::GridResolutionTooSmall(3, 16))
        );
        assert_eq!(
            VonMisesProfile::new(0.1, false, 16)
                .unwrap()
                .grid_resolution(),
            16
        );
    }

    #[test]
    fn rejects_fine_grid() {
        assert_eq!(
            VonMisesProfile::new(0.1, false, MAX_GRID_RESOLUTION + 1).unwrap_err(),
            ProfileError::InvalidConfiguration(ConfigurationError::GridResolutionTooLarge(
                MAX_GRID_RESOLUTION + 1,
                MAX_GRID_RESOLUTION
            ))
        );
    }

    #[test]
    fn rejects_unresolvable_duty_cycle() {
        // Underflows to an infinite kappa.
        for grid_resolution in [0, 1024] {
            assert_eq!(
                VonMisesProfile::new(1e-200, false, grid_resolution).unwrap_err(),
                ProfileError::InvalidConfiguration(ConfigurationError::DutyCycleTooNarrow(
                    1e-200,
                    MAX_GRID_RESOLUTION
                ))
            );
        }
        assert!(matches!(
            VonMisesProfile::new(1e-7, false, 0),
            Err(ProfileError::InvalidConfiguration(
                ConfigurationError::DutyCycleTooNarrow(..)
            ))
        ));
        // A narrow pulse is still fine on an explicit grid.
        assert_eq!(
            VonMisesProfile::new(1e-7, false, 64)
                .unwrap()
                .grid_resolution(),
            64
        );
    }

    #[test]
    fn from_config() {
        let profile = VonMisesProfile::from_config(&ProfileConfig {
            duty_cycle: 0.2,
            detrend: true,
            grid_resolution: 500,
        })
        .unwrap();
        assert_eq!(profile.duty_cycle(), 0.2);
        assert!(profile.detrend());
        assert_eq!(profile.grid_resolution(), 500);
        assert_eq!(profile.profile_grid().len(), 501);
    }

    #[test]
    fn periodicity_closure() {
        for detrend in [false, true] {
            let profile = VonMisesProfile::new(0.1, detrend, 0).unwrap();
            let grid = profile.profile_grid();
            assert_eq!(grid[grid.len() - 1], grid[0]);
            assert_eq!(profile.profile_antiderivative()[0], 0.0);
            assert_eq!(
                profile.profile_antiderivative().len(),
                profile.grid_resolution() + 1
            );
        }
    }

    #[test]
    fn mean_flux_matches_analytic() {
        for duty_cycle in [0.03, 0.1, 0.4] {
            let profile = VonMisesProfile::new(duty_cycle, false, 0).unwrap();
            assert_approx_eq!(profile.mean_flux(), analytic_mean(profile.kappa()), 1e-12);
            assert_eq!(profile.mean_flux(), profile.template_mean_flux());
            assert_eq!(profile.mean_flux(), profile.period_integral());
        }
    }

    #[test]
    fn detrended_mean_is_zero() {
        let raw = VonMisesProfile::new(0.1, false, 0).unwrap();
        let profile = VonMisesProfile::new(0.1, true, 0).unwrap();
        assert_eq!(profile.mean_flux(), 0.0);
        assert_eq!(profile.period_integral(), 0.0);
        assert_eq!(profile.template_mean_flux(), raw.mean_flux());
        assert_approx_eq!(
            profile.profile_grid()[0],
            1.0 - raw.mean_flux(),
            1e-15
        );
    }

    #[test]
    fn default_resolution_scenario() {
        let profile = VonMisesProfile::new(0.1, false, 0).unwrap();
        assert_eq!(profile.grid_resolution(), 768);
        assert!(profile.mean_flux() > 0.0 && profile.mean_flux() < 1.0);
    }
}
