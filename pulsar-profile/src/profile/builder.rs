//! Free functions which sample the von Mises template and integrate it on the phase grid.
use super::MAX_GRID_RESOLUTION;
use pulsar_common::{Flux, Phase};
use std::f64::consts::{LN_2, PI};

/// The automatically chosen grid spans at least this many cells per Gaussian width of the pulse.
const CELLS_PER_WIDTH: f64 = 32.0;

/// Automatically chosen grid resolutions are rounded up to a multiple of this.
const RESOLUTION_QUANTUM: usize = 64;

/// Lower bound on the automatically chosen grid resolution.
const MIN_AUTO_RESOLUTION: usize = 256;

/// Narrowness parameter of the von Mises profile with the given duty cycle.
///
/// Chosen so that `template(kappa, ±duty_cycle / 2) == 1/2`.
pub(super) fn kappa(duty_cycle: f64) -> f64 {
    LN_2 / (2.0 * (0.5 * PI * duty_cycle).sin().powi(2))
}

/// The un-normalised von Mises template, which peaks at one when `phi` is an integer.
pub(super) fn template(kappa: f64, phi: Phase) -> Flux {
    (-2.0 * kappa * (PI * phi).sin().powi(2)).exp()
}

/// Chooses a grid resolution fine enough to resolve the pulse.
///
/// Near its peak the template is close to a Gaussian of width `1 / (2 pi sqrt(kappa))`.
/// Returns `None` if the pulse needs more than [MAX_GRID_RESOLUTION] bins.
pub(super) fn default_grid_resolution(kappa: f64) -> Option<usize> {
    let width = 1.0 / (2.0 * PI * kappa.sqrt());
    let cells = (CELLS_PER_WIDTH / width).ceil();
    // Also rejects NaN and infinity, before the cast saturates.
    if !(cells <= MAX_GRID_RESOLUTION as f64) {
        return None;
    }
    let resolution = (cells as usize).div_ceil(RESOLUTION_QUANTUM) * RESOLUTION_QUANTUM;
    Some(resolution.max(MIN_AUTO_RESOLUTION))
}

/// Samples the template at `grid_resolution + 1` equally spaced phases covering `[0, 1]`.
///
/// The final sample is a copy of the first, so the seam never needs special treatment.
pub(super) fn sample_template(kappa: f64, grid_resolution: usize) -> Vec<Flux> {
    let mut grid = (0..grid_resolution)
        .map(|i| template(kappa, i as f64 / grid_resolution as f64))
        .collect::<Vec<_>>();
    grid.push(grid[0]);
    grid
}

/// Running trapezoid integral of `grid`, where the grid spacing is `1 / (grid.len() - 1)`.
///
/// The first entry is zero and the last is the integral over the whole period.
pub(super) fn antiderivative(grid: &[Flux]) -> Vec<f64> {
    let cell = 1.0 / (grid.len() - 1) as f64;
    let mut total = 0.0;
    std::iter::once(0.0)
        .chain(grid.windows(2).map(|pair| {
            total += 0.5 * cell * (pair[0] + pair[1]);
            total
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn half_maximum_at_half_duty_cycle() {
        for duty_cycle in [0.01, 0.1, 0.5, 0.9] {
            let kappa = kappa(duty_cycle);
            assert_approx_eq!(template(kappa, 0.5 * duty_cycle), 0.5, 1e-12);
            assert_approx_eq!(template(kappa, -0.5 * duty_cycle), 0.5, 1e-12);
        }
    }

    #[test]
    fn resolution_grows_as_pulse_narrows() {
        let resolutions = [0.9, 0.3, 0.1, 0.03, 0.01]
            .map(|duty_cycle| default_grid_resolution(kappa(duty_cycle)).unwrap());
        assert!(resolutions.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(resolutions.iter().all(|n| n % RESOLUTION_QUANTUM == 0));
        assert_eq!(resolutions[0], MIN_AUTO_RESOLUTION);
        assert!(resolutions[4] > resolutions[2]);
    }

    #[test]
    fn resolution_is_capped() {
        assert_eq!(default_grid_resolution(f64::INFINITY), None);
        assert_eq!(default_grid_resolution(f64::NAN), None);
        assert_eq!(default_grid_resolution(kappa(1e-7)), None);
        assert!(default_grid_resolution(kappa(1e-3)).unwrap() <= MAX_GRID_RESOLUTION);
    }

    #[test]
    fn grid_is_closed() {
        let grid = sample_template(kappa(0.2), 100);
        assert_eq!(grid.len(), 101);
        assert_eq!(grid[0], 1.0);
        assert_eq!(grid[100], grid[0]);
    }

    #[test]
    fn antiderivative_of_constant() {
        let grid = vec![2.0; 5];
        assert_eq!(antiderivative(&grid), vec![0.0, 0.5, 1.0, 1.5, 2.0]);
    }
}
